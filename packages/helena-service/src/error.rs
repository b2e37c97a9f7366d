pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<helena_storage::Error> for Error {
	fn from(err: helena_storage::Error) -> Self {
		match err {
			helena_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			err => Self::Storage { message: err.to_string() },
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
