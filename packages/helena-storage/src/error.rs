#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Invalid document: {0}")]
	InvalidDocument(String),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}
