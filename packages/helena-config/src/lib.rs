mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DialogProviderConfig, Inbox, LlmProviderConfig, Postgres, Providers, Service, Storage,
	WhatsApp,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("providers.summarizer.api_base", &cfg.providers.summarizer.api_base),
		("providers.summarizer.model", &cfg.providers.summarizer.model),
		("providers.dialog.api_base", &cfg.providers.dialog.api_base),
		("providers.dialog.project_id", &cfg.providers.dialog.project_id),
		("providers.dialog.location", &cfg.providers.dialog.location),
		("providers.dialog.agent_id", &cfg.providers.dialog.agent_id),
		("whatsapp.api_base", &cfg.whatsapp.api_base),
		("whatsapp.phone_number_id", &cfg.whatsapp.phone_number_id),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.summarizer.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider summarizer api_key must be non-empty.".to_string(),
		});
	}
	if !cfg.providers.summarizer.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.summarizer.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.providers.summarizer.temperature) {
		return Err(Error::Validation {
			message: "providers.summarizer.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("providers.summarizer.timeout_ms", cfg.providers.summarizer.timeout_ms),
		("providers.dialog.timeout_ms", cfg.providers.dialog.timeout_ms),
		("whatsapp.timeout_ms", cfg.whatsapp.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.inbox.debounce_ms == 0 {
		return Err(Error::Validation {
			message: "inbox.debounce_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.inbox.buffer_limit == 0 {
		return Err(Error::Validation {
			message: "inbox.buffer_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.inbox.history_limit == 0 {
		return Err(Error::Validation {
			message: "inbox.history_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.inbox.rate_limit_secs < 0 {
		return Err(Error::Validation {
			message: "inbox.rate_limit_secs must be zero or greater.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for token in [
		&mut cfg.providers.dialog.access_token,
		&mut cfg.whatsapp.access_token,
		&mut cfg.whatsapp.verify_token,
	] {
		if token.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false) {
			*token = None;
		}
	}

	cfg.providers.summarizer.api_base =
		cfg.providers.summarizer.api_base.trim_end_matches('/').to_string();
	cfg.providers.dialog.api_base = cfg.providers.dialog.api_base.trim_end_matches('/').to_string();
	cfg.whatsapp.api_base = cfg.whatsapp.api_base.trim_end_matches('/').to_string();
}
