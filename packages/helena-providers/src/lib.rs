pub mod dialog;
pub mod summarizer;
pub mod whatsapp;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

pub fn auth_headers(api_key: Option<&str>, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = api_key {
		headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header values must be strings."));
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn bearer_and_defaults_are_set() {
		let defaults = json!({ "x-tenant": "helena" });
		let headers = auth_headers(Some("k"), defaults.as_object().expect("object"))
			.expect("headers");

		assert_eq!(headers[AUTHORIZATION], "Bearer k");
		assert_eq!(headers["x-tenant"], "helena");
	}

	#[test]
	fn non_string_default_header_is_rejected() {
		let defaults = json!({ "x-retries": 3 });

		assert!(auth_headers(None, defaults.as_object().expect("object")).is_err());
	}
}
