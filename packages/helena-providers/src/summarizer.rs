use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

const DESCRIPTIONS_HEADER: &str = "--- DESCRIÇÕES DOS IMÓVEIS ---";

/// One chat completion over `instruction` and the descriptions, separated by blank lines.
/// No retry.
pub async fn summarize(
	cfg: &helena_config::LlmProviderConfig,
	instruction: &str,
	descriptions: &[String],
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "user", "content": build_prompt(instruction, descriptions) },
		],
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(Some(&cfg.api_key), &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(&json)
}

pub fn build_prompt(instruction: &str, descriptions: &[String]) -> String {
	format!("{instruction}\n\n{DESCRIPTIONS_HEADER}\n\n{}", descriptions.join("\n\n"))
}

fn parse_completion(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(|content| content.trim().to_string())
		.ok_or_else(|| eyre::eyre!("Completion response is missing message content."))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prompt_separates_descriptions_with_blank_lines() {
		let prompt = build_prompt("Analise:", &["A".to_string(), "B".to_string()]);

		assert_eq!(prompt, "Analise:\n\n--- DESCRIÇÕES DOS IMÓVEIS ---\n\nA\n\nB");
	}

	#[test]
	fn parses_first_choice() {
		let json = serde_json::json!({
			"choices": [{ "message": { "role": "assistant", "content": " Boa opção. " } }]
		});

		assert_eq!(parse_completion(&json).expect("parse failed"), "Boa opção.");
	}

	#[test]
	fn missing_content_is_an_error() {
		assert!(parse_completion(&serde_json::json!({ "choices": [] })).is_err());
	}
}
