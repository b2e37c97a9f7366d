use std::time::Duration;

use color_eyre::Result;
use reqwest::Client;
use serde_json::{Map, Value};

/// Sends `text` to the agent's `detectIntent` for `session` and returns the joined text replies.
/// An agent that answers without text yields an empty string.
pub async fn detect_intent(
	cfg: &helena_config::DialogProviderConfig,
	session: &str,
	text: &str,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let body = serde_json::json!({
		"queryInput": {
			"text": { "text": text },
			"languageCode": cfg.language_code,
		},
	});
	let res = client
		.post(session_url(cfg, session))
		.headers(crate::auth_headers(cfg.access_token.as_deref(), &Map::new())?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(parse_reply(&json))
}

pub fn session_url(cfg: &helena_config::DialogProviderConfig, session: &str) -> String {
	format!(
		"{}/v3/projects/{}/locations/{}/agents/{}/sessions/{}:detectIntent",
		cfg.api_base, cfg.project_id, cfg.location, cfg.agent_id, session
	)
}

fn parse_reply(json: &Value) -> String {
	let Some(messages) = json
		.get("queryResult")
		.and_then(|result| result.get("responseMessages"))
		.and_then(|v| v.as_array())
	else {
		return String::new();
	};

	messages
		.iter()
		.filter_map(|message| message.get("text")?.get("text")?.as_array())
		.flatten()
		.filter_map(|line| line.as_str())
		.filter(|line| !line.trim().is_empty())
		.collect::<Vec<_>>()
		.join("\n")
}
