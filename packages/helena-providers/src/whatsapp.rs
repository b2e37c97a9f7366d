use std::time::Duration;

use color_eyre::Result;
use reqwest::Client;
use serde_json::{Map, Value};

/// Sends a plain text message through the Cloud API.
pub async fn send_text(cfg: &helena_config::WhatsApp, to: &str, body: &str) -> Result<()> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/{}/messages", cfg.api_base, cfg.phone_number_id);

	client
		.post(url)
		.headers(crate::auth_headers(cfg.access_token.as_deref(), &Map::new())?)
		.json(&text_message(to, body))
		.send()
		.await?
		.error_for_status()?;

	Ok(())
}

pub fn text_message(to: &str, body: &str) -> Value {
	serde_json::json!({
		"messaging_product": "whatsapp",
		"to": to,
		"type": "text",
		"text": { "body": body },
	})
}

/// Inbound text messages as `(from, body)` pairs. Returns `None` when the payload does not have
/// the webhook shape at all.
pub fn inbound_messages(payload: &Value) -> Option<Vec<(String, String)>> {
	let entries = payload.get("entry")?.as_array()?;
	let mut out = Vec::new();

	for entry in entries {
		let Some(changes) = entry.get("changes").and_then(|v| v.as_array()) else {
			continue;
		};

		for change in changes {
			let Some(messages) = change
				.get("value")
				.and_then(|value| value.get("messages"))
				.and_then(|v| v.as_array())
			else {
				continue;
			};

			for message in messages {
				let from = message.get("from").and_then(|v| v.as_str());
				let body = message.get("text").and_then(|text| text.get("body")).and_then(|v| v.as_str());

				if let (Some(from), Some(body)) = (from, body)
					&& !from.trim().is_empty()
				{
					out.push((from.trim().to_string(), body.to_string()));
				}
			}
		}
	}

	Some(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_text_messages() {
		let payload = serde_json::json!({
			"entry": [{
				"changes": [
					{ "value": { "statuses": [{ "id": "wamid" }] } },
					{ "value": { "messages": [
						{ "from": "5511999", "text": { "body": "Oi" } },
						{ "from": "5511999", "type": "image" }
					] } }
				]
			}]
		});

		assert_eq!(
			inbound_messages(&payload),
			Some(vec![("5511999".to_string(), "Oi".to_string())])
		);
	}

	#[test]
	fn payload_without_entries_is_malformed() {
		assert_eq!(inbound_messages(&serde_json::json!({ "object": "x" })), None);
	}

	#[test]
	fn text_message_shape() {
		assert_eq!(text_message("55", "Olá")["text"]["body"], "Olá");
		assert_eq!(text_message("55", "Olá")["messaging_product"], "whatsapp");
	}
}
