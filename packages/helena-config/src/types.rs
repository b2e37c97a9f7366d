use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub whatsapp: WhatsApp,
	#[serde(default)]
	pub inbox: Inbox,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub summarizer: LlmProviderConfig,
	pub dialog: DialogProviderConfig,
}

/// OpenAI-compatible chat completion endpoint used to summarize listing descriptions.
#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Dialogflow CX agent that answers the messaging channel.
#[derive(Debug, Deserialize)]
pub struct DialogProviderConfig {
	/// Regional endpoint, e.g. "https://us-central1-dialogflow.googleapis.com".
	pub api_base: String,
	pub project_id: String,
	pub location: String,
	pub agent_id: String,
	#[serde(default = "default_language_code")]
	pub language_code: String,
	/// OAuth bearer token. Optional; blank values are treated as absent.
	pub access_token: Option<String>,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct WhatsApp {
	/// Graph API base including version, e.g. "https://graph.facebook.com/v22.0".
	pub api_base: String,
	pub phone_number_id: String,
	pub access_token: Option<String>,
	/// Token expected in `hub.verify_token` during webhook verification.
	pub verify_token: Option<String>,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Inbox {
	pub debounce_ms: u64,
	pub buffer_limit: usize,
	pub history_limit: usize,
	/// Minimum seconds between accepted messages from one sender. Zero disables the check.
	pub rate_limit_secs: i64,
}
impl Default for Inbox {
	fn default() -> Self {
		Self { debounce_ms: 1_000, buffer_limit: 5, history_limit: 5, rate_limit_secs: 10 }
	}
}

fn default_language_code() -> String {
	"pt-BR".to_string()
}
