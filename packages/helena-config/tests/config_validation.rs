use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use helena_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("helena_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> helena_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = helena_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = load_payload(SAMPLE_CONFIG_TOML.to_string()).expect("Sample config must load.");

	assert_eq!(cfg.providers.summarizer.api_base, "https://api.openai.com");
	assert_eq!(cfg.providers.dialog.language_code, "pt-BR");
	assert!(cfg.providers.dialog.access_token.is_none(), "Blank token must normalize to None.");
	assert_eq!(cfg.whatsapp.verify_token.as_deref(), Some("verify-me"));
	assert_eq!(cfg.inbox.buffer_limit, 5);
}

#[test]
fn inbox_section_is_optional() {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");

	root.as_table_mut().expect("Sample config must be a table.").remove("inbox");

	let payload = toml::to_string(&root).expect("Failed to render sample config.");
	let cfg = load_payload(payload).expect("Config without [inbox] must load.");

	assert_eq!(cfg.inbox.debounce_ms, 1_000);
	assert_eq!(cfg.inbox.history_limit, 5);
	assert_eq!(cfg.inbox.rate_limit_secs, 10);
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("helena_config_test_does_not_exist.toml");
	let err = helena_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn pool_size_must_be_positive() {
	let payload = sample_toml_with("storage.postgres", "pool_max_conns", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected pool size validation error.");

	assert!(
		err.to_string().contains("storage.postgres.pool_max_conns must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn phone_number_id_must_be_non_empty() {
	let payload = sample_toml_with("whatsapp", "phone_number_id", Value::String(" ".to_string()));
	let err = load_payload(payload).expect_err("Expected phone number validation error.");

	assert!(
		err.to_string().contains("whatsapp.phone_number_id must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn summarizer_temperature_must_be_in_range() {
	let mut cfg = base_config();

	cfg.providers.summarizer.temperature = 3.5;

	let err = helena_config::validate(&cfg).expect_err("Expected temperature validation error.");

	assert!(
		err.to_string().contains("providers.summarizer.temperature must be in the range 0.0-2.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn inbox_limits_must_be_positive() {
	let mut cfg = base_config();

	cfg.inbox.buffer_limit = 0;

	let err = helena_config::validate(&cfg).expect_err("Expected buffer limit validation error.");

	assert!(
		err.to_string().contains("inbox.buffer_limit must be greater than zero."),
		"Unexpected error: {err}"
	);

	cfg = base_config();
	cfg.inbox.rate_limit_secs = -1;

	let err = helena_config::validate(&cfg).expect_err("Expected rate limit validation error.");

	assert!(
		err.to_string().contains("inbox.rate_limit_secs must be zero or greater."),
		"Unexpected error: {err}"
	);
}

#[test]
fn provider_timeouts_must_be_positive() {
	let mut cfg = base_config();

	cfg.whatsapp.timeout_ms = 0;

	let err = helena_config::validate(&cfg).expect_err("Expected timeout validation error.");

	assert!(
		err.to_string().contains("whatsapp.timeout_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}
