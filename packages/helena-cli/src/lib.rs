//! Shared command-line plumbing for the Helena binaries.

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Installs the global fmt subscriber. An unparsable directive falls back to `info`.
pub fn init_tracing(log_level: &str) {
	let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
	use clap::{CommandFactory, Parser};

	use super::*;

	#[derive(Debug, Parser)]
	#[command(version = VERSION, styles = styles())]
	struct Probe {
		#[arg(long, short = 'c')]
		config: String,
	}

	#[test]
	fn styled_command_is_consistent() {
		Probe::command().debug_assert();

		let probe = Probe::parse_from(["probe", "-c", "helena.toml"]);

		assert_eq!(probe.config, "helena.toml");
	}
}
