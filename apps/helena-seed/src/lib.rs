//! Loads exported listing rows into the `listing` table.

use std::{fs, path::PathBuf};

use clap::Parser;
use color_eyre::{Result, eyre};
use serde_json::Value;

use helena_domain::ListingRecord;
use helena_storage::{db::Db, warehouse};

#[derive(Debug, Parser)]
#[command(
	version = helena_cli::VERSION,
	rename_all = "kebab",
	styles = helena_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON array of listing objects, or one object per line.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
}

pub async fn run(args: Args) -> Result<()> {
	let config = helena_config::load(&args.config)?;

	helena_cli::init_tracing(&config.service.log_level);

	let raw = fs::read_to_string(&args.input)?;
	let listings = parse_listings(&raw)?;
	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let mut loaded = 0_usize;
	let mut skipped = 0_usize;

	for listing in &listings {
		if listing.id().is_none() {
			skipped += 1;

			continue;
		}

		warehouse::load_listing(&db, listing).await?;

		loaded += 1;
	}

	tracing::info!(loaded, skipped, input = %args.input.display(), "Listings loaded.");

	Ok(())
}

/// Accepts a JSON array or newline-delimited objects. Blank lines are ignored.
pub fn parse_listings(raw: &str) -> Result<Vec<ListingRecord>> {
	let trimmed = raw.trim_start();

	if trimmed.starts_with('[') {
		let Value::Array(items) = serde_json::from_str(trimmed)? else {
			return Err(eyre::eyre!("Expected a JSON array of listings."));
		};

		return items.into_iter().map(into_listing).collect();
	}

	raw.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(|line| into_listing(serde_json::from_str(line)?))
		.collect()
}

fn into_listing(value: Value) -> Result<ListingRecord> {
	ListingRecord::from_value(value).ok_or_else(|| eyre::eyre!("Listing rows must be JSON objects."))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_array_and_lines() {
		let array = parse_listings(r#"[{"ListingID":"a1"},{"ListingID":"a2"}]"#).expect("array");
		let lines = parse_listings("{\"ListingID\":\"a1\"}\n\n{\"ListingID\":\"a2\"}\n").expect("lines");

		assert_eq!(array, lines);
		assert_eq!(array.len(), 2);
	}

	#[test]
	fn rejects_non_objects() {
		assert!(parse_listings("[1, 2]").is_err());
		assert!(parse_listings("\"a1\"").is_err());
	}
}
