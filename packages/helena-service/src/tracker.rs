use std::collections::HashSet;

use crate::{Result, preferences::PreferenceStore};

/// Records listings as shown for `session_id`. Repeated ids, inside the batch or across calls,
/// are recorded once.
pub async fn record_shown(store: &PreferenceStore, session_id: &str, ids: &[String]) -> Result<()> {
	let mut seen = HashSet::new();

	for id in ids {
		if !seen.insert(id.as_str()) {
			continue;
		}

		store.append_viewed(session_id, id).await?;
	}

	Ok(())
}
