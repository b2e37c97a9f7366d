//! Session documents: search preferences and the viewed-listing set.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{Error, Result};
use helena_domain::{PreferenceRecord, ViewedListingSet};
use helena_storage::{DocumentStore, document::merge_json};

/// Collection holding one document per session.
pub const SESSIONS: &str = "messages";
pub const PREFERENCES_FIELD: &str = "preferences";
/// Field name written by older dialog integrations; read when `preferences` is absent.
pub const LEGACY_PREFERENCES_FIELD: &str = "dados_imovel";
pub const VIEWED_FIELD: &str = "imoveis_ja_visualizados";
pub const SESSION_ID_FIELD: &str = "sessionId";

#[derive(Clone)]
pub struct PreferenceStore {
	documents: Arc<dyn DocumentStore>,
}
impl PreferenceStore {
	pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
		Self { documents }
	}

	/// Stored preferences. The legacy section is read first and `preferences` merged over it, so
	/// criteria saved by either handler stay visible. A session document without a preference
	/// section reads as an empty record; a missing document is `NotFound`.
	pub async fn load(&self, session_id: &str) -> Result<PreferenceRecord> {
		let Some(doc) = self.documents.get(SESSIONS, session_id).await? else {
			return Err(Error::NotFound {
				message: format!("No session document for {session_id}."),
			});
		};
		let mut section = Map::new();

		for field in [LEGACY_PREFERENCES_FIELD, PREFERENCES_FIELD] {
			if let Some(Value::Object(stored)) = doc.get(field) {
				merge_json(&mut section, stored.clone());
			}
		}

		Ok(PreferenceRecord::from_value(&Value::Object(section)))
	}

	/// Deep-merges the set fields of `record` into the session document.
	pub async fn save(&self, session_id: &str, record: &PreferenceRecord) -> Result<()> {
		let mut patch = Map::new();

		patch.insert(SESSION_ID_FIELD.to_string(), Value::String(session_id.to_string()));
		patch.insert(PREFERENCES_FIELD.to_string(), record.to_value());

		self.documents.merge(SESSIONS, session_id, patch).await?;

		tracing::info!(session_id, "Preferences saved.");

		Ok(())
	}

	/// Missing document reads as an empty set.
	pub async fn load_viewed(&self, session_id: &str) -> Result<ViewedListingSet> {
		let doc = self.documents.get(SESSIONS, session_id).await?;

		Ok(ViewedListingSet::from_value(doc.as_ref().and_then(|doc| doc.get(VIEWED_FIELD))))
	}

	/// Returns `false` when `listing_id` was already recorded.
	pub async fn append_viewed(&self, session_id: &str, listing_id: &str) -> Result<bool> {
		let appended = self
			.documents
			.append_unique(SESSIONS, session_id, VIEWED_FIELD, Value::String(listing_id.to_string()))
			.await?;

		Ok(appended)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use helena_testkit::MemoryDocumentStore;

	fn store_with(docs: &[(&str, Value)]) -> (Arc<MemoryDocumentStore>, PreferenceStore) {
		let memory = Arc::new(MemoryDocumentStore::new());

		for (id, value) in docs {
			memory.insert(SESSIONS, id, value.clone());
		}

		(memory.clone(), PreferenceStore::new(memory))
	}

	#[tokio::test]
	async fn load_missing_session_is_not_found() {
		let (_, store) = store_with(&[]);

		assert!(matches!(store.load("nope").await, Err(Error::NotFound { .. })));
	}

	#[tokio::test]
	async fn load_reads_legacy_section() {
		let (_, store) = store_with(&[(
			"s1",
			json!({ "dados_imovel": { "propertyType": "Casa", "bedroom": "3" } }),
		)]);
		let prefs = store.load("s1").await.expect("load");

		assert_eq!(prefs.property_type.as_deref(), Some("Casa"));
		assert_eq!(prefs.room_counts.bedroom, Some(3));
	}

	#[tokio::test]
	async fn save_keeps_legacy_criteria_visible() {
		let (memory, store) = store_with(&[(
			"s1",
			json!({ "dados_imovel": { "propertyType": "Casa", "location": { "city": "Campinas" } } }),
		)]);

		store
			.save("s1", &PreferenceRecord::from_value(&json!({ "bedroom": 2 })))
			.await
			.expect("save");

		let prefs = store.load("s1").await.expect("load");

		assert_eq!(prefs.property_type.as_deref(), Some("Casa"));
		assert_eq!(prefs.location.city.as_deref(), Some("Campinas"));
		assert_eq!(prefs.room_counts.bedroom, Some(2));
		assert_eq!(
			memory.snapshot(SESSIONS, "s1").expect("doc")["dados_imovel"]["propertyType"],
			"Casa"
		);
	}

	#[tokio::test]
	async fn canonical_section_overrides_legacy() {
		let (_, store) = store_with(&[(
			"s1",
			json!({
				"dados_imovel": { "propertyType": "Casa", "bedroom": 3 },
				"preferences": { "propertyType": "Apartamento" }
			}),
		)]);
		let prefs = store.load("s1").await.expect("load");

		assert_eq!(prefs.property_type.as_deref(), Some("Apartamento"));
		assert_eq!(prefs.room_counts.bedroom, Some(3));
	}

	#[tokio::test]
	async fn document_without_preferences_is_unconstrained() {
		let (_, store) = store_with(&[("s1", json!({ "messages": [] }))]);

		assert!(store.load("s1").await.expect("load").is_empty());
	}

	#[tokio::test]
	async fn successive_saves_merge() {
		let (memory, store) = store_with(&[]);

		store
			.save("s1", &PreferenceRecord::from_value(&json!({ "bedroom": 2 })))
			.await
			.expect("save");
		store
			.save("s1", &PreferenceRecord::from_value(&json!({ "bathroom": 1 })))
			.await
			.expect("save");

		let prefs = store.load("s1").await.expect("load");

		assert_eq!(prefs.room_counts.bedroom, Some(2));
		assert_eq!(prefs.room_counts.bathroom, Some(1));
		assert_eq!(memory.snapshot(SESSIONS, "s1").expect("doc")["sessionId"], "s1");
	}

	#[tokio::test]
	async fn viewed_set_round_trips_through_document() {
		let (_, store) = store_with(&[]);

		assert!(store.load_viewed("s1").await.expect("viewed").is_empty());
		assert!(store.append_viewed("s1", "bbbb460").await.expect("append"));
		assert!(!store.append_viewed("s1", "bbbb460").await.expect("append"));
		assert!(store.load_viewed("s1").await.expect("viewed").contains("bbbb460"));
	}
}
