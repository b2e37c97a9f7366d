//! JSON documents keyed by `(collection, document_id)`.
//!
//! Mutations are read-modify-write inside one transaction. The row is created empty when absent
//! and then locked with `FOR UPDATE`, so concurrent writers to the same document serialize.

use serde_json::{Map, Value};
use sqlx::{Postgres, Transaction, types::Json};

use crate::{BoxFuture, Document, DocumentStore, Error, Result, db::Db};

/// Recursively merges `patch` into `target`. Objects merge key by key; any other value replaces
/// what was there.
pub fn merge_json(target: &mut Map<String, Value>, patch: Map<String, Value>) {
	for (key, value) in patch {
		match (target.get_mut(&key), value) {
			(Some(Value::Object(existing)), Value::Object(incoming)) => merge_json(existing, incoming),
			(_, value) => {
				target.insert(key, value);
			},
		}
	}
}

/// Array union of one element. Returns whether `value` was appended.
pub fn apply_append_unique(doc: &mut Document, field: &str, value: Value) -> Result<bool> {
	let items = array_field(doc, field)?;

	if items.contains(&value) {
		return Ok(false);
	}

	items.push(value);

	Ok(true)
}

/// Appends `value` and drops the oldest entries beyond `cap`.
pub fn apply_push_capped(doc: &mut Document, field: &str, value: Value, cap: usize) -> Result<()> {
	let items = array_field(doc, field)?;

	items.push(value);

	if items.len() > cap {
		let excess = items.len() - cap;

		items.drain(..excess);
	}

	Ok(())
}

fn array_field<'a>(doc: &'a mut Document, field: &str) -> Result<&'a mut Vec<Value>> {
	let slot = doc.entry(field.to_string()).or_insert_with(|| Value::Array(Vec::new()));

	if slot.is_null() {
		*slot = Value::Array(Vec::new());
	}

	match slot {
		Value::Array(items) => Ok(items),
		_ => Err(Error::InvalidDocument(format!("Field {field:?} is not an array."))),
	}
}

pub struct PgDocumentStore {
	db: Db,
}
impl PgDocumentStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
		let row: Option<Json<Value>> = sqlx::query_scalar(
			"\
SELECT data
FROM documents
WHERE collection = $1 AND document_id = $2",
		)
		.bind(collection)
		.bind(id)
		.fetch_optional(&self.db.pool)
		.await?;

		row.map(|Json(value)| into_document(collection, id, value)).transpose()
	}

	/// Runs `apply` against the locked document and writes the result back.
	pub async fn update_document<T, F>(&self, collection: &str, id: &str, apply: F) -> Result<T>
	where
		F: FnOnce(&mut Document) -> Result<T>,
	{
		let mut tx = self.db.pool.begin().await?;
		let mut doc = lock_document(&mut tx, collection, id).await?;
		let out = apply(&mut doc)?;

		sqlx::query(
			"\
UPDATE documents
SET data = $3, updated_at = now()
WHERE collection = $1 AND document_id = $2",
		)
		.bind(collection)
		.bind(id)
		.bind(Json(Value::Object(doc)))
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		Ok(out)
	}
}

impl DocumentStore for PgDocumentStore {
	fn get<'a>(&'a self, collection: &'a str, id: &'a str) -> BoxFuture<'a, Result<Option<Document>>> {
		Box::pin(self.get_document(collection, id))
	}

	fn merge<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		patch: Document,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.update_document(collection, id, move |doc| {
			merge_json(doc, patch);

			Ok(())
		}))
	}

	fn append_unique<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		field: &'a str,
		value: Value,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(self.update_document(collection, id, move |doc| {
			apply_append_unique(doc, field, value)
		}))
	}

	fn push_capped<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		field: &'a str,
		value: Value,
		cap: usize,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.update_document(collection, id, move |doc| {
			apply_push_capped(doc, field, value, cap)
		}))
	}
}

async fn lock_document(
	tx: &mut Transaction<'_, Postgres>,
	collection: &str,
	id: &str,
) -> Result<Document> {
	sqlx::query(
		"\
INSERT INTO documents (collection, document_id)
VALUES ($1, $2)
ON CONFLICT (collection, document_id) DO NOTHING",
	)
	.bind(collection)
	.bind(id)
	.execute(&mut **tx)
	.await?;

	let Json(value): Json<Value> = sqlx::query_scalar(
		"\
SELECT data
FROM documents
WHERE collection = $1 AND document_id = $2
FOR UPDATE",
	)
	.bind(collection)
	.bind(id)
	.fetch_one(&mut **tx)
	.await?;

	into_document(collection, id, value)
}

fn into_document(collection: &str, id: &str, value: Value) -> Result<Document> {
	match value {
		Value::Object(doc) => Ok(doc),
		Value::Null => Ok(Map::new()),
		_ => Err(Error::InvalidDocument(format!("{collection}/{id} is not a JSON object."))),
	}
}
