//! In-process stand-ins for the Postgres stores.

use std::{
	collections::HashMap,
	sync::{
		Mutex,
		atomic::{AtomicBool, Ordering},
	},
};

use serde_json::Value;

use helena_domain::{ListingQuery, ListingRecord};
use helena_storage::{
	BoxFuture, Document, DocumentStore, Error, ListingWarehouse, Result,
	document::{apply_append_unique, apply_push_capped, merge_json},
};

#[derive(Default)]
pub struct MemoryDocumentStore {
	docs: Mutex<HashMap<(String, String), Document>>,
	failing: AtomicBool,
}
impl MemoryDocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes every subsequent call fail with a storage error.
	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn insert(&self, collection: &str, id: &str, value: Value) {
		let doc = match value {
			Value::Object(doc) => doc,
			_ => Document::new(),
		};

		self.lock().insert((collection.to_string(), id.to_string()), doc);
	}

	/// Snapshot of one document, for assertions.
	pub fn snapshot(&self, collection: &str, id: &str) -> Option<Value> {
		self.lock()
			.get(&(collection.to_string(), id.to_string()))
			.map(|doc| Value::Object(doc.clone()))
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), Document>> {
		self.docs.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn check(&self) -> Result<()> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(Error::Sqlx(sqlx::Error::PoolTimedOut));
		}

		Ok(())
	}

	fn update<T>(
		&self,
		collection: &str,
		id: &str,
		apply: impl FnOnce(&mut Document) -> Result<T>,
	) -> Result<T> {
		self.check()?;

		let mut docs = self.lock();
		let doc = docs.entry((collection.to_string(), id.to_string())).or_default();

		apply(doc)
	}
}

impl DocumentStore for MemoryDocumentStore {
	fn get<'a>(&'a self, collection: &'a str, id: &'a str) -> BoxFuture<'a, Result<Option<Document>>> {
		Box::pin(async move {
			self.check()?;

			Ok(self.lock().get(&(collection.to_string(), id.to_string())).cloned())
		})
	}

	fn merge<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		patch: Document,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.update(collection, id, |doc| {
				merge_json(doc, patch);

				Ok(())
			})
		})
	}

	fn append_unique<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		field: &'a str,
		value: Value,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move { self.update(collection, id, |doc| apply_append_unique(doc, field, value)) })
	}

	fn push_capped<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		field: &'a str,
		value: Value,
		cap: usize,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.update(collection, id, |doc| apply_push_capped(doc, field, value, cap))
		})
	}
}

/// Evaluates queries with `ListingQuery::matches` over a fixed row set.
#[derive(Default)]
pub struct MemoryWarehouse {
	rows: Vec<ListingRecord>,
	queries: Mutex<Vec<ListingQuery>>,
}
impl MemoryWarehouse {
	pub fn new(rows: impl IntoIterator<Item = Value>) -> Self {
		Self {
			rows: rows.into_iter().filter_map(ListingRecord::from_value).collect(),
			queries: Mutex::default(),
		}
	}

	/// Queries received so far, oldest first.
	pub fn queries(&self) -> Vec<ListingQuery> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

impl ListingWarehouse for MemoryWarehouse {
	fn query<'a>(&'a self, query: &'a ListingQuery) -> BoxFuture<'a, Result<Vec<ListingRecord>>> {
		Box::pin(async move {
			self.queries.lock().unwrap_or_else(|err| err.into_inner()).push(query.clone());

			let mut rows =
				self.rows.iter().filter(|row| query.matches(row)).cloned().collect::<Vec<_>>();

			rows.sort_by_key(ListingRecord::id);
			rows.truncate(query.limit as usize);

			Ok(rows)
		})
	}
}

/// Warehouse that is always down.
pub struct FailingWarehouse;

impl ListingWarehouse for FailingWarehouse {
	fn query<'a>(&'a self, _: &'a ListingQuery) -> BoxFuture<'a, Result<Vec<ListingRecord>>> {
		Box::pin(async { Err(Error::Sqlx(sqlx::Error::PoolTimedOut)) })
	}
}
