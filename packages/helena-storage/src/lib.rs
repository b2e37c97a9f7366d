//! Persistence for session documents and read access to the listing warehouse.
//!
//! Both concerns sit behind object-safe traits so the service can be wired to Postgres in
//! production and to in-memory fakes in tests.

pub mod db;
pub mod document;
pub mod schema;
pub mod warehouse;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use serde_json::{Map, Value};

use helena_domain::{ListingQuery, ListingRecord};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type Document = Map<String, Value>;

/// Keyed JSON documents grouped in collections. Every mutation is an atomic read-modify-write of
/// a single document.
pub trait DocumentStore
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, collection: &'a str, id: &'a str) -> BoxFuture<'a, Result<Option<Document>>>;

	/// Deep-merges `patch` into the document, creating it when absent.
	fn merge<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		patch: Document,
	) -> BoxFuture<'a, Result<()>>;

	/// Appends `value` to the array at `field` unless already present. Returns whether it was
	/// appended.
	fn append_unique<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		field: &'a str,
		value: Value,
	) -> BoxFuture<'a, Result<bool>>;

	/// Appends `value` to the array at `field`, keeping only the newest `cap` entries.
	fn push_capped<'a>(
		&'a self,
		collection: &'a str,
		id: &'a str,
		field: &'a str,
		value: Value,
		cap: usize,
	) -> BoxFuture<'a, Result<()>>;
}

/// Read-only listing source.
pub trait ListingWarehouse
where
	Self: Send + Sync,
{
	/// Rows matching `query`, ordered by listing id, at most `query.limit`.
	fn query<'a>(&'a self, query: &'a ListingQuery) -> BoxFuture<'a, Result<Vec<ListingRecord>>>;
}
