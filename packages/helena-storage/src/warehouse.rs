//! Listing warehouse backed by the `listing` table.
//!
//! Filters are always bound parameters. The raw row is kept in `record` and returned untouched;
//! the typed columns exist only to filter on.

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder, types::Json};

use crate::{BoxFuture, ListingWarehouse, Result, db::Db};
use helena_domain::{ListingQuery, ListingRecord};

/// Builds the parameterized SELECT for `query`.
pub fn render_listing_query(query: &ListingQuery) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new("SELECT record FROM listing WHERE TRUE");
	let text_filters = [
		("transaction_type", &query.transaction_type),
		("property_type", &query.property_type),
		("usage_type", &query.usage_type),
		("city", &query.city),
		("state", &query.state),
		("neighborhood", &query.neighborhood),
	];

	for (column, wanted) in text_filters {
		if let Some(wanted) = wanted {
			builder.push(format!(" AND lower({column}) = lower("));
			builder.push_bind(wanted.trim().to_string());
			builder.push(")");
		}
	}

	if query.price_constrained() {
		builder.push(
			" AND (CASE WHEN list_price > 0 THEN list_price ELSE rental_price END) BETWEEN ",
		);
		builder.push_bind(query.price_min);
		builder.push(" AND ");
		builder.push_bind(query.price_max);
	}

	let room_filters = [
		("bedrooms", query.min_rooms.bedrooms),
		("bathrooms", query.min_rooms.bathrooms),
		("suites", query.min_rooms.suites),
		("garage_spaces", query.min_rooms.garage_spaces),
	];

	for (column, minimum) in room_filters {
		if minimum > 0 {
			builder.push(format!(" AND COALESCE({column}, 0) >= "));
			builder.push_bind(i64::from(minimum));
		}
	}

	if query.min_living_area > 0.0 {
		builder.push(" AND COALESCE(living_area, 0) >= ");
		builder.push_bind(query.min_living_area);
	}
	if !query.exclude_ids.is_empty() {
		builder.push(" AND listing_id <> ALL(");
		builder.push_bind(query.exclude_ids.clone());
		builder.push(")");
	}

	builder.push(" ORDER BY listing_id LIMIT ");
	builder.push_bind(i64::from(query.limit));

	builder
}

pub struct PgWarehouse {
	db: Db,
}
impl PgWarehouse {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn search(&self, query: &ListingQuery) -> Result<Vec<ListingRecord>> {
		let mut builder = render_listing_query(query);
		let rows: Vec<Json<Value>> =
			builder.build_query_scalar().fetch_all(&self.db.pool).await?;

		tracing::debug!(rows = rows.len(), limit = query.limit, "Listing query completed.");

		Ok(rows.into_iter().filter_map(|Json(value)| ListingRecord::from_value(value)).collect())
	}
}

impl ListingWarehouse for PgWarehouse {
	fn query<'a>(&'a self, query: &'a ListingQuery) -> BoxFuture<'a, Result<Vec<ListingRecord>>> {
		Box::pin(self.search(query))
	}
}

/// Upserts one raw listing row. Used to seed the table from exported records.
pub async fn load_listing(db: &Db, listing: &ListingRecord) -> Result<()> {
	let Some(listing_id) = listing.id() else {
		return Err(crate::Error::InvalidArgument("Listing has no ListingID.".to_string()));
	};
	let count = |keys: &[&str]| listing.number_or_none(keys).map(|value| value as i32);

	sqlx::query(
		"\
INSERT INTO listing (
	listing_id,
	transaction_type,
	property_type,
	usage_type,
	city,
	state,
	neighborhood,
	list_price,
	rental_price,
	bedrooms,
	bathrooms,
	suites,
	garage_spaces,
	living_area,
	record
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
ON CONFLICT (listing_id) DO UPDATE
SET
	transaction_type = EXCLUDED.transaction_type,
	property_type = EXCLUDED.property_type,
	usage_type = EXCLUDED.usage_type,
	city = EXCLUDED.city,
	state = EXCLUDED.state,
	neighborhood = EXCLUDED.neighborhood,
	list_price = EXCLUDED.list_price,
	rental_price = EXCLUDED.rental_price,
	bedrooms = EXCLUDED.bedrooms,
	bathrooms = EXCLUDED.bathrooms,
	suites = EXCLUDED.suites,
	garage_spaces = EXCLUDED.garage_spaces,
	living_area = EXCLUDED.living_area,
	record = EXCLUDED.record",
	)
	.bind(listing_id)
	.bind(listing.text("TransactionType"))
	.bind(listing.text("PropertyType"))
	.bind(listing.text("UsageType"))
	.bind(listing.text("City"))
	.bind(listing.text("State"))
	.bind(listing.text("Neighborhood"))
	.bind(listing.number_or_none(&["ListPrice"]))
	.bind(listing.number_or_none(&["RentalPrice"]))
	.bind(count(&["Bedrooms", "Bedroom"]))
	.bind(count(&["Bathrooms", "Bathroom"]))
	.bind(count(&["Suites", "Suite"]))
	.bind(count(&["GarageSpaces", "Garage"]))
	.bind(listing.number_or_none(&["LivingArea"]))
	.bind(Json(listing.clone().into_value()))
	.execute(&db.pool)
	.await?;

	Ok(())
}
