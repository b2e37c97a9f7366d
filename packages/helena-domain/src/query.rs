//! Preference-to-query translation.
//!
//! `ListingQuery` is a plain value: every filter is carried as data and bound as a parameter by
//! the warehouse implementation. `matches` is the reference semantics of the same filter for
//! backends that evaluate rows in process.

use crate::{listing::ListingRecord, preference::PreferenceRecord, viewed::ViewedListingSet};

/// Upper price bound used when the user gave none.
pub const PRICE_CEILING: f64 = 999_999_999.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
	pub transaction_type: Option<String>,
	pub property_type: Option<String>,
	pub usage_type: Option<String>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub neighborhood: Option<String>,
	pub price_min: f64,
	pub price_max: f64,
	pub min_rooms: RoomMinimums,
	pub min_living_area: f64,
	/// Sorted, deduplicated.
	pub exclude_ids: Vec<String>,
	pub limit: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoomMinimums {
	pub bedrooms: u32,
	pub bathrooms: u32,
	pub suites: u32,
	pub garage_spaces: u32,
}

impl ListingQuery {
	pub const LIST_LIMIT: u32 = 10;
	pub const SINGLE_LIMIT: u32 = 1;

	pub fn build(preferences: &PreferenceRecord, exclude: &ViewedListingSet, limit: u32) -> Self {
		let (price_min, price_max) =
			price_bounds(preferences.price_range.min, preferences.price_range.max);
		let rooms = preferences.room_counts;
		let mut exclude_ids = exclude.iter().map(str::to_string).collect::<Vec<_>>();

		exclude_ids.sort();
		exclude_ids.dedup();

		Self {
			transaction_type: preferences.transaction_type.clone(),
			property_type: preferences.property_type.clone(),
			usage_type: preferences.usage_type.clone(),
			city: preferences.location.city.clone(),
			state: preferences.location.state.clone(),
			neighborhood: preferences.location.neighborhood.clone(),
			price_min,
			price_max,
			min_rooms: RoomMinimums {
				bedrooms: rooms.bedroom.unwrap_or(0),
				bathrooms: rooms.bathroom.unwrap_or(0),
				suites: rooms.suite.unwrap_or(0),
				garage_spaces: rooms.garage.unwrap_or(0),
			},
			min_living_area: preferences
				.area
				.living_area
				.filter(|area| area.is_finite() && *area > 0.0)
				.unwrap_or(0.0),
			exclude_ids,
			limit: limit.clamp(Self::SINGLE_LIMIT, Self::LIST_LIMIT),
		}
	}

	/// Whether the price clause can exclude anything. Unpriced listings survive an unconstrained
	/// range.
	pub fn price_constrained(&self) -> bool {
		self.price_min > 0.0 || self.price_max < PRICE_CEILING
	}

	pub fn matches(&self, listing: &ListingRecord) -> bool {
		let text_filters = [
			(&self.transaction_type, "TransactionType"),
			(&self.property_type, "PropertyType"),
			(&self.usage_type, "UsageType"),
			(&self.city, "City"),
			(&self.state, "State"),
			(&self.neighborhood, "Neighborhood"),
		];

		for (wanted, key) in text_filters {
			if let Some(wanted) = wanted
				&& !listing.text(key).map(|actual| same_text(&actual, wanted)).unwrap_or(false)
			{
				return false;
			}
		}

		if self.price_constrained() {
			let Some(price) = listing.effective_price() else {
				return false;
			};

			if price < self.price_min || price > self.price_max {
				return false;
			}
		}

		let room_filters = [
			(self.min_rooms.bedrooms, &["Bedrooms", "Bedroom"][..]),
			(self.min_rooms.bathrooms, &["Bathrooms", "Bathroom"][..]),
			(self.min_rooms.suites, &["Suites", "Suite"][..]),
			(self.min_rooms.garage_spaces, &["GarageSpaces", "Garage"][..]),
		];

		for (minimum, keys) in room_filters {
			if minimum > 0 && listing.number_or_none(keys).unwrap_or(0.0) < f64::from(minimum) {
				return false;
			}
		}

		if self.min_living_area > 0.0
			&& listing.number_or_none(&["LivingArea"]).unwrap_or(0.0) < self.min_living_area
		{
			return false;
		}

		listing.id().map(|id| self.exclude_ids.binary_search(&id).is_err()).unwrap_or(true)
	}
}

/// Missing or unusable minimum becomes 0; missing, unusable or non-positive maximum becomes the
/// ceiling; inverted bounds are swapped. Always `0 <= min <= max`.
pub fn price_bounds(min: Option<f64>, max: Option<f64>) -> (f64, f64) {
	let min = min.filter(|value| value.is_finite() && *value >= 0.0).unwrap_or(0.0);
	let max = max.filter(|value| value.is_finite() && *value > 0.0).unwrap_or(PRICE_CEILING);

	if min > max { (max, min) } else { (min, max) }
}

fn same_text(actual: &str, wanted: &str) -> bool {
	actual.trim().to_lowercase() == wanted.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn listing(value: serde_json::Value) -> ListingRecord {
		ListingRecord::from_value(value).expect("Listing must be an object.")
	}

	#[test]
	fn missing_numbers_get_safe_defaults() {
		let query = ListingQuery::build(
			&PreferenceRecord::default(),
			&ViewedListingSet::new(),
			ListingQuery::LIST_LIMIT,
		);

		assert_eq!(query.price_min, 0.0);
		assert_eq!(query.price_max, PRICE_CEILING);
		assert_eq!(query.min_rooms, RoomMinimums::default());
		assert!(!query.price_constrained());
		assert!(query.exclude_ids.is_empty());
	}

	#[test]
	fn price_bounds_are_always_ordered() {
		let cases = [
			(None, None),
			(Some(5_000.0), Some(2_000.0)),
			(Some(-1.0), Some(0.0)),
			(Some(f64::NAN), Some(f64::INFINITY)),
			(Some(2_000_000_000.0), None),
			(None, Some(300.0)),
		];

		for (min, max) in cases {
			let (low, high) = price_bounds(min, max);

			assert!(low >= 0.0, "min must be non-negative for {min:?}/{max:?}");
			assert!(low <= high, "min must not exceed max for {min:?}/{max:?}");
		}

		assert_eq!(price_bounds(Some(5_000.0), Some(2_000.0)), (2_000.0, 5_000.0));
		assert_eq!(price_bounds(Some(100.0), Some(0.0)), (100.0, PRICE_CEILING));
	}

	#[test]
	fn limit_is_clamped() {
		let prefs = PreferenceRecord::default();
		let viewed = ViewedListingSet::new();

		assert_eq!(ListingQuery::build(&prefs, &viewed, 0).limit, 1);
		assert_eq!(ListingQuery::build(&prefs, &viewed, 50).limit, 10);
	}

	#[test]
	fn exclusions_are_sorted_and_unique() {
		let viewed: ViewedListingSet = ["c", "a", "b"].into_iter().collect();
		let query = ListingQuery::build(&PreferenceRecord::default(), &viewed, 1);

		assert_eq!(query.exclude_ids, vec!["a", "b", "c"]);
		assert!(!query.matches(&listing(json!({ "ListingID": "b" }))));
		assert!(query.matches(&listing(json!({ "ListingID": "d" }))));
	}

	#[test]
	fn matches_applies_type_and_price_filters() {
		let prefs = PreferenceRecord::from_value(&json!({
			"propertyType": "apartamento",
			"priceRange": { "min": 2000, "max": 5000 },
			"bedroom": 1
		}));
		let query = ListingQuery::build(&prefs, &ViewedListingSet::new(), 10);

		assert!(query.matches(&listing(json!({
			"ListingID": "bbbb460",
			"PropertyType": "Apartamento",
			"ListPrice": 0,
			"RentalPrice": 4500.0,
			"Bedrooms": 1
		}))));
		assert!(!query.matches(&listing(json!({
			"PropertyType": "Casa",
			"RentalPrice": 3000.0,
			"Bedrooms": 2
		}))));
		assert!(!query.matches(&listing(json!({
			"PropertyType": "Apartamento",
			"RentalPrice": 6000.0,
			"Bedrooms": 2
		}))));
		assert!(!query.matches(&listing(json!({ "PropertyType": "Apartamento", "Bedrooms": 2 }))));
	}

	#[test]
	fn unconstrained_query_keeps_unpriced_listings() {
		let query =
			ListingQuery::build(&PreferenceRecord::default(), &ViewedListingSet::new(), 10);

		assert!(query.matches(&listing(json!({ "ListingID": "x", "ListPrice": "sob consulta" }))));
	}
}
