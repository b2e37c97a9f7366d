use std::collections::HashSet;

use serde_json::Value;

use crate::listing::ListingRecord;

/// Listing identifiers already shown to one session, in the order they were shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewedListingSet {
	order: Vec<String>,
	members: HashSet<String>,
}

impl ViewedListingSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads the stored array form. Non-string entries are skipped and duplicates collapse.
	pub fn from_value(value: Option<&Value>) -> Self {
		let mut set = Self::new();

		if let Some(Value::Array(items)) = value {
			for item in items {
				if let Some(id) = item.as_str() {
					set.insert(id);
				}
			}
		}

		set
	}

	/// Returns `false` when the id was already present.
	pub fn insert(&mut self, id: &str) -> bool {
		let id = id.trim();

		if id.is_empty() || self.members.contains(id) {
			return false;
		}

		self.members.insert(id.to_string());
		self.order.push(id.to_string());

		true
	}

	pub fn contains(&self, id: &str) -> bool {
		self.members.contains(id)
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.order.iter().map(String::as_str)
	}

	pub fn to_value(&self) -> Value {
		Value::Array(self.order.iter().cloned().map(Value::String).collect())
	}
}

impl<'a> FromIterator<&'a str> for ViewedListingSet {
	fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
		let mut set = Self::new();

		for id in iter {
			set.insert(id);
		}

		set
	}
}

/// Candidates not yet shown, in warehouse order. Rows without an id cannot be tracked and are
/// kept.
pub fn filter_unseen(candidates: Vec<ListingRecord>, viewed: &ViewedListingSet) -> Vec<ListingRecord> {
	candidates
		.into_iter()
		.filter(|listing| listing.id().map(|id| !viewed.contains(&id)).unwrap_or(true))
		.collect()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn listings(ids: &[&str]) -> Vec<ListingRecord> {
		ids.iter()
			.map(|id| {
				ListingRecord::from_value(json!({ "ListingID": id })).expect("Listing must be an object.")
			})
			.collect()
	}

	#[test]
	fn insert_is_idempotent() {
		let mut set = ViewedListingSet::new();

		assert!(set.insert("bbbb460"));
		assert!(!set.insert("bbbb460"));
		assert!(!set.insert("  "));
		assert_eq!(set.len(), 1);
		assert_eq!(set.to_value(), json!(["bbbb460"]));
	}

	#[test]
	fn stored_duplicates_collapse() {
		let set = ViewedListingSet::from_value(Some(&json!(["a", "b", "a", 7])));

		assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[test]
	fn filter_unseen_preserves_order_and_is_idempotent() {
		let viewed: ViewedListingSet = ["b", "d"].into_iter().collect();
		let once = filter_unseen(listings(&["a", "b", "c", "d", "e"]), &viewed);
		let twice = filter_unseen(once.clone(), &viewed);

		assert_eq!(once, listings(&["a", "c", "e"]));
		assert_eq!(twice, once);
	}

	#[test]
	fn everything_seen_yields_empty() {
		let viewed: ViewedListingSet = ["bbbb460"].into_iter().collect();

		assert!(filter_unseen(listings(&["bbbb460"]), &viewed).is_empty());
	}
}
