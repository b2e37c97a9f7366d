use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const LISTING_ID: &str = "ListingID";

/// One warehouse row, passed through untouched except for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingRecord(Map<String, Value>);

/// A field that should have been numeric but holds something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotNumeric;

impl ListingRecord {
	pub fn new(fields: Map<String, Value>) -> Self {
		Self(fields)
	}

	pub fn from_value(value: Value) -> Option<Self> {
		match value {
			Value::Object(fields) => Some(Self(fields)),
			_ => None,
		}
	}

	/// `ListingID` as text. Numeric identifiers are rendered in decimal.
	pub fn id(&self) -> Option<String> {
		match self.0.get(LISTING_ID)? {
			Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
			Value::Number(id) => Some(id.to_string()),
			_ => None,
		}
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key).filter(|value| !value.is_null())
	}

	/// First present, non-null field among `keys`.
	pub fn first_of(&self, keys: &[&str]) -> Option<&Value> {
		keys.iter().find_map(|key| self.get(key))
	}

	/// Non-blank text for `key`; numbers are rendered as text.
	pub fn text(&self, key: &str) -> Option<String> {
		match self.get(key)? {
			Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
			Value::Number(number) => Some(number.to_string()),
			_ => None,
		}
	}

	/// Strict numeric read: absent or null is `Ok(None)`, any non-number is an error.
	pub fn number(&self, keys: &[&str]) -> Result<Option<f64>, NotNumeric> {
		match self.first_of(keys) {
			None => Ok(None),
			Some(Value::Number(number)) => number.as_f64().map(Some).ok_or(NotNumeric),
			Some(_) => Err(NotNumeric),
		}
	}

	/// Lenient numeric read used for filtering: malformed values count as absent.
	pub fn number_or_none(&self, keys: &[&str]) -> Option<f64> {
		self.number(keys).ok().flatten().filter(|value| value.is_finite())
	}

	/// Sale price when positive, otherwise the rental price.
	pub fn effective_price(&self) -> Option<f64> {
		self.number_or_none(&["ListPrice"])
			.filter(|price| *price > 0.0)
			.or_else(|| self.number_or_none(&["RentalPrice"]))
	}

	pub fn fields(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}
}
