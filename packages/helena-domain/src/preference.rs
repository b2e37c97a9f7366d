//! Canonical search-preference record.
//!
//! Dialog payloads arrive loosely typed: numbers may be strings, "not informed" may be `-1`,
//! an empty string or a localized placeholder, and two generations of field names coexist. The
//! reader accepts all of them; the writer always emits the canonical camelCase shape with unset
//! fields omitted, so a partially filled record doubles as a merge patch.

use serde::Serialize;
use serde_json::Value;

/// Text values that mean "not informed" rather than a real criterion.
const UNKNOWN_TEXT: [&str; 8] = [
	"n/a",
	"na",
	"não informado",
	"não informada",
	"nao informado",
	"nao informada",
	"desconhecido",
	"unknown",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transaction_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub property_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub usage_type: Option<String>,
	#[serde(skip_serializing_if = "Location::is_empty")]
	pub location: Location,
	#[serde(skip_serializing_if = "RoomCounts::is_empty")]
	pub room_counts: RoomCounts,
	#[serde(skip_serializing_if = "Area::is_empty")]
	pub area: Area,
	#[serde(skip_serializing_if = "PriceRange::is_empty")]
	pub price_range: PriceRange,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub floor: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub unit_floor: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub buildings: Option<u32>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub features: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub special_requests: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub neighborhood: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub complement: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub zone: Option<String>,
}

/// `None` is "unconstrained"; `Some(0)` is an explicit zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoomCounts {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bedroom: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bathroom: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub suite: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub garage: Option<u32>,
}

/// Square meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub living_area: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lot_area: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceRange {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

impl PreferenceRecord {
	/// Reads a record from any known payload or stored-document shape. Never fails; anything
	/// unreadable is left unconstrained.
	pub fn from_value(value: &Value) -> Self {
		let price = value.get("priceRange").or_else(|| value.get("price"));
		let legacy_price = value.get("listPrice");
		let area = value.get("area");
		let rooms = value.get("roomCounts");

		Self {
			transaction_type: coerce_text(value.get("transactionType")),
			property_type: coerce_text(value.get("propertyType")),
			usage_type: coerce_text(value.get("usageType")),
			location: Location::from_value(value.get("location")),
			room_counts: RoomCounts {
				bedroom: coerce_count(first([field(rooms, "bedroom"), value.get("bedroom")])),
				bathroom: coerce_count(first([field(rooms, "bathroom"), value.get("bathroom")])),
				suite: coerce_count(first([field(rooms, "suite"), value.get("suite")])),
				garage: coerce_count(first([field(rooms, "garage"), value.get("garage")])),
			},
			area: Area {
				living_area: coerce_amount(first([
					field(area, "livingArea"),
					value.get("livingArea"),
				])),
				lot_area: coerce_amount(first([field(area, "lotArea"), value.get("lotArea")])),
			},
			price_range: PriceRange {
				min: coerce_amount(first([
					field(price, "min"),
					field(price, "valorMin"),
					field(legacy_price, "min"),
				])),
				max: coerce_amount(first([
					field(price, "max"),
					field(price, "valorMax"),
					field(legacy_price, "max"),
				])),
				description: coerce_text(first([
					field(price, "description"),
					field(legacy_price, "descricao"),
				])),
			},
			floor: coerce_count(value.get("floor")),
			unit_floor: coerce_count(value.get("unitFloor")),
			buildings: coerce_count(value.get("buildings")),
			features: coerce_texts(value.get("features")),
			special_requests: coerce_texts(first([
				value.get("specialRequests"),
				value.get("especialRequests"),
				value.get("Requests"),
			])),
		}
	}

	/// Canonical JSON shape, unset fields omitted.
	pub fn to_value(&self) -> Value {
		serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
	}

	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}

impl Location {
	fn from_value(value: Option<&Value>) -> Self {
		Self {
			city: coerce_text(field(value, "city")),
			state: coerce_text(field(value, "state")),
			neighborhood: coerce_text(field(value, "neighborhood")),
			address: coerce_text(field(value, "address")),
			complement: coerce_text(field(value, "complement")),
			zone: coerce_text(field(value, "zone")),
		}
	}

	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}

impl RoomCounts {
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}

impl Area {
	pub fn is_empty(&self) -> bool {
		self.living_area.is_none() && self.lot_area.is_none()
	}
}

impl PriceRange {
	pub fn is_empty(&self) -> bool {
		self.min.is_none() && self.max.is_none() && self.description.is_none()
	}
}

/// Non-negative integer from a JSON number or numeric string. Negative, fractional and
/// unparseable values are `None`.
pub fn coerce_count(value: Option<&Value>) -> Option<u32> {
	let number = match value? {
		Value::Number(number) => number.as_f64()?,
		Value::String(text) => text.trim().parse::<f64>().ok()?,
		_ => return None,
	};

	if !number.is_finite() || number < 0.0 || number.fract() != 0.0 || number > u32::MAX as f64 {
		return None;
	}

	Some(number as u32)
}

/// Non-negative finite float from a JSON number or numeric string.
pub fn coerce_amount(value: Option<&Value>) -> Option<f64> {
	let number = match value? {
		Value::Number(number) => number.as_f64()?,
		Value::String(text) => text.trim().replace(',', ".").parse::<f64>().ok()?,
		_ => return None,
	};

	(number.is_finite() && number >= 0.0).then_some(number)
}

/// Trimmed text, or `None` for blanks and "not informed" placeholders.
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
	let text = match value? {
		Value::String(text) => text.trim().to_string(),
		Value::Number(number) => number.to_string(),
		_ => return None,
	};

	if text.is_empty() || is_unknown_text(&text) {
		return None;
	}

	Some(text)
}

pub fn is_unknown_text(text: &str) -> bool {
	let lowered = text.trim().to_lowercase();

	UNKNOWN_TEXT.contains(&lowered.as_str())
}

fn coerce_texts(value: Option<&Value>) -> Vec<String> {
	match value {
		Some(Value::Array(items)) => items.iter().filter_map(|item| coerce_text(Some(item))).collect(),
		Some(Value::String(_)) => coerce_text(value).into_iter().collect(),
		_ => Vec::new(),
	}
}

fn field<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a Value> {
	value.and_then(|value| value.get(key))
}

fn first<'a, const N: usize>(candidates: [Option<&'a Value>; N]) -> Option<&'a Value> {
	candidates.into_iter().flatten().find(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn reads_dialog_payload_with_sentinels() {
		let record = PreferenceRecord::from_value(&json!({
			"transactionType": "Aluguel",
			"propertyType": "N/A",
			"location": { "city": "São Paulo", "zone": "Não informado" },
			"bedroom": -1,
			"bathroom": "2",
			"suite": 0,
			"area": { "livingArea": "45.5", "lotArea": -1 },
			"price": { "valorMin": 2000, "valorMax": "5000" },
			"features": ["Varanda", " ", "N/A"],
			"especialRequests": ["Aceita pets"]
		}));

		assert_eq!(record.transaction_type.as_deref(), Some("Aluguel"));
		assert_eq!(record.property_type, None);
		assert_eq!(record.location.city.as_deref(), Some("São Paulo"));
		assert_eq!(record.location.zone, None);
		assert_eq!(record.room_counts.bedroom, None);
		assert_eq!(record.room_counts.bathroom, Some(2));
		assert_eq!(record.room_counts.suite, Some(0));
		assert_eq!(record.area.living_area, Some(45.5));
		assert_eq!(record.area.lot_area, None);
		assert_eq!(record.price_range.min, Some(2000.0));
		assert_eq!(record.price_range.max, Some(5000.0));
		assert_eq!(record.features, vec!["Varanda".to_string()]);
		assert_eq!(record.special_requests, vec!["Aceita pets".to_string()]);
	}

	#[test]
	fn reads_legacy_list_price_shape() {
		let record = PreferenceRecord::from_value(&json!({
			"listPrice": { "min": 0, "max": 0, "descricao": "até 5 mil" },
			"livingArea": 80,
			"garage": 1.0
		}));

		assert_eq!(record.price_range.min, Some(0.0));
		assert_eq!(record.price_range.max, Some(0.0));
		assert_eq!(record.price_range.description.as_deref(), Some("até 5 mil"));
		assert_eq!(record.area.living_area, Some(80.0));
		assert_eq!(record.room_counts.garage, Some(1));
	}

	#[test]
	fn canonical_value_omits_unset_fields() {
		let record = PreferenceRecord {
			room_counts: RoomCounts { bedroom: Some(2), ..Default::default() },
			..Default::default()
		};

		assert_eq!(record.to_value(), json!({ "roomCounts": { "bedroom": 2 } }));
		assert_eq!(PreferenceRecord::default().to_value(), json!({}));
	}

	#[test]
	fn canonical_value_reads_back_unchanged() {
		let record = PreferenceRecord::from_value(&json!({
			"propertyType": "Apartamento",
			"location": { "city": "Campinas", "state": "SP" },
			"roomCounts": { "bedroom": 3, "garage": 0 },
			"area": { "livingArea": 70.0 },
			"priceRange": { "min": 2000.0, "max": 5000.0 },
			"unitFloor": 4,
			"specialRequests": ["Perto do metrô"]
		}));

		assert_eq!(PreferenceRecord::from_value(&record.to_value()), record);
	}

	#[test]
	fn counts_reject_fractions_and_garbage() {
		assert_eq!(coerce_count(Some(&json!(2.5))), None);
		assert_eq!(coerce_count(Some(&json!("três"))), None);
		assert_eq!(coerce_count(Some(&json!(true))), None);
		assert_eq!(coerce_count(Some(&json!(" 4 "))), Some(4));
		assert_eq!(coerce_count(None), None);
	}

	#[test]
	fn amounts_accept_decimal_comma() {
		assert_eq!(coerce_amount(Some(&json!("1500,50"))), Some(1_500.5));
		assert_eq!(coerce_amount(Some(&json!(-3.0))), None);
		assert_eq!(coerce_amount(Some(&Value::Null)), None);
	}
}
