use serde_json::{Value, json};

use helena_domain::{
	ListingQuery, ListingRecord, PreferenceRecord, ViewedListingSet, describe,
	query::PRICE_CEILING, viewed,
};

fn price_inputs() -> Vec<Value> {
	vec![
		Value::Null,
		json!(""),
		json!("abc"),
		json!(-1),
		json!("-1"),
		json!(0),
		json!(2000),
		json!("5000"),
		json!(1.5e12),
		json!({ "nested": true }),
	]
}

#[test]
fn any_price_input_yields_ordered_non_negative_bounds() {
	for min in price_inputs() {
		for max in price_inputs() {
			let prefs = PreferenceRecord::from_value(&json!({
				"priceRange": { "min": min.clone(), "max": max.clone() },
				"bedroom": min.clone(),
				"garage": max.clone(),
			}));
			let query = ListingQuery::build(&prefs, &ViewedListingSet::new(), ListingQuery::LIST_LIMIT);

			assert!(query.price_min >= 0.0, "min {min} / max {max}");
			assert!(query.price_min <= query.price_max, "min {min} / max {max}");
			assert!(query.price_max.is_finite());
		}
	}
}

#[test]
fn stored_legacy_document_defaults_to_unbounded_price() {
	let prefs = PreferenceRecord::from_value(&json!({
		"listPrice": { "min": 0, "max": 0, "descricao": "Não informado" },
		"bedroom": 0,
	}));
	let query = ListingQuery::build(&prefs, &ViewedListingSet::new(), ListingQuery::SINGLE_LIMIT);

	assert_eq!(query.price_min, 0.0);
	assert_eq!(query.price_max, PRICE_CEILING);
	assert_eq!(query.min_rooms.bedrooms, 0);
	assert_eq!(query.limit, 1);
}

#[test]
fn retrieval_pipeline_excludes_viewed_and_describes_the_rest() {
	let rows: Vec<ListingRecord> = [
		json!({ "ListingID": "a1", "PropertyType": "Apartamento", "RentalPrice": 2500.0 }),
		json!({ "ListingID": "a2", "PropertyType": "Apartamento", "RentalPrice": 4800.0 }),
		json!({ "ListingID": "a3", "PropertyType": "Apartamento", "ListPrice": "consulte" }),
	]
	.into_iter()
	.filter_map(ListingRecord::from_value)
	.collect();
	let viewed: ViewedListingSet = ["a2"].into_iter().collect();
	let unseen = viewed::filter_unseen(rows, &viewed);
	let descriptions = describe::format_batch(&unseen);

	assert_eq!(unseen.len(), 2);
	assert!(descriptions[0].contains("R$2500.00"));
	assert_eq!(descriptions[1], describe::ERROR_PLACEHOLDER);
}
