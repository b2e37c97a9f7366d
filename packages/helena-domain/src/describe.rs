//! pt-BR sentences for listing records.

use serde_json::Value;

use crate::listing::{ListingRecord, NotNumeric};

pub const ERROR_PLACEHOLDER: &str = "Erro ao processar dados numéricos para um imóvel.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Listing {listing_id} has a non-numeric {field}.")]
pub struct PartialRecordError {
	pub listing_id: String,
	pub field: &'static str,
}

/// Full description of one listing. Missing fields render a placeholder; a field that must be
/// numeric but is not fails the record.
pub fn format(listing: &ListingRecord) -> Result<String, PartialRecordError> {
	let malformed = |field: &'static str| {
		move |_: NotNumeric| PartialRecordError {
			listing_id: listing.id().unwrap_or_else(|| "?".to_string()),
			field,
		}
	};
	// A sale price of zero or less means the listing is rent-only.
	let list_price = listing
		.number(&["ListPrice"])
		.map_err(malformed("ListPrice"))?
		.filter(|price| *price > 0.0);
	let rental_price = listing.number(&["RentalPrice"]).map_err(malformed("RentalPrice"))?;
	let price = match (list_price, rental_price) {
		(Some(price), _) => format!("Preço: R${price:.2}."),
		(None, Some(rent)) => format!("Preço de aluguel: R${rent:.2}."),
		(None, None) => "Preço: Preço não informado.".to_string(),
	};
	let mut parts = vec![
		"Imóvel encontrado:".to_string(),
		format!(
			"{} em {}, {}, no bairro {}.",
			text_or(listing, &["PropertyType"], "Tipo não informado"),
			text_or(listing, &["City"], "Cidade não informada"),
			text_or(listing, &["State"], "Estado não informado"),
			text_or(listing, &["Neighborhood"], "Bairro não informado"),
		),
		price,
		format!("Área útil: {} m².", text_or(listing, &["LivingArea"], "Não informada")),
		format!(
			"Quartos: {}, Banheiros: {}, Suítes: {}, Garagem: {} vaga(s).",
			text_or(listing, &["Bedrooms", "Bedroom"], "Não informado"),
			text_or(listing, &["Bathrooms", "Bathroom"], "Não informado"),
			text_or(listing, &["Suites", "Suite"], "Não informado"),
			text_or(listing, &["GarageSpaces", "Garage"], "Não informado"),
		),
	];

	if let Some(features) = features(listing) {
		parts.push(format!("Características: {features}."));
	}

	Ok(parts.join(" "))
}

/// One sentence per listing; a malformed record yields `ERROR_PLACEHOLDER` in its slot and the
/// rest still render.
pub fn format_batch(listings: &[ListingRecord]) -> Vec<String> {
	listings
		.iter()
		.map(|listing| {
			format(listing).unwrap_or_else(|err| {
				tracing::warn!(listing_id = %err.listing_id, field = err.field, "Skipping malformed listing.");

				ERROR_PLACEHOLDER.to_string()
			})
		})
		.collect()
}

/// Short sentence used when surfacing a single listing.
pub fn format_teaser(listing: &ListingRecord) -> String {
	let rent = match listing.get("RentalPrice") {
		Some(Value::Number(number)) =>
			number.as_f64().map(|rent| format!("{rent:.2}")).unwrap_or_else(|| number.to_string()),
		Some(_) => text_or(listing, &["RentalPrice"], "N/A"),
		None => "N/A".to_string(),
	};

	format!(
		"Imóvel {}, {} com {} quartos, {} banheiros e {} vagas de garagem. Preço de aluguel: R${}.",
		text_or(listing, &["Title"], "Título não encontrado"),
		text_or(listing, &["City"], "Cidade não encontrada"),
		text_or(listing, &["Bedrooms", "Bedroom"], "N/A"),
		text_or(listing, &["Bathrooms", "Bathroom"], "N/A"),
		text_or(listing, &["GarageSpaces", "Garage"], "N/A"),
		rent,
	)
}

fn text_or(listing: &ListingRecord, keys: &[&str], placeholder: &str) -> String {
	keys.iter().find_map(|key| listing.text(key)).unwrap_or_else(|| placeholder.to_string())
}

fn features(listing: &ListingRecord) -> Option<String> {
	match listing.get("Features")? {
		Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
		Value::Array(items) => {
			let joined = items
				.iter()
				.filter_map(Value::as_str)
				.map(str::trim)
				.filter(|item| !item.is_empty())
				.collect::<Vec<_>>()
				.join(", ");

			(!joined.is_empty()).then_some(joined)
		},
		_ => None,
	}
}
