//! Listing retrieval for the "next listing" and "summary" flows.

use serde::Serialize;

use crate::{HelenaService, Result, tracker};
use helena_domain::{
	ListingQuery, ListingRecord, PreferenceRecord, ViewedListingSet, describe, viewed,
};

pub const SUMMARY_INSTRUCTION: &str = "Você é um assistente imobiliário virtual. Analise as \
	descrições de imóveis encontradas abaixo. Crie um parágrafo curto e vendedor, destacando os \
	pontos mais atraentes ou as melhores opções gerais para um potencial comprador interessado \
	nesses critérios. Use um tom amigável e profissional.";
pub const NO_LISTINGS_MESSAGE: &str = "Nenhum imóvel encontrado com os critérios fornecidos.";
pub const NO_LISTINGS_ANALYSIS: &str = "Não há imóveis para analisar.";
const MISSING_ID: &str = "ID não encontrado";

/// Result of one warehouse round trip. A failed query is reported here instead of raised.
#[derive(Debug, Default)]
pub struct Retrieval {
	pub listings: Vec<ListingRecord>,
	pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextListing {
	pub title: String,
	pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingSummary {
	pub original_descriptions: Vec<String>,
	pub analysis: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl HelenaService {
	/// Runs the query built from `preferences` and drops listings already in `viewed`.
	pub async fn retrieve(
		&self,
		preferences: &PreferenceRecord,
		viewed: &ViewedListingSet,
		limit: u32,
	) -> Retrieval {
		let query = ListingQuery::build(preferences, viewed, limit);

		match self.warehouse.query(&query).await {
			Ok(rows) => Retrieval { listings: viewed::filter_unseen(rows, viewed), error: None },
			Err(err) => {
				tracing::error!(error = %err, stage = "warehouse_query", "Listing query failed.");

				Retrieval { listings: Vec::new(), error: Some(err.to_string()) }
			},
		}
	}

	/// One listing not yet shown to `user_code`, recorded as shown before returning.
	pub async fn next_listing(&self, user_code: &str) -> Result<NextListing> {
		let store = self.preferences();
		let preferences = store.load(user_code).await?;
		let viewed = store.load_viewed(user_code).await?;
		let retrieval = self.retrieve(&preferences, &viewed, ListingQuery::SINGLE_LIMIT).await;
		let Some(listing) = retrieval.listings.into_iter().next() else {
			return Err(crate::Error::NotFound {
				message: "Nenhum imóvel novo encontrado para os critérios informados.".to_string(),
			});
		};

		if let Some(id) = listing.id() {
			tracker::record_shown(&store, user_code, &[id]).await?;
		}

		Ok(NextListing {
			title: listing.id().unwrap_or_else(|| MISSING_ID.to_string()),
			description: describe::format_teaser(&listing),
		})
	}

	/// Describes up to ten unseen listings and asks the summarizer for a short pitch.
	pub async fn summarize_listings(&self, session_id: &str) -> Result<ListingSummary> {
		let store = self.preferences();
		let preferences = store.load(session_id).await?;
		let viewed = store.load_viewed(session_id).await?;
		let retrieval = self.retrieve(&preferences, &viewed, ListingQuery::LIST_LIMIT).await;

		if retrieval.listings.is_empty() {
			return Ok(ListingSummary {
				original_descriptions: Vec::new(),
				analysis: NO_LISTINGS_ANALYSIS.to_string(),
				message: Some(NO_LISTINGS_MESSAGE.to_string()),
			});
		}

		let descriptions = describe::format_batch(&retrieval.listings);
		let ids = retrieval.listings.iter().filter_map(ListingRecord::id).collect::<Vec<_>>();

		tracker::record_shown(&store, session_id, &ids).await?;

		let analysis = match self
			.providers
			.summarizer
			.summarize(&self.cfg.providers.summarizer, SUMMARY_INSTRUCTION, &descriptions)
			.await
		{
			Ok(text) => text,
			Err(err) => {
				tracing::warn!(error = %err, session_id, "Summary generation failed.");

				format!("Erro ao gerar conteúdo com IA: {err}")
			},
		};

		Ok(ListingSummary { original_descriptions: descriptions, analysis, message: None })
	}
}
