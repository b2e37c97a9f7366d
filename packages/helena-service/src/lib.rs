pub mod inbox;
pub mod listings;
pub mod preferences;
pub mod register;
pub mod tracker;

mod error;

pub use error::{Error, Result};
pub use helena_storage::BoxFuture;
pub use inbox::{FlushSink, InboundOutcome, MessageCoalescer};
pub use listings::{ListingSummary, NextListing, Retrieval};
pub use preferences::PreferenceStore;
pub use register::RegisterResponse;

use std::{sync::Arc, time::Duration};

use helena_config::{Config, DialogProviderConfig, LlmProviderConfig, WhatsApp};
use helena_providers::{dialog, summarizer, whatsapp};
use helena_storage::{DocumentStore, ListingWarehouse};

pub trait SummaryProvider
where
	Self: Send + Sync,
{
	fn summarize<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		instruction: &'a str,
		descriptions: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

pub trait DialogAgent
where
	Self: Send + Sync,
{
	fn detect_intent<'a>(
		&'a self,
		cfg: &'a DialogProviderConfig,
		session: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

pub trait MessagingChannel
where
	Self: Send + Sync,
{
	fn send_text<'a>(
		&'a self,
		cfg: &'a WhatsApp,
		to: &'a str,
		body: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub summarizer: Arc<dyn SummaryProvider>,
	pub dialog: Arc<dyn DialogAgent>,
	pub messaging: Arc<dyn MessagingChannel>,
}
impl Providers {
	pub fn new(
		summarizer: Arc<dyn SummaryProvider>,
		dialog: Arc<dyn DialogAgent>,
		messaging: Arc<dyn MessagingChannel>,
	) -> Self {
		Self { summarizer, dialog, messaging }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { summarizer: provider.clone(), dialog: provider.clone(), messaging: provider }
	}
}

pub struct HelenaService {
	pub cfg: Arc<Config>,
	pub documents: Arc<dyn DocumentStore>,
	pub warehouse: Arc<dyn ListingWarehouse>,
	pub providers: Providers,
	pub inbox: Arc<MessageCoalescer>,
}
impl HelenaService {
	pub fn new(
		cfg: Config,
		documents: Arc<dyn DocumentStore>,
		warehouse: Arc<dyn ListingWarehouse>,
	) -> Self {
		Self::with_providers(cfg, documents, warehouse, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		documents: Arc<dyn DocumentStore>,
		warehouse: Arc<dyn ListingWarehouse>,
		providers: Providers,
	) -> Self {
		let cfg = Arc::new(cfg);
		let relay = Arc::new(inbox::AgentRelay::new(cfg.clone(), providers.clone()));
		let inbox = MessageCoalescer::new(
			Duration::from_millis(cfg.inbox.debounce_ms),
			cfg.inbox.buffer_limit,
			relay,
		);

		Self { cfg, documents, warehouse, providers, inbox }
	}

	pub fn preferences(&self) -> PreferenceStore {
		PreferenceStore::new(self.documents.clone())
	}
}

struct DefaultProviders;

impl SummaryProvider for DefaultProviders {
	fn summarize<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		instruction: &'a str,
		descriptions: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(summarizer::summarize(cfg, instruction, descriptions))
	}
}

impl DialogAgent for DefaultProviders {
	fn detect_intent<'a>(
		&'a self,
		cfg: &'a DialogProviderConfig,
		session: &'a str,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(dialog::detect_intent(cfg, session, text))
	}
}

impl MessagingChannel for DefaultProviders {
	fn send_text<'a>(
		&'a self,
		cfg: &'a WhatsApp,
		to: &'a str,
		body: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(whatsapp::send_text(cfg, to, body))
	}
}
