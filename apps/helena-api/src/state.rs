use std::sync::Arc;

use helena_service::HelenaService;
use helena_storage::{db::Db, document::PgDocumentStore, warehouse::PgWarehouse};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<HelenaService>,
}
impl AppState {
	pub async fn new(config: helena_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let documents = Arc::new(PgDocumentStore::new(db.clone()));
		let warehouse = Arc::new(PgWarehouse::new(db));

		Ok(Self::from_service(HelenaService::new(config, documents, warehouse)))
	}

	pub fn from_service(service: HelenaService) -> Self {
		Self { service: Arc::new(service) }
	}
}
