use std::sync::Arc;

use pricematch_service::MatchService;
use pricematch_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MatchService>,
}
impl AppState {
	pub async fn new(config: pricematch_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = MatchService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}
}
