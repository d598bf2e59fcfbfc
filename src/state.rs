use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm::LlmClient;
use crate::search::HybridSearchClient;
use crate::storage::blob::BlobSigner;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub search: Arc<HybridSearchClient>,
    pub llm: Arc<LlmClient>,
    pub blob: Arc<BlobSigner>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_db_connections)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to Postgres")?;

        // Generation calls can take a while; keep the connect timeout short
        // so an unreachable backend fails fast.
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;

        let search = Arc::new(HybridSearchClient::new(
            http_client.clone(),
            config.search.clone(),
            config.llm.clone(),
        ));
        let llm = Arc::new(LlmClient::new(http_client, config.llm.clone()));
        let blob = Arc::new(BlobSigner::new(config.blob.clone()));

        Ok(Self {
            config,
            pool,
            search,
            llm,
            blob,
        })
    }
}
