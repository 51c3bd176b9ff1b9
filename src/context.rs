use anyhow::Result;
use chronicle_common::{
    CannedInsights, ChronicleConfig, FileMirror, InsightBackend, InsightGenerator, OllamaInsights,
    RecordStore, RestStore, SqliteStore, StoreBackend, StoreClient,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::controller::AppContext;
use crate::prompt::{ConfirmPrompt, Notifier};

pub async fn connect_store(config: &ChronicleConfig) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match &config.store {
        StoreBackend::Rest { url, api_key } => {
            let store = RestStore::new(url.clone(), api_key.clone(), &config.table);
            if !store.is_configured() {
                warn!("SUPABASE_URL or SUPABASE_ANON_KEY is unset; remote sync will fail");
            }
            Arc::new(store)
        }
        StoreBackend::Sqlite { url } => {
            info!("Using SQLite store at {}", url);
            Arc::new(SqliteStore::connect(url, &config.table).await?)
        }
    };
    Ok(store)
}

pub fn insight_generator(config: &ChronicleConfig) -> Box<dyn InsightGenerator> {
    match &config.insights {
        InsightBackend::Canned { latency } => Box::new(CannedInsights::new(*latency)),
        InsightBackend::Ollama { host, model } => {
            info!("Using Ollama model {} at {}", model, host);
            Box::new(OllamaInsights::new(host, model))
        }
    }
}

/// Wire every collaborator named by the configuration.
pub async fn build_context(
    config: &ChronicleConfig,
    confirm: Box<dyn ConfirmPrompt>,
    notifier: Box<dyn Notifier>,
) -> Result<AppContext> {
    Ok(AppContext {
        store: StoreClient::new(connect_store(config).await?),
        mirror: Box::new(FileMirror::new(&config.data_dir)),
        insights: insight_generator(config),
        confirm,
        notifier,
    })
}
