//! Application state wiring all services together.
//!
//! AppState holds the concrete assistant and store instances used by both
//! the CLI and the REST API. The assistant is generic over the store and
//! backend traits; AppState pins it to the infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use aide_core::assistant::Assistant;
use aide_core::llm::BoxInferenceBackend;
use aide_infra::config::{load_assistant_config, resolve_data_dir};
use aide_infra::llm::ollama::OllamaBackend;
use aide_infra::sqlite::memory::SqliteMemoryStore;
use aide_infra::sqlite::pool::DatabasePool;
use aide_types::config::AssistantConfig;

/// Concrete type alias for the assistant pinned to infra implementations.
pub type ConcreteAssistant = Assistant<SqliteMemoryStore>;

/// Shared application state used by both CLI commands and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<ConcreteAssistant>,
    pub store: Arc<SqliteMemoryStore>,
    pub config: AssistantConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: resolve the data directory, connect
    /// to the database, load config, and wire the assistant.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("aide.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        let config = load_assistant_config(&data_dir).await;

        let store = Arc::new(SqliteMemoryStore::new(db_pool.clone()));

        let backend = Arc::new(BoxInferenceBackend::new(OllamaBackend::new(
            config.ollama_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )));

        let assistant = Arc::new(Assistant::new(backend, store.clone(), config.clone()));

        Ok(Self {
            assistant,
            store,
            config,
            data_dir,
            db_pool,
        })
    }
}
