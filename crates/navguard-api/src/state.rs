//! Application state wiring all services together.
//!
//! AppState pins the core services to the SQLite durable store and holds the
//! loaded configuration. The conversation front door is built per transport.

use std::path::PathBuf;
use std::sync::Arc;

use navguard_core::conversation::ConversationService;
use navguard_core::dispatch::{CallbackRegistry, register_default_handlers};
use navguard_core::guard::AbuseGuard;
use navguard_core::menu::{MenuRegistry, NavigationEngine, RegistryReport};
use navguard_core::session::SessionStore;
use navguard_core::transport::BoxChatTransport;
use navguard_infra::config::load_global_config;
use navguard_infra::data_dir::{ensure_data_dir, resolve_data_dir};
use navguard_infra::sqlite::pool::database_url;
use navguard_infra::sqlite::{DatabasePool, SqliteMenuStateStore};
use navguard_types::config::GlobalConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    pub store: Arc<SqliteMenuStateStore>,
    pub registry_report: RegistryReport,
    pub engine: Arc<NavigationEngine>,
    pub guard: Arc<AbuseGuard>,
}

impl AppState {
    /// Resolve the data directory, load config, open the database, and wire
    /// the engine.
    pub async fn init() -> anyhow::Result<Self> {
        Self::init_at(resolve_data_dir()).await
    }

    pub async fn init_at(data_dir: PathBuf) -> anyhow::Result<Self> {
        ensure_data_dir(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let db_pool = DatabasePool::new(&format!("{}?mode=rwc", database_url(&data_dir))).await?;
        let store = Arc::new(SqliteMenuStateStore::new(db_pool.clone()));

        let (registry, registry_report) = MenuRegistry::builtin()?;
        let sessions = SessionStore::new(Arc::clone(&store));
        let engine = Arc::new(NavigationEngine::new(
            Arc::new(registry),
            Arc::new(sessions),
        ));
        let guard = Arc::new(AbuseGuard::new(config.guard.clone()));

        tracing::debug!(data_dir = %data_dir.display(), "application state initialized");

        Ok(Self {
            config,
            data_dir,
            db_pool,
            store,
            registry_report,
            engine,
            guard,
        })
    }

    /// Build the callback table from config and the default handlers.
    pub fn callbacks(&self) -> CallbackRegistry {
        register_default_handlers(
            CallbackRegistry::builder(self.config.dispatch.clone()),
            Arc::clone(&self.engine),
        )
        .build()
    }

    /// Conversation front door speaking through `transport`.
    pub fn conversation(&self, transport: Arc<BoxChatTransport>) -> ConversationService {
        ConversationService::new(
            Arc::clone(&self.engine),
            Arc::new(self.callbacks()),
            Arc::clone(&self.guard),
            transport,
        )
    }
}
