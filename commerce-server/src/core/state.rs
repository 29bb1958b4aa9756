use sqlx::SqlitePool;
use std::sync::Arc;

use crate::core::Config;
use crate::db::DbService;
use crate::services::{
    CartService, CatalogService, CheckoutService, LiveSessionService, OrderService,
    StreamNotifier, notification,
};

/// Shared server state: configuration, pool, outbound adapters.
///
/// Cheap to clone — everything inside is a handle.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub db: SqlitePool,
    /// Stream-started notification sink
    pub notifier: Arc<dyn StreamNotifier>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("db", &"<SqlitePool>")
            .finish()
    }
}

impl ServerState {
    pub fn new(config: Config, db: SqlitePool, notifier: Arc<dyn StreamNotifier>) -> Self {
        Self {
            config,
            db,
            notifier,
        }
    }

    /// Initialize the server state:
    /// 1. work directory layout
    /// 2. database pool + migrations
    /// 3. notification adapter
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_dir().join("commerce.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize database: {e}"))?;

        let notifier = notification::from_config(config);

        Ok(Self::new(config.clone(), db_service.pool, notifier))
    }

    pub fn get_db(&self) -> SqlitePool {
        self.db.clone()
    }

    // Services are cheap per-request constructions over the shared pool

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.db.clone())
    }

    pub fn cart(&self) -> CartService {
        CartService::new(self.db.clone())
    }

    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.db.clone(), &self.config)
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.db.clone())
    }

    pub fn live(&self) -> LiveSessionService {
        LiveSessionService::new(self.db.clone(), Arc::clone(&self.notifier))
    }
}
