//! Commerce Server - live-commerce transactional core
//!
//! # Architecture overview
//!
//! The server owns the parts of a live-shopping platform with real
//! invariants: carts, the checkout transaction, order state machines, and
//! the broadcast session state machine. Catalog management, authentication,
//! media transport and payment gateways live behind external collaborators.
//!
//! # Module structure
//!
//! ```text
//! commerce-server/src/
//! ├── core/          # Config, state, HTTP server
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── services/      # Catalog, cart, checkout, orders, live sessions
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Errors, logging
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use db::DbService;
pub use services::{
    CartService, CatalogService, CheckoutService, LiveSessionService, OrderService,
};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Prepare the process environment: dotenv, then logging
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
    let is_production = environment == "production";
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if is_production { "info".into() } else { "debug".into() }
    });
    let log_dir = std::env::var("LOG_DIR").ok();

    init_logger_with_file(&level, is_production, log_dir.as_deref())
}

/// Startup banner
pub fn print_banner() {
    tracing::info!("==============================================");
    tracing::info!("  Commerce Server - live commerce core");
    tracing::info!("  version {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("==============================================");
}
