use chrono_tz::Tz;
use std::path::PathBuf;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/commerce-server | Work directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | BUSINESS_TIMEZONE | Asia/Jakarta | Date scope for order numbers |
/// | ORDER_PREFIX | ORD | Order number prefix |
/// | DEFAULT_SHIPPING_FEE | 0 | Shipping fee when checkout omits one |
/// | NOTIFY_WEBHOOK_URL | (unset) | Notification service endpoint |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/commerce HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Business timezone; order-number dates roll over at its midnight
    pub timezone: Tz,
    /// Order number prefix (PREFIX + YYYYMMDD + 4-digit sequence)
    pub order_prefix: String,
    /// Applied when a checkout does not specify a shipping fee
    pub default_shipping_fee: i64,
    /// Notification service webhook; notifications are disabled when unset
    pub notify_webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/commerce-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("BUSINESS_TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Asia::Jakarta),
            order_prefix: std::env::var("ORDER_PREFIX").unwrap_or_else(|_| "ORD".into()),
            default_shipping_fee: std::env::var("DEFAULT_SHIPPING_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
        }
    }

    /// Override the bits tests care about
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory layout if it does not exist yet
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
