//! Engine configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the transaction engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the storefront backend
    pub base_url: String,
    /// Store the client orders against
    pub store_id: String,
    /// Directory for the persisted cache and file logs
    pub work_dir: PathBuf,
    /// Caller-imposed timeout on serviceability checks; on expiry the
    /// location is treated as not serviceable rather than hanging checkout
    pub serviceability_timeout: Duration,
    /// Interval of the background reconcile loop
    pub sync_interval: Duration,
    /// Name of the hosted payment gateway, sent with verification
    pub payment_gateway: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            store_id: "store-1".into(),
            work_dir: PathBuf::from("./work_dir"),
            serviceability_timeout: Duration::from_secs(5),
            sync_interval: Duration::from_secs(60),
            payment_gateway: "razorpay".into(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("POMELO_BASE_URL").unwrap_or(defaults.base_url),
            store_id: std::env::var("POMELO_STORE_ID").unwrap_or(defaults.store_id),
            work_dir: std::env::var("POMELO_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            serviceability_timeout: std::env::var("POMELO_SERVICEABILITY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.serviceability_timeout),
            sync_interval: std::env::var("POMELO_SYNC_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sync_interval),
            payment_gateway: std::env::var("POMELO_PAYMENT_GATEWAY")
                .unwrap_or(defaults.payment_gateway),
        }
    }

    /// Create a config pointed at a specific backend and work dir
    pub fn with_overrides(base_url: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::from_env();
        config.base_url = base_url.into();
        config.work_dir = work_dir.into();
        config
    }

    /// Path of the persisted engine cache file
    pub fn cache_path(&self) -> PathBuf {
        self.work_dir.join("engine_cache.json")
    }
}
