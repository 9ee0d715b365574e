use std::env;
use tracing::warn;

/// Default number of days the best-slot search scans ahead.
pub const DEFAULT_BOOKING_HORIZON_DAYS: u32 = 14;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub booking_horizon_days: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("STORE_URL")
                .unwrap_or_else(|_| {
                    warn!("STORE_URL not set, using empty value");
                    String::new()
                }),
            store_api_key: env::var("STORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("STORE_API_KEY not set, using empty value");
                    String::new()
                }),
            booking_horizon_days: env::var("BOOKING_HORIZON_DAYS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_BOOKING_HORIZON_DAYS),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Used by tests to point the store client at a local mock server.
    pub fn for_store(store_url: impl Into<String>, store_api_key: impl Into<String>) -> Self {
        Self {
            store_url: store_url.into(),
            store_api_key: store_api_key.into(),
            booking_horizon_days: DEFAULT_BOOKING_HORIZON_DAYS,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty() && !self.store_api_key.is_empty()
    }
}
