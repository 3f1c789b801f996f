//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Downstream Services ===
    /// Auth service port (Spring-style backend).
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,

    /// Item service port (FastAPI-style backend).
    #[serde(default = "default_item_port")]
    pub item_port: u16,

    /// Network-visible hostname the stack was reached through, if any.
    ///
    /// When set, downstream addresses mirror this host instead of
    /// localhost, the same way the original dashboard mirrored the
    /// browser's hostname onto its backend calls.
    #[serde(default)]
    pub advertised_host: Option<String>,

    // === Watcher ===
    /// Seconds between health-check batches.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    // === HTTP Client ===
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Connection pool size per host.
    #[serde(default = "default_http_pool_size")]
    pub http_pool_size: usize,

    // === Server Configuration ===
    /// HTTP server port for the aggregated status endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable the Prometheus metrics exporter.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_auth_port() -> u16 {
    8080
}

fn default_item_port() -> u16 {
    8000
}

fn default_poll_interval() -> u64 {
    30
}

fn default_http_timeout_ms() -> u64 {
    5000
}

fn default_http_pool_size() -> usize {
    10
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth_port == self.item_port {
            return Err(format!(
                "AUTH_PORT and ITEM_PORT must differ (both are {})",
                self.auth_port
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err("POLL_INTERVAL_SECS must be at least 1".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be at least 1".to_string());
        }

        if let Some(host) = &self.advertised_host {
            if host.trim().is_empty() {
                return Err("ADVERTISED_HOST must not be blank when set".to_string());
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_port: default_auth_port(),
            item_port: default_item_port(),
            advertised_host: None,
            poll_interval_secs: default_poll_interval(),
            http_timeout_ms: default_http_timeout_ms(),
            http_pool_size: default_http_pool_size(),
            port: default_port(),
            metrics_enabled: default_true(),
            metrics_port: default_metrics_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}
