use crate::services::projection::is_valid_date_format;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Environment variable that supplies the complaint API base URL.
pub const API_BASE_URL_ENV: &str = "API_BASE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub reset: ResetConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layers built-in defaults, an optional `config.toml`, `PORTAL__*`
    /// environment variables and finally `API_BASE_URL`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__"),
            );

        if let Ok(base_url) = std::env::var(API_BASE_URL_ENV) {
            builder = builder.set_override("api.base_url", base_url)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults with `API_BASE_URL` still applied; used when the
    /// layered configuration cannot be loaded.
    pub fn fallback() -> Self {
        Self::defaults_with_base_url(std::env::var(API_BASE_URL_ENV).ok())
    }

    fn defaults_with_base_url(base_url: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = base_url.filter(|url| !url.is_empty()) {
            config.api.base_url = base_url;
        }
        config
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !is_valid_date_format(&self.display.date_format) {
            return Err(config::ConfigError::Message(format!(
                "display.date_format: invalid strftime pattern {:?}",
                self.display.date_format
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Zero leaves the transport's own behavior in charge.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_secs: 0,
            user_agent: "ComplaintPortal/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Grace period between a confirmed reset request and the move to
    /// the set-password screen.
    pub redirect_delay_ms: u64,
}

impl ResetConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            redirect_delay_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// chrono format string used for complaint creation dates.
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: "%-m/%-d/%Y".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            file_prefix: "portal.log".to_string(),
        }
    }
}
