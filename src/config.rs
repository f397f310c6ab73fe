use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Top-level configuration, loaded from TOML with environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub http: HttpConfig,
    pub enrichment: EnrichmentConfig,
    pub deals: DealsConfig,
    pub browser: BrowserConfig,
    pub logging: LoggingConfig,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Detail-page enrichment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Maximum number of detail pages fetched at once
    pub max_in_flight: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self { max_in_flight: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealsConfig {
    /// Only auctions ending within this many hours are scored
    pub ending_within_hours: i64,
}

impl Default for DealsConfig {
    fn default() -> Self {
        Self {
            ending_within_hours: 24,
        }
    }
}

/// Headless Chrome settings for client-rendered sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// How long to wait for auction cards to render
    pub settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            settle_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ScoutConfig {
    /// Load from a TOML file. A missing path yields the defaults.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        // .env is optional
        if dotenvy::dotenv().is_ok() {
            debug!("Loaded .env file");
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Apply `SCOUT_*` overrides from the given variable source.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ua) = var("SCOUT_USER_AGENT") {
            self.http.user_agent = ua;
        }
        if let Some(raw) = var("SCOUT_TIMEOUT_SECS") {
            self.http.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "SCOUT_TIMEOUT_SECS",
                reason: format!("not an integer: {raw}"),
            })?;
        }
        if let Some(raw) = var("SCOUT_MAX_IN_FLIGHT") {
            self.enrichment.max_in_flight =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "SCOUT_MAX_IN_FLIGHT",
                    reason: format!("not an integer: {raw}"),
                })?;
        }
        if let Some(raw) = var("SCOUT_BROWSER_HEADLESS") {
            self.browser.headless = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "SCOUT_BROWSER_HEADLESS",
                reason: format!("expected true or false: {raw}"),
            })?;
        }
        if let Some(level) = var("SCOUT_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "http.user_agent",
                reason: "cannot be empty".into(),
            });
        }
        if self.enrichment.max_in_flight == 0 {
            return Err(ConfigError::InvalidValue {
                field: "enrichment.max_in_flight",
                reason: "must be greater than zero".into(),
            });
        }
        if self.deals.ending_within_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "deals.ending_within_hours",
                reason: "must be positive".into(),
            });
        }
        if self.browser.settle_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "browser.settle_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"pretty\" or \"json\", got {:?}", self.logging.format),
            });
        }
        Ok(())
    }
}
