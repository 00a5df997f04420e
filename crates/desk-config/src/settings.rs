//! Configuration structures.

use desk_core::types::FeedPlan;
use desk_ledger::TradeLimits;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub limits: TradeLimits,
    #[serde(default)]
    pub store: StoreSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "desksim".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Market feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSettings {
    /// Environment variable holding the feed credential; an unset variable
    /// means the desk runs without a live feed
    pub api_key_env: String,
    pub plan: FeedPlan,
    /// Retries after the first fetch attempt
    pub retries: u32,
    /// Fixed pause between attempts, in milliseconds
    pub backoff_ms: u64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            api_key_env: "POLYGON_API_KEY".to_string(),
            plan: FeedPlan::EndOfDay,
            retries: 2,
            backoff_ms: 100,
        }
    }
}

impl MarketSettings {
    /// The feed credential, if the configured variable is set.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok()
    }
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Root directory for the JSON store
    pub root: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            root: "data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_mirror_the_desk_constants() {
        let config = AppConfig::default();
        assert_eq!(config.limits.initial_balance, dec!(10000));
        assert_eq!(config.limits.spread, dec!(0.002));
        assert_eq!(config.limits.max_order_size, 1000);
        assert_eq!(config.limits.daily_trade_limit, 20);
        assert_eq!(config.market.retries, 2);
        assert_eq!(config.market.plan, FeedPlan::EndOfDay);
    }

    #[test]
    fn test_limits_section_deserializes_from_toml() {
        let raw = r#"
            [limits]
            initial_balance = "25000"
            spread = "0.005"
            max_order_size = 50
            daily_trade_limit = 5
            max_trade_fraction = "0.5"
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.limits.initial_balance, dec!(25000));
        assert_eq!(config.limits.max_order_size, 50);
        // Untouched sections fall back to defaults.
        assert_eq!(config.market.backoff_ms, 100);
    }
}
