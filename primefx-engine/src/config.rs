use primefx_dispatch::AccountDefaults;
use primefx_session::SessionConfig;
use primefx_strategy::StrategyConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration file (spec.md §6.2): two FIX sessions — one
/// market-data, one order-routing — one strategy configuration, and the
/// handful of deployment knobs that have no wire representation at all.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub market_session: SessionConfig,
    pub order_session: SessionConfig,
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub account_defaults: Option<AccountDefaultsConfig>,
    /// Path the durable order-id counter is persisted to. Without one the
    /// sequence store keeps order ids in memory only, restarting from 1
    /// every process (fine for a one-off backtest run, not for live
    /// trading).
    #[serde(default)]
    pub order_id_path: Option<PathBuf>,
}

/// Serde mirror of [`AccountDefaults`] — the dispatcher's own type has no
/// `Deserialize` impl since nothing else needs one.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AccountDefaultsConfig {
    pub contract_size: Decimal,
    pub min_trade_size: Decimal,
}

impl From<AccountDefaultsConfig> for AccountDefaults {
    fn from(value: AccountDefaultsConfig) -> Self {
        AccountDefaults { contract_size: value.contract_size, min_trade_size: value.min_trade_size }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration file. Fatal at startup on
    /// any error (spec.md §7 "Configuration").
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn account_defaults(&self) -> AccountDefaults {
        self.account_defaults.map(AccountDefaults::from).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.market_session.market_data_session {
            return Err(ConfigError::Validation(
                "market_session must set market_data_session = true".to_string(),
            ));
        }
        if !self.order_session.order_session {
            return Err(ConfigError::Validation("order_session must set order_session = true".to_string()));
        }
        self.market_session.validate()?;
        self.order_session.validate()?;
        if self.strategy.symbols.is_empty() {
            return Err(ConfigError::Validation("strategy.symbols must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Session(#[from] primefx_session::SessionError),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toml_text() -> &'static str {
        r#"
        [market_session]
        sender_comp_id = "CLIENT"
        target_comp_id = "FXCM"
        username = "user"
        password = "pass"
        target_sub_id = "Q"
        market_data_session = true
        host = "127.0.0.1"
        port = 1

        [order_session]
        sender_comp_id = "CLIENT"
        target_comp_id = "FXCM"
        username = "user"
        password = "pass"
        target_sub_id = "T"
        order_session = true
        host = "127.0.0.1"
        port = 2

        [strategy]
        max_short_pos = 1
        max_long_pos = 1
        max_pip_risk = "10"
        max_risk = "0.01"
        max_qty = "1000000"
        max_spread = "3"
        renko_size = "10"
        sma_size = 14
        wait_bricks = 2
        symbols = ["EUR/USD"]
        "#
    }

    #[test]
    fn parses_and_validates_a_well_formed_config() {
        let config: EngineConfig = toml::from_str(toml_text()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.account_defaults().contract_size, Decimal::new(100_000, 0));
    }

    #[test]
    fn rejects_a_market_session_not_marked_as_such() {
        let mut config: EngineConfig = toml::from_str(toml_text()).unwrap();
        config.market_session.market_data_session = false;
        assert!(config.validate().is_err());
    }
}
