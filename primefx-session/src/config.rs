use serde::Deserialize;

/// FIX session configuration (spec.md §6.2), consumed — never produced — by
/// the core. One `SessionConfig` drives one logical session; a deployment
/// typically runs two (market data, order routing) distinguished by
/// `market_data_session`/`order_session`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub sender_comp_id: String,
    pub target_comp_id: String,
    pub username: String,
    pub password: String,
    pub target_sub_id: String,
    #[serde(default)]
    pub market_data_session: bool,
    #[serde(default)]
    pub order_session: bool,
    pub host: String,
    pub port: u16,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u32,
    #[serde(default)]
    pub reset_seq_num_on_logon: bool,
}

fn default_heartbeat_interval_secs() -> u32 {
    30
}

impl SessionConfig {
    /// Fatal-at-startup validation (spec.md §7 "Configuration").
    pub fn validate(&self) -> Result<(), crate::error::SessionError> {
        if !self.market_data_session && !self.order_session {
            return Err(crate::error::SessionError::Configuration(
                "session must be designated MarketDataSession, OrderSession, or both".to_string(),
            ));
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(crate::error::SessionError::Configuration(
                "Username and Password are required".to_string(),
            ));
        }
        Ok(())
    }
}
