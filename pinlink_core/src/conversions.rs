//! Conversions from `pinlink_config` TOML types to core runtime types.

use std::time::Duration;

use crate::config::TimingCfg;

impl From<&pinlink_config::Timing> for TimingCfg {
    fn from(t: &pinlink_config::Timing) -> Self {
        Self {
            handshake_timeout: Duration::from_millis(t.handshake_timeout_ms),
            handshake_retry: Duration::from_millis(t.handshake_retry_ms),
            heartbeat_interval: Duration::from_millis(t.heartbeat_interval_ms),
            heartbeat_timeout: Duration::from_millis(t.heartbeat_timeout_ms),
            state_timeout: t.state_timeout_ms.map(Duration::from_millis),
        }
    }
}
