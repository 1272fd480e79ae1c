//! Runtime configuration used by the `Controller`.
//!
//! Separate from the TOML-deserialized config in `pinlink_config`; see
//! `conversions` for the mapping.

use std::time::Duration;

/// Timing of the three activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingCfg {
    /// Deadline for a handshake request. Default: 5000 ms.
    pub handshake_timeout: Duration,
    /// Constant delay before the next handshake attempt. Default: 1500 ms.
    pub handshake_retry: Duration,
    /// Heartbeat cadence. Default: 500 ms.
    pub heartbeat_interval: Duration,
    /// Deadline for a heartbeat request. Default: 3000 ms.
    pub heartbeat_timeout: Duration,
    /// Deadline for a state command; `None` waits for the device.
    pub state_timeout: Option<Duration>,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_millis(5000),
            handshake_retry: Duration::from_millis(1500),
            heartbeat_interval: Duration::from_millis(500),
            heartbeat_timeout: Duration::from_millis(3000),
            state_timeout: None,
        }
    }
}

impl TimingCfg {
    pub(crate) fn check(&self) -> Result<(), &'static str> {
        if self.handshake_timeout.is_zero() {
            return Err("handshake timeout must be > 0");
        }
        if self.handshake_retry.is_zero() {
            return Err("handshake retry delay must be > 0");
        }
        if self.heartbeat_interval.is_zero() {
            return Err("heartbeat interval must be > 0");
        }
        if self.heartbeat_timeout.is_zero() {
            return Err("heartbeat timeout must be > 0");
        }
        Ok(())
    }
}
