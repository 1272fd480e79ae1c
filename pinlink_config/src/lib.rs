#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the device client.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Every section and field is optional; absent values take the defaults
//!   the device firmware was built against.
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://esp32.local";
pub const DEFAULT_SENTINEL: &str = "DEVICE_ONLINE";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Base URL the three endpoints hang off
    pub base_url: String,
    /// Substring a body must contain for the device to count as ready
    pub sentinel: String,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Deadline for one handshake request (ms)
    pub handshake_timeout_ms: u64,
    /// Constant delay before the next handshake attempt (ms)
    pub handshake_retry_ms: u64,
    /// Heartbeat cadence (ms)
    pub heartbeat_interval_ms: u64,
    /// Deadline for one heartbeat request (ms)
    pub heartbeat_timeout_ms: u64,
    /// Optional deadline for state commands; unset waits indefinitely
    pub state_timeout_ms: Option<u64>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: 5000,
            handshake_retry_ms: 1500,
            heartbeat_interval_ms: 500,
            heartbeat_timeout_ms: 3000,
            state_timeout_ms: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sim {
    /// Handshakes the simulated device answers with "booting" before it is ready
    pub boot_attempts: u32,
}

impl Default for Sim {
    fn default() -> Self {
        Self { boot_attempts: 2 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub device: Device,
    pub timing: Timing,
    pub logging: Logging,
    pub sim: Sim,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config file {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Device
        let url = self.device.base_url.trim();
        let scheme_ok = url.starts_with("http://") || url.starts_with("https://");
        let host_ok = url.split_once("://").is_some_and(|(_, h)| !h.is_empty());
        if !scheme_ok || !host_ok {
            eyre::bail!("device.base_url must start with http:// or https:// and name a host");
        }
        if self.device.sentinel.trim().is_empty() {
            eyre::bail!("device.sentinel must not be empty");
        }

        // Timing
        if self.timing.handshake_timeout_ms == 0 {
            eyre::bail!("timing.handshake_timeout_ms must be >= 1");
        }
        if self.timing.handshake_retry_ms == 0 {
            eyre::bail!("timing.handshake_retry_ms must be >= 1");
        }
        if self.timing.heartbeat_interval_ms == 0 {
            eyre::bail!("timing.heartbeat_interval_ms must be >= 1");
        }
        if self.timing.heartbeat_timeout_ms == 0 {
            eyre::bail!("timing.heartbeat_timeout_ms must be >= 1");
        }
        if self.timing.state_timeout_ms == Some(0) {
            eyre::bail!("timing.state_timeout_ms must be >= 1 when set");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{r}'");
        }

        Ok(())
    }
}
