pub mod clock;

pub use clock::{Clock, LocalClock};

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Level of the remote output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinState {
    High,
    Low,
}

impl PinState {
    /// Wire spelling used in the state URL and on the panel.
    pub fn as_str(self) -> &'static str {
        match self {
            PinState::High => "HIGH",
            PinState::Low => "LOW",
        }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown pin state '{0}' (expected HIGH or LOW)")]
pub struct ParsePinStateError(pub String);

impl FromStr for PinState {
    type Err = ParsePinStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(PinState::High),
            "LOW" => Ok(PinState::Low),
            _ => Err(ParsePinStateError(s.to_string())),
        }
    }
}

/// Visual tone of a panel label. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Muted,
    Ok,
    Warn,
    Danger,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Muted => "muted",
            Tone::Ok => "ok",
            Tone::Warn => "warn",
            Tone::Danger => "danger",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three device endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Handshake,
    Heartbeat,
    State(PinState),
}

impl Endpoint {
    /// Path and query relative to the device base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Handshake => "/handshake".to_string(),
            Endpoint::Heartbeat => "/heartbeat".to_string(),
            Endpoint::State(s) => format!("/heartbeat/state?={}", s.as_str()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("HTTP {0}")]
    Http(u16),
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
}

impl LinkError {
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, LinkError::Timeout(_))
    }
}

/// Transport to the device: one uncached GET returning the body as text.
pub trait DeviceLink: Send + Sync + 'static {
    fn fetch(
        &self,
        endpoint: Endpoint,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<String, LinkError>> + Send;
}

/// UI projection surface. Implementations only render; they hold no logic.
pub trait Panel: Send + Sync + 'static {
    fn set_status(&self, text: &str, tone: Tone);
    fn set_state(&self, text: &str, tone: Tone);
    fn set_controls_enabled(&self, enabled: bool);
    fn set_banner_visible(&self, visible: bool);
    /// Prepend an already stamped line to the log.
    fn push_log(&self, line: &str);
}
