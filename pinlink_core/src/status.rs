//! Connection status and the outcomes returned by each loop step.

use pinlink_traits::{LinkError, PinState};
use tokio::time::Instant;

pub const CONTACTING_LABEL: &str = "Contacting...";
pub const ONLINE_LABEL: &str = "Device is Online";
pub const OFFLINE_LABEL: &str = "Device Offline";
pub const NO_BODY_LABEL: &str = "No response body";

/// Process-wide connection status, written only by the handshake and heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Contacting,
    Online,
    Offline,
}

/// Result of one handshake attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum HandshakeOutcome {
    /// Sentinel present; controls enabled, nothing scheduled.
    Online,
    /// Device answered without the sentinel; retry armed unless stopped.
    NotReady {
        body: String,
        retry_at: Option<Instant>,
    },
    /// Request failed; retry armed unless stopped.
    Failed {
        error: LinkError,
        retry_at: Option<Instant>,
    },
}

impl HandshakeOutcome {
    pub fn is_online(&self) -> bool {
        matches!(self, HandshakeOutcome::Online)
    }

    pub fn retry_at(&self) -> Option<Instant> {
        match self {
            HandshakeOutcome::Online => None,
            HandshakeOutcome::NotReady { retry_at, .. }
            | HandshakeOutcome::Failed { retry_at, .. } => *retry_at,
        }
    }
}

/// Result of one heartbeat tick.
#[derive(Debug, Clone, PartialEq)]
pub enum HeartbeatOutcome {
    Online,
    NotReady,
    Failed(LinkError),
}

/// Result of a user press on a state control.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Controls were disabled; nothing was sent.
    Ignored,
    Sent { state: PinState, body: String },
    Failed { state: PinState, error: LinkError },
}
