use pinlink_traits::PinState;

use crate::status::ConnectionStatus;

/// Mutable UI-facing state of one client session.
///
/// Owned by the `Controller`; there are no process globals. Everything
/// resets when a new controller is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub status: ConnectionStatus,
    /// Last state the device acknowledged; not confirmed against the pin.
    pub last_state: Option<PinState>,
    pub controls_enabled: bool,
    pub banner_visible: bool,
    /// Set after the first heartbeat timeout is logged, cleared on success.
    pub timeout_logged: bool,
    /// Set by `shutdown`; no handshake retry is armed or run while set.
    pub stopped: bool,
}
