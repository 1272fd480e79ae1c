//! One-shot flows built on the controller, for non-interactive callers.

use std::sync::Arc;

use pinlink_traits::{Clock, DeviceLink, Panel, PinState};
use tracing::info;

use crate::controller::Controller;
use crate::error::{ControlError, Result};
use crate::status::{CommandOutcome, HandshakeOutcome, HeartbeatOutcome};

/// Attempt the handshake up to `max_attempts` times, `handshake_retry` apart.
///
/// The controller's own retry is disarmed after every attempt so the caller
/// decides when to try again; nothing is left pending on return.
pub async fn wait_online<L, P, C>(
    ctrl: &Arc<Controller<L, P, C>>,
    max_attempts: u32,
) -> Result<u32>
where
    L: DeviceLink,
    P: Panel,
    C: Clock + 'static,
{
    let max_attempts = max_attempts.max(1);
    let mut last = String::new();
    for attempt in 1..=max_attempts {
        let outcome = ctrl.handshake().await;
        ctrl.cancel_retry();
        match outcome {
            HandshakeOutcome::Online => {
                info!(attempt, "device online");
                return Ok(attempt);
            }
            HandshakeOutcome::NotReady { body, .. } => last = body,
            HandshakeOutcome::Failed { error, .. } => last = error.to_string(),
        }
        if attempt < max_attempts {
            tokio::time::sleep(ctrl.timing().handshake_retry).await;
        }
    }
    Err(ControlError::NotReady(last).into())
}

/// Single heartbeat probe.
pub async fn probe<L, P, C>(ctrl: &Controller<L, P, C>) -> Result<()>
where
    L: DeviceLink,
    P: Panel,
    C: Clock + 'static,
{
    match ctrl.check_heartbeat().await {
        HeartbeatOutcome::Online => Ok(()),
        HeartbeatOutcome::NotReady => {
            Err(ControlError::NotReady("heartbeat without readiness marker".into()).into())
        }
        HeartbeatOutcome::Failed(e) => Err(ControlError::Link(e).into()),
    }
}

/// Press a state control once and turn the outcome into a result.
pub async fn send_once<L, P, C>(ctrl: &Controller<L, P, C>, state: PinState) -> Result<String>
where
    L: DeviceLink,
    P: Panel,
    C: Clock + 'static,
{
    match ctrl.press(state).await {
        CommandOutcome::Sent { body, .. } => Ok(body),
        CommandOutcome::Failed { state, error } => Err(ControlError::Command {
            state,
            source: error,
        }
        .into()),
        CommandOutcome::Ignored => Err(ControlError::ControlsDisabled.into()),
    }
}
