//! Device liveness and control: handshake loop, heartbeat loop, state command.
//!
//! All three activities share one `Controller` behind an `Arc`. Each one
//! suspends only on its network request; the session flags are guarded by a
//! short non-async mutex that is never held across an await.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};

use pinlink_traits::{Clock, DeviceLink, Endpoint, LinkError, Panel, PinState, Tone};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::TimingCfg;
use crate::session::SessionState;
use crate::status::{
    CONTACTING_LABEL, CommandOutcome, ConnectionStatus, HandshakeOutcome, HeartbeatOutcome,
    NO_BODY_LABEL, OFFLINE_LABEL, ONLINE_LABEL,
};
use crate::timer::RetryTimer;
use crate::util::{is_ready, lock, log_line};

/// Boxed, sendable future; breaks the handshake -> retry -> handshake type cycle.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

pub struct Controller<L, P, C> {
    pub(crate) link: L,
    pub(crate) panel: P,
    pub(crate) clock: C,
    pub(crate) timing: TimingCfg,
    pub(crate) sentinel: String,
    pub(crate) session: Mutex<SessionState>,
    pub(crate) retry: RetryTimer,
    pub(crate) heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl<L, P, C> core::fmt::Debug for Controller<L, P, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("timing", &self.timing)
            .field("sentinel", &self.sentinel)
            .field("session", &*lock(&self.session))
            .field("retry_pending", &self.retry.is_pending())
            .finish()
    }
}

impl<L, P, C> Controller<L, P, C>
where
    L: DeviceLink,
    P: Panel,
    C: Clock + 'static,
{
    /// Page-load equivalent: disable controls, start the handshake loop and the heartbeat.
    pub fn start(self: &Arc<Self>) {
        lock(&self.session).stopped = false;
        self.enable_controls(false);
        let weak = Arc::downgrade(self);
        self.retry
            .schedule(std::time::Duration::ZERO, Self::handshake_from(weak));
        self.start_heartbeat();
    }

    /// One handshake attempt. Cancels any pending retry first; on anything but
    /// a ready device, arms exactly one retry after the retry delay.
    pub fn handshake(self: &Arc<Self>) -> BoxFuture<HandshakeOutcome> {
        let this = Arc::clone(self);
        Box::pin(async move { this.handshake_once().await })
    }

    async fn handshake_once(self: &Arc<Self>) -> HandshakeOutcome {
        if self.retry.cancel() {
            debug!("pending handshake retry cancelled");
        }
        self.show_status(ConnectionStatus::Contacting, CONTACTING_LABEL, Tone::Muted);

        let reply = self
            .link
            .fetch(Endpoint::Handshake, Some(self.timing.handshake_timeout))
            .await;
        match reply {
            Ok(body) => {
                self.log(&format!("Handshake response: {body}"));
                let trimmed = body.trim();
                if is_ready(trimmed, &self.sentinel) {
                    self.show_status(ConnectionStatus::Online, ONLINE_LABEL, Tone::Ok);
                    self.enable_controls(true);
                    info!("handshake complete, device online");
                    HandshakeOutcome::Online
                } else {
                    let label = if trimmed.is_empty() {
                        NO_BODY_LABEL
                    } else {
                        trimmed
                    };
                    self.show_status(ConnectionStatus::Offline, label, Tone::Warn);
                    self.enable_controls(false);
                    let retry_at = self.schedule_handshake_retry();
                    HandshakeOutcome::NotReady {
                        body: trimmed.to_string(),
                        retry_at,
                    }
                }
            }
            Err(error) => {
                self.log(&format!("Handshake failed: {error}"));
                self.show_status(ConnectionStatus::Offline, OFFLINE_LABEL, Tone::Danger);
                self.enable_controls(false);
                let retry_at = self.schedule_handshake_retry();
                HandshakeOutcome::Failed { error, retry_at }
            }
        }
    }

    fn schedule_handshake_retry(self: &Arc<Self>) -> Option<Instant> {
        // Checked under the session lock so a concurrent `shutdown` either
        // sees the new retry in the slot or this call sees `stopped`.
        let session = lock(&self.session);
        if session.stopped {
            debug!("controller stopped, handshake retry not armed");
            return None;
        }
        let delay = self.timing.handshake_retry;
        debug!(delay_ms = delay.as_millis() as u64, "handshake retry armed");
        let at = self
            .retry
            .schedule(delay, Self::handshake_from(Arc::downgrade(self)));
        drop(session);
        Some(at)
    }

    fn handshake_from(weak: Weak<Self>) -> impl Future<Output = ()> + Send + 'static {
        async move {
            let Some(this) = weak.upgrade() else {
                return;
            };
            if lock(&this.session).stopped {
                return;
            }
            this.handshake().await;
        }
    }

    /// Abort the pending handshake retry, if any.
    pub fn cancel_retry(&self) -> bool {
        self.retry.cancel()
    }

    /// Deadline of the pending handshake retry.
    pub fn pending_retry(&self) -> Option<Instant> {
        self.retry.deadline()
    }

    /// Start the heartbeat loop. Only the first call spawns; later calls return false.
    ///
    /// The first check runs immediately. Checks never overlap: a slow check
    /// delays the next tick and missed ticks are skipped. So unlike a timer
    /// that fires a request every interval regardless, a hung request holds
    /// the loop for up to `heartbeat_timeout`, and recovery is noticed that
    /// much later.
    pub fn start_heartbeat(self: &Arc<Self>) -> bool {
        let mut slot = lock(&self.heartbeat);
        if slot.is_some() {
            return false;
        }
        let weak = Arc::downgrade(self);
        let period = self.timing.heartbeat_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(this) = weak.upgrade() else {
                    break;
                };
                this.check_heartbeat().await;
            }
            tracing::trace!("heartbeat loop exiting");
        }));
        info!(period_ms = period.as_millis() as u64, "heartbeat started");
        true
    }

    /// One heartbeat tick.
    pub async fn check_heartbeat(&self) -> HeartbeatOutcome {
        let timeout = self.timing.heartbeat_timeout;
        match self.link.fetch(Endpoint::Heartbeat, Some(timeout)).await {
            Ok(body) => {
                let online = is_ready(&body, &self.sentinel);
                self.show_banner(!online);
                lock(&self.session).timeout_logged = false;
                if online {
                    self.show_status(ConnectionStatus::Online, ONLINE_LABEL, Tone::Ok);
                    HeartbeatOutcome::Online
                } else {
                    self.show_status(ConnectionStatus::Offline, OFFLINE_LABEL, Tone::Danger);
                    HeartbeatOutcome::NotReady
                }
            }
            Err(error) => {
                self.show_banner(true);
                self.show_status(ConnectionStatus::Offline, OFFLINE_LABEL, Tone::Danger);
                if error.is_timeout() {
                    let first = {
                        let mut s = lock(&self.session);
                        !std::mem::replace(&mut s.timeout_logged, true)
                    };
                    if first {
                        self.log(&format!("Heartbeat timeout ({}ms)", timeout.as_millis()));
                    }
                } else {
                    debug!(%error, "heartbeat failed");
                }
                HeartbeatOutcome::Failed(error)
            }
        }
    }

    /// User trigger for a state control. A press while controls are disabled is dropped.
    pub async fn press(&self, state: PinState) -> CommandOutcome {
        if !self.claim_controls() {
            debug!(%state, "press ignored, controls disabled");
            return CommandOutcome::Ignored;
        }
        match self.send_state(state).await {
            Ok(body) => CommandOutcome::Sent { state, body },
            Err(error) => CommandOutcome::Failed { state, error },
        }
    }

    /// Send a state command. Controls are disabled for the duration and
    /// re-enabled afterwards whatever the outcome.
    pub async fn send_state(&self, state: PinState) -> Result<String, LinkError> {
        self.enable_controls(false);
        let reply = self
            .link
            .fetch(Endpoint::State(state), self.timing.state_timeout)
            .await;
        match &reply {
            Ok(body) => {
                let tone = match state {
                    PinState::High => Tone::Ok,
                    PinState::Low => Tone::Muted,
                };
                lock(&self.session).last_state = Some(state);
                self.panel.set_state(state.as_str(), tone);
                self.log(&format!("State {state} sent: {body}"));
            }
            Err(error) => {
                warn!(%state, %error, "state command failed");
                self.log(&format!("State {state} error: {error}"));
            }
        }
        self.enable_controls(true);
        reply
    }

    /// Stop both loops. A handshake already in flight finishes but arms no
    /// retry. The controller stays usable for explicit calls; `start` resumes.
    pub fn shutdown(&self) {
        {
            let mut session = lock(&self.session);
            session.stopped = true;
            self.retry.cancel();
        }
        if let Some(h) = lock(&self.heartbeat).take() {
            h.abort();
        }
    }

    pub fn snapshot(&self) -> SessionState {
        lock(&self.session).clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        lock(&self.session).status
    }

    pub fn controls_enabled(&self) -> bool {
        lock(&self.session).controls_enabled
    }

    pub fn timing(&self) -> &TimingCfg {
        &self.timing
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    // panel projection

    fn show_status(&self, status: ConnectionStatus, text: &str, tone: Tone) {
        let changed = {
            let mut s = lock(&self.session);
            std::mem::replace(&mut s.status, status) != status
        };
        if changed {
            debug!(?status, text, "connection status");
        }
        self.panel.set_status(text, tone);
    }

    fn enable_controls(&self, enabled: bool) {
        lock(&self.session).controls_enabled = enabled;
        self.panel.set_controls_enabled(enabled);
    }

    /// Atomically check-and-disable the controls for a press.
    fn claim_controls(&self) -> bool {
        {
            let mut s = lock(&self.session);
            if !s.controls_enabled {
                return false;
            }
            s.controls_enabled = false;
        }
        self.panel.set_controls_enabled(false);
        true
    }

    fn show_banner(&self, visible: bool) {
        lock(&self.session).banner_visible = visible;
        self.panel.set_banner_visible(visible);
    }

    fn log(&self, message: &str) {
        info!(target: "pinlink::panel", "{message}");
        self.panel.push_log(&log_line(&self.clock.stamp(), message));
    }
}

impl<L, P, C> Drop for Controller<L, P, C> {
    fn drop(&mut self) {
        if let Some(h) = lock(&self.heartbeat).take() {
            h.abort();
        }
    }
}
