//! Type-state builder for `Controller`.
//!
//! `build()` only exists once a link and a panel were provided; timing and
//! sentinel fall back to the firmware defaults.

use std::sync::{Arc, Mutex};

use pinlink_traits::{Clock, DeviceLink, LocalClock, Panel};

use crate::config::TimingCfg;
use crate::controller::Controller;
use crate::error::BuildError;
use crate::session::SessionState;
use crate::timer::RetryTimer;

/// Marker for a builder slot that has not been filled yet.
#[derive(Debug, Default)]
pub struct Missing;

#[derive(Debug)]
pub struct ControllerBuilder<L, P, C> {
    link: L,
    panel: P,
    clock: C,
    timing: TimingCfg,
    sentinel: String,
}

impl Default for ControllerBuilder<Missing, Missing, LocalClock> {
    fn default() -> Self {
        Self {
            link: Missing,
            panel: Missing,
            clock: LocalClock,
            timing: TimingCfg::default(),
            sentinel: pinlink_config::DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl ControllerBuilder<Missing, Missing, LocalClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L, P, C> ControllerBuilder<L, P, C> {
    pub fn with_link<L2: DeviceLink>(self, link: L2) -> ControllerBuilder<L2, P, C> {
        ControllerBuilder {
            link,
            panel: self.panel,
            clock: self.clock,
            timing: self.timing,
            sentinel: self.sentinel,
        }
    }

    pub fn with_panel<P2: Panel>(self, panel: P2) -> ControllerBuilder<L, P2, C> {
        ControllerBuilder {
            link: self.link,
            panel,
            clock: self.clock,
            timing: self.timing,
            sentinel: self.sentinel,
        }
    }

    pub fn with_clock<C2: Clock + 'static>(self, clock: C2) -> ControllerBuilder<L, P, C2> {
        ControllerBuilder {
            link: self.link,
            panel: self.panel,
            clock,
            timing: self.timing,
            sentinel: self.sentinel,
        }
    }

    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }
}

impl<L, P, C> ControllerBuilder<L, P, C>
where
    L: DeviceLink,
    P: Panel,
    C: Clock + 'static,
{
    /// Validate and build. Nothing is spawned until `Controller::start`.
    pub fn build(self) -> Result<Arc<Controller<L, P, C>>, BuildError> {
        self.timing.check().map_err(BuildError::InvalidConfig)?;
        if self.sentinel.trim().is_empty() {
            return Err(BuildError::InvalidConfig("sentinel must not be empty"));
        }
        Ok(Arc::new(Controller {
            link: self.link,
            panel: self.panel,
            clock: self.clock,
            timing: self.timing,
            sentinel: self.sentinel,
            session: Mutex::new(SessionState::default()),
            retry: RetryTimer::new(),
            heartbeat: Mutex::new(None),
        }))
    }
}
