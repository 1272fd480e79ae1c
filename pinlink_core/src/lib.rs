#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Device liveness and control (transport-agnostic).
//!
//! All device traffic goes through `pinlink_traits::DeviceLink` and all
//! display through `pinlink_traits::Panel`.
//!
//! ## Architecture
//!
//! - **Handshake**: readiness probe retried at a constant delay until the device is ready
//! - **Heartbeat**: fixed-cadence liveness probe for the whole session
//! - **State command**: HIGH/LOW request gated by control enablement
//! - **Retry timer**: single-slot timer; rescheduling aborts the pending task
//! - **Session**: explicit state owned by the `Controller` (`session` module)

pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod runner;
pub mod session;
pub mod status;
pub mod timer;
pub mod util;

pub use builder::{ControllerBuilder, Missing};
pub use config::TimingCfg;
pub use controller::{BoxFuture, Controller};
pub use error::{BuildError, ControlError};
pub use session::SessionState;
pub use status::{CommandOutcome, ConnectionStatus, HandshakeOutcome, HeartbeatOutcome};
pub use timer::RetryTimer;
