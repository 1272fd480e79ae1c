#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Device backends: real HTTP and an in-process simulated device.
pub mod error;
pub mod http;
pub mod sim;
pub mod util;

pub use http::HttpLink;
pub use sim::{SIM_SENTINEL, SimulatedLink};
