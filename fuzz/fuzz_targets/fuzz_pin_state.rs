#![no_main]
use libfuzzer_sys::fuzz_target;
use pinlink_traits::{Endpoint, PinState};

fuzz_target!(|data: &str| {
    // Anything that parses must map onto one of the two fixed state paths.
    if let Ok(state) = data.parse::<PinState>() {
        let path = Endpoint::State(state).path();
        assert!(path == "/heartbeat/state?=HIGH" || path == "/heartbeat/state?=LOW");
        assert_eq!(state.as_str().parse::<PinState>().ok(), Some(state));
    }
});
