use pinlink_traits::{LinkError, PinState};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ControlError {
    #[error("link error: {0}")]
    Link(#[from] LinkError),
    #[error("state {state} command failed: {source}")]
    Command { state: PinState, source: LinkError },
    #[error("controls are disabled")]
    ControlsDisabled,
    #[error("device not ready: {0}")]
    NotReady(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
