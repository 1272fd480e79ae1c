//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pinlink_traits::PinState;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config path used when `--config` is not given. A missing file here is not an error.
pub const DEFAULT_CONFIG: &str = "etc/pinlink.toml";

#[derive(Parser, Debug)]
#[command(name = "pinlink", version, about = "Liveness monitor and pin control for a networked device")]
pub struct Cli {
    /// Path to config TOML [default: etc/pinlink.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override device.base_url from the config
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Talk to an in-process simulated device instead of the network
    #[arg(long, action = ArgAction::SetTrue)]
    pub sim: bool,

    /// Log as JSON lines and print results/errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace) [default: info]
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StateArg {
    High,
    Low,
}

impl From<StateArg> for PinState {
    fn from(s: StateArg) -> Self {
        match s {
            StateArg::High => Self::High,
            StateArg::Low => Self::Low,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Monitor the device and accept `high`, `low`, `status`, `quit` on stdin
    Watch,
    /// Handshake until the device reports ready
    Handshake {
        /// Give up after this many attempts
        #[arg(long, default_value_t = 1, value_name = "N")]
        attempts: u32,
    },
    /// Handshake once, then drive the output pin
    Send {
        /// Level to request
        #[arg(long, value_enum)]
        state: StateArg,
    },
    /// Single heartbeat probe for operational monitoring
    Health,
}
