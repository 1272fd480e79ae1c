#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! `pinlink` command line: watch a device, handshake, drive its pin, probe health.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use pinlink_http::{HttpLink, SimulatedLink};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;
mod error_fmt;

use crate::cli::{Cli, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(&cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::debug!(error = ?e, "exiting with error");
        std::process::exit(exit_code_for_error(&e));
    }
}

/// `--config` must exist when given; the default path is optional.
fn load_config(path: Option<&Path>) -> eyre::Result<pinlink_config::Config> {
    match path {
        Some(p) => pinlink_config::load_file(p),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG);
            if p.exists() {
                pinlink_config::load_file(&p)
            } else {
                Ok(pinlink_config::Config::default())
            }
        }
    }
}

fn init_tracing(cli: &Cli, logging: &pinlink_config::Logging) -> eyre::Result<()> {
    // RUST_LOG wins, then --log-level, then [logging].level.
    let level = cli
        .log_level
        .as_deref()
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level '{level}'"))?;

    let json_console = cli
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_console = (!cli.json).then(|| {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
            let rotation = match logging.rotation.as_deref() {
                Some("daily") => Rotation::DAILY,
                Some("hourly") => Rotation::HOURLY,
                _ => Rotation::NEVER,
            };
            let appender = RollingFileAppender::builder()
                .rotation(rotation)
                .filename_prefix(name.to_string_lossy())
                .build(dir)
                .wrap_err_with(|| format!("open log file {file}"))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_console)
        .with(text_console)
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(())
}

fn run(cli: &Cli) -> eyre::Result<()> {
    let mut cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli, &cfg.logging)?;

    if let Some(url) = &cli.base_url {
        cfg.device.base_url.clone_from(url);
        cfg.validate()?;
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("start async runtime")?;

    let res = rt.block_on(async {
        if cli.sim {
            tracing::info!(boot_attempts = cfg.sim.boot_attempts, "using simulated device");
            let link = SimulatedLink::from_env(cfg.sim.boot_attempts);
            commands::dispatch(&cli.cmd, &cfg, link, cli.json).await
        } else {
            let link = HttpLink::new(&cfg.device.base_url)?;
            tracing::info!(base_url = link.base_url(), "using http device link");
            commands::dispatch(&cli.cmd, &cfg, link, cli.json).await
        }
    });
    // In-flight requests are abandoned rather than awaited.
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    res
}
