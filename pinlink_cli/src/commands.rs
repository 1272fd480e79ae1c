//! Subcommand bodies: controller assembly and the watch loop.

use std::sync::Arc;

use eyre::WrapErr;
use pinlink_core::runner::{probe, send_once, wait_online};
use pinlink_core::{CommandOutcome, Controller, ControllerBuilder, TimingCfg};
use pinlink_traits::{Clock, DeviceLink, Panel, PinState};
use pinlink_ui::{ConsolePanel, RecordingPanel, render};
use serde_json::json;
use tokio::sync::{Notify, mpsc};

use crate::cli::Commands;

pub fn build<L: DeviceLink, P: Panel>(
    cfg: &pinlink_config::Config,
    link: L,
    panel: P,
) -> eyre::Result<Arc<Controller<L, P, pinlink_traits::LocalClock>>> {
    let timing: TimingCfg = (&cfg.timing).into();
    let ctrl = ControllerBuilder::new()
        .with_link(link)
        .with_panel(panel)
        .with_timing(timing)
        .with_sentinel(cfg.device.sentinel.trim())
        .build()?;
    Ok(ctrl)
}

pub async fn dispatch<L: DeviceLink>(
    cmd: &Commands,
    cfg: &pinlink_config::Config,
    link: L,
    json: bool,
) -> eyre::Result<()> {
    match cmd {
        Commands::Watch => watch(build(cfg, link, ConsolePanel::stdout())?).await,
        Commands::Handshake { attempts } => {
            let ctrl = build(cfg, link, RecordingPanel::new())?;
            let n = wait_online(&ctrl, *attempts).await?;
            if json {
                println!("{}", json!({ "status": "online", "attempts": n }));
            } else {
                println!("Device is online after {n} attempt(s).");
            }
            Ok(())
        }
        Commands::Send { state } => {
            let state = PinState::from(*state);
            let ctrl = build(cfg, link, RecordingPanel::new())?;
            wait_online(&ctrl, 1).await?;
            let body = send_once(&ctrl, state).await?;
            if json {
                println!("{}", json!({ "state": state.as_str(), "response": body.trim() }));
            } else {
                println!("{state} sent: {}", body.trim());
                print!("{}", render(&ctrl.panel().snapshot()));
            }
            Ok(())
        }
        Commands::Health => {
            let ctrl = build(cfg, link, RecordingPanel::new())?;
            let res = probe(&ctrl).await;
            let word = if res.is_ok() { "ok" } else { "offline" };
            if json {
                println!("{}", json!({ "health": word }));
            } else {
                println!("{word}");
            }
            res
        }
    }
}

/// Forward stdin lines from a plain thread. A blocked read there cannot
/// hold up runtime shutdown; the thread dies with the process.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run the liveness loops and read operator commands from stdin until
/// `quit`, end of input, or Ctrl-C.
async fn watch<L, C>(ctrl: Arc<Controller<L, ConsolePanel, C>>) -> eyre::Result<()>
where
    L: DeviceLink,
    C: Clock + 'static,
{
    let interrupted = Arc::new(Notify::new());
    {
        let n = Arc::clone(&interrupted);
        ctrlc::set_handler(move || n.notify_one()).wrap_err("install Ctrl-C handler")?;
    }

    ctrl.start();
    println!("commands: high | low | status | quit");

    let mut lines = stdin_lines();
    loop {
        let line = tokio::select! {
            () = interrupted.notified() => {
                tracing::info!("interrupted");
                break;
            }
            line = lines.recv() => line,
        };
        let Some(line) = line else { break };
        match line.trim().to_ascii_lowercase().as_str() {
            "" => {}
            "quit" | "exit" => break,
            "status" => print!("{}", render(&ctrl.panel().recording().snapshot())),
            cmd => match cmd.parse::<PinState>() {
                Ok(state) => {
                    // Presses run beside the reader so a second press while one is in
                    // flight sees disabled controls.
                    let c = Arc::clone(&ctrl);
                    tokio::spawn(async move {
                        if c.press(state).await == CommandOutcome::Ignored {
                            println!("controls disabled; {state} ignored");
                        }
                    });
                }
                Err(_) => eprintln!("unknown command '{cmd}' (high | low | status | quit)"),
            },
        }
    }

    ctrl.shutdown();
    print!("{}", render(&ctrl.panel().recording().snapshot()));
    Ok(())
}
