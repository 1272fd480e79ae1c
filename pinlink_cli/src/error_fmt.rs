//! Human-readable error descriptions and structured JSON error formatting.

use pinlink_core::error::{BuildError, ControlError};
use pinlink_http::error::SetupError;
use pinlink_traits::LinkError;

/// Exit code when the device is offline or never reported ready.
pub const EXIT_OFFLINE: i32 = 3;
/// Exit code when a state command reached the link but failed.
pub const EXIT_COMMAND: i32 = 4;

fn link_text(e: &LinkError) -> String {
    match e {
        LinkError::Timeout(d) => format!(
            "What happened: The device did not answer within {}ms.\nLikely causes: Device powered off, out of Wi-Fi range, or busy rebooting.\nHow to fix: Check the device is powered and on the network; raise the [timing] timeouts if the link is slow.",
            d.as_millis()
        ),
        LinkError::Http(code) => format!(
            "What happened: The device answered with HTTP {code}.\nLikely causes: Firmware without the expected endpoints, or another host at that address.\nHow to fix: Verify device.base_url points at the device and the firmware is up to date."
        ),
        LinkError::Network(msg) => format!(
            "What happened: Could not reach the device ({msg}).\nLikely causes: Wrong base URL, mDNS name not resolving, or the device is offline.\nHow to fix: Check device.base_url (or --base-url) and that this machine is on the same network."
        ),
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/pinlink.toml for a sample."
        );
    }

    if let Some(ce) = err.downcast_ref::<ControlError>() {
        return match ce {
            ControlError::NotReady(reason) => format!(
                "What happened: The device did not report ready ({reason}).\nLikely causes: Firmware still booting, or a sentinel that does not match the firmware.\nHow to fix: Retry with more --attempts, or check device.sentinel in the config."
            ),
            ControlError::Link(e) => link_text(e),
            ControlError::Command { state, source } => format!(
                "What happened: Setting the pin {state} failed ({source}).\nLikely causes: Device went offline mid-command or rejected the request.\nHow to fix: Run `pinlink health`, then retry the command."
            ),
            ControlError::ControlsDisabled => "What happened: Controls are disabled.\nLikely causes: The device is not online yet or another command is in flight.\nHow to fix: Wait for the status to read online, then retry.".to_string(),
        };
    }

    if let Some(se) = err.downcast_ref::<SetupError>() {
        return format!(
            "What happened: The HTTP link could not be set up ({se}).\nLikely causes: Malformed base URL.\nHow to fix: Use a URL like http://esp32.local in device.base_url or --base-url."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config file") {
        return format!(
            "What happened: Config file could not be read.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Check the path and rerun. Original: {msg}"
        );
    }

    if lower.contains("parse config") {
        return format!(
            "What happened: Config file is not valid TOML for this tool.\nLikely causes: Typo in a key, wrong value type, or a stray section.\nHow to fix: Compare against etc/pinlink.toml. Original: {msg}"
        );
    }

    if ["device.", "timing.", "logging.", "sim."]
        .iter()
        .any(|k| lower.starts_with(k))
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Zero timeouts, empty sentinel, or a base URL without http://.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable name for the error kind, used as `reason` in JSON output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    match err.downcast_ref::<ControlError>() {
        Some(ControlError::NotReady(_)) => "NotReady",
        Some(ControlError::Link(LinkError::Timeout(_))) => "Timeout",
        Some(ControlError::Link(LinkError::Http(_))) => "Http",
        Some(ControlError::Link(LinkError::Network(_))) => "Network",
        Some(ControlError::Command { .. }) => "CommandFailed",
        Some(ControlError::ControlsDisabled) => "ControlsDisabled",
        None => "Error",
    }
}

/// Offline/not-ready map to 3, failed state commands to 4, everything else to 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<ControlError>() {
        Some(
            ControlError::NotReady(_) | ControlError::Link(_) | ControlError::ControlsDisabled,
        ) => EXIT_OFFLINE,
        Some(ControlError::Command { .. }) => EXIT_COMMAND,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    let obj = match err.downcast_ref::<ControlError>() {
        Some(ControlError::Command { state, source }) => json!({
            "reason": reason_name(err),
            "details": { "state": state.as_str(), "error": source.to_string() },
            "message": msg,
        }),
        Some(ControlError::Link(LinkError::Timeout(d))) => json!({
            "reason": reason_name(err),
            "details": { "timeout_ms": u64::try_from(d.as_millis()).unwrap_or(u64::MAX) },
            "message": msg,
        }),
        _ => json!({ "reason": reason_name(err), "message": msg }),
    };
    obj.to_string()
}
