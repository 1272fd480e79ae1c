mod common;

use std::time::Duration;

use common::{count_containing, rig};
use pinlink_core::mocks::Reply;
use pinlink_core::{ConnectionStatus, HandshakeOutcome};
use pinlink_traits::{Endpoint, LinkError, Tone};
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn ready_body_goes_online_without_retry() {
    let (ctrl, link, panel) = rig();
    link.push_handshake(Reply::body("DEVICE_ONLINE ready"));

    let outcome = ctrl.handshake().await;

    assert_eq!(outcome, HandshakeOutcome::Online);
    let p = panel.snapshot();
    assert_eq!(p.status.text, "Device is Online");
    assert_eq!(p.status.tone, Tone::Ok);
    assert!(p.controls_enabled);
    assert_eq!(ctrl.status(), ConnectionStatus::Online);
    assert_eq!(ctrl.pending_retry(), None);
    assert_eq!(p.log, vec!["[12:00:00] Handshake response: DEVICE_ONLINE ready"]);
}

#[tokio::test(start_paused = true)]
async fn timeout_goes_offline_and_retries_after_delay() {
    let (ctrl, link, panel) = rig();
    link.push_handshake(Reply::timeout());

    let t0 = Instant::now();
    let outcome = ctrl.handshake().await;

    let expected_at = t0 + Duration::from_millis(1500);
    assert_eq!(
        outcome,
        HandshakeOutcome::Failed {
            error: LinkError::Timeout(Duration::from_millis(5000)),
            retry_at: Some(expected_at),
        }
    );
    let p = panel.snapshot();
    assert_eq!(p.status.text, "Device Offline");
    assert_eq!(p.status.tone, Tone::Danger);
    assert!(!p.controls_enabled);
    assert_eq!(ctrl.status(), ConnectionStatus::Offline);
    assert_eq!(ctrl.pending_retry(), Some(expected_at));
    assert_eq!(
        link.calls(),
        vec![(Endpoint::Handshake, Some(Duration::from_millis(5000)))]
    );
    assert_eq!(
        p.log,
        vec!["[12:00:00] Handshake failed: request timed out after 5000ms"]
    );
}

#[tokio::test(start_paused = true)]
async fn body_without_sentinel_shows_trimmed_body_as_warning() {
    let (ctrl, link, panel) = rig();
    link.push_handshake(Reply::body("  booting (1/2)\n"));

    let outcome = ctrl.handshake().await;

    assert!(matches!(
        outcome,
        HandshakeOutcome::NotReady { ref body, .. } if body == "booting (1/2)"
    ));
    let p = panel.snapshot();
    assert_eq!(p.status.text, "booting (1/2)");
    assert_eq!(p.status.tone, Tone::Warn);
    assert!(!p.controls_enabled);
    assert!(ctrl.pending_retry().is_some());
}

#[tokio::test(start_paused = true)]
async fn empty_body_uses_fallback_label() {
    let (ctrl, link, panel) = rig();
    link.push_handshake(Reply::body("   "));

    ctrl.handshake().await;

    assert_eq!(panel.snapshot().status.text, "No response body");
    assert_eq!(panel.snapshot().status.tone, Tone::Warn);
}

#[tokio::test(start_paused = true)]
async fn retries_at_constant_delay_until_online() {
    let (ctrl, link, panel) = rig();
    link.push_handshake(Reply::fail(LinkError::Network("unreachable".into())))
        .push_handshake(Reply::body("booting"))
        .push_handshake(Reply::body("DEVICE_ONLINE"));

    ctrl.handshake().await;
    assert_eq!(link.count(Endpoint::Handshake), 1);

    tokio::time::sleep(Duration::from_millis(1400)).await;
    assert_eq!(link.count(Endpoint::Handshake), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(link.count(Endpoint::Handshake), 2);
    assert_eq!(panel.snapshot().status.text, "booting");

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(link.count(Endpoint::Handshake), 3);
    assert_eq!(ctrl.status(), ConnectionStatus::Online);
    assert!(panel.snapshot().controls_enabled);
    assert_eq!(ctrl.pending_retry(), None);

    // Loop stops once online.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(link.count(Endpoint::Handshake), 3);
}

#[tokio::test(start_paused = true)]
async fn reentrant_call_replaces_pending_retry() {
    let (ctrl, link, _panel) = rig();
    for _ in 0..4 {
        link.push_handshake(Reply::timeout());
    }

    let t0 = Instant::now();
    ctrl.handshake().await;
    ctrl.handshake().await;
    assert_eq!(ctrl.pending_retry(), Some(t0 + Duration::from_millis(1500)));

    tokio::time::sleep(Duration::from_millis(1600)).await;

    // Two explicit calls plus exactly one retry.
    assert_eq!(link.count(Endpoint::Handshake), 3);
    assert_eq!(ctrl.pending_retry(), Some(t0 + Duration::from_millis(3000)));
}

#[tokio::test(start_paused = true)]
async fn every_attempt_logs_and_marks_contacting_first() {
    let (ctrl, link, panel) = rig();
    link.push_handshake(Reply::body("DEVICE_ONLINE").after(Duration::from_millis(300)));

    let pending = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.handshake().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(panel.snapshot().status.text, "Contacting...");
    assert_eq!(ctrl.status(), ConnectionStatus::Contacting);

    assert!(pending.await.unwrap().is_online());
    assert_eq!(count_containing(&panel.log(), "Handshake response"), 1);
}

#[tokio::test(start_paused = true)]
async fn start_runs_handshake_and_heartbeat_once() {
    let (ctrl, link, panel) = rig();

    ctrl.start();
    assert!(!panel.snapshot().controls_enabled);
    assert!(!ctrl.start_heartbeat(), "heartbeat already running");

    tokio::time::sleep(Duration::from_millis(1250)).await;

    // Scripts are empty, so every request fails: one handshake so far,
    // heartbeats at 0, 500 and 1000 ms.
    assert_eq!(link.count(Endpoint::Handshake), 1);
    assert_eq!(link.count(Endpoint::Heartbeat), 3);
    assert!(ctrl.pending_retry().is_some());

    ctrl.shutdown();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(link.count(Endpoint::Handshake), 1);
    assert_eq!(link.count(Endpoint::Heartbeat), 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_inflight_retry_ends_the_loop() {
    let (ctrl, link, _panel) = rig();
    link.push_handshake(Reply::timeout())
        .push_handshake(Reply::timeout().after(Duration::from_millis(1000)));
    for _ in 0..10 {
        link.push_handshake(Reply::timeout());
    }

    ctrl.handshake().await;
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(link.count(Endpoint::Handshake), 2, "retry is in flight");
    assert_eq!(ctrl.pending_retry(), None);

    ctrl.shutdown();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(link.count(Endpoint::Handshake), 2);
    assert_eq!(ctrl.pending_retry(), None);
    assert!(ctrl.snapshot().stopped);
}

#[tokio::test(start_paused = true)]
async fn explicit_handshake_after_shutdown_arms_no_retry() {
    let (ctrl, link, panel) = rig();
    link.push_handshake(Reply::body("booting"));

    ctrl.shutdown();
    let outcome = ctrl.handshake().await;

    assert_eq!(outcome.retry_at(), None);
    assert_eq!(ctrl.pending_retry(), None);
    assert_eq!(panel.snapshot().status.text, "booting");
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(link.count(Endpoint::Handshake), 1);
}

#[tokio::test(start_paused = true)]
async fn explicit_call_overlapping_inflight_retry_leaves_one_chain() {
    let (ctrl, link, _panel) = rig();
    // Call 1 fails at t=0; its retry (call 2) starts at 1500 and answers at 2500.
    // Call 3 is explicit at 1600, while call 2 is still waiting.
    link.push_handshake(Reply::timeout())
        .push_handshake(Reply::body("booting").after(Duration::from_millis(1000)));
    for _ in 0..20 {
        link.push_handshake(Reply::timeout());
    }

    let t0 = Instant::now();
    ctrl.handshake().await;
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(link.count(Endpoint::Handshake), 2);

    ctrl.handshake().await;
    assert_eq!(ctrl.pending_retry(), Some(t0 + Duration::from_millis(3100)));

    // Call 2 completes at 2500 and replaces the pending retry.
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(ctrl.pending_retry(), Some(t0 + Duration::from_millis(4000)));
    assert_eq!(link.count(Endpoint::Handshake), 3);

    // One chain from here on: attempts at 4000, 5500 and 7000.
    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert_eq!(link.count(Endpoint::Handshake), 6);
    assert_eq!(ctrl.pending_retry(), Some(t0 + Duration::from_millis(8500)));
}
