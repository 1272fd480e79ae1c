mod common;

use std::time::Duration;

use common::{count_containing, rig};
use pinlink_core::mocks::Reply;
use pinlink_core::{ConnectionStatus, HeartbeatOutcome};
use pinlink_traits::{Endpoint, LinkError, Tone};
use rstest::rstest;

#[tokio::test(start_paused = true)]
async fn success_hides_banner_and_marks_online() {
    let (ctrl, link, panel) = rig();
    link.push_heartbeat(Reply::body("DEVICE_ONLINE\n"));

    assert_eq!(ctrl.check_heartbeat().await, HeartbeatOutcome::Online);

    let p = panel.snapshot();
    assert!(!p.banner_visible);
    assert_eq!(p.status.text, "Device is Online");
    assert_eq!(p.status.tone, Tone::Ok);
    assert_eq!(ctrl.status(), ConnectionStatus::Online);
    assert_eq!(
        link.calls(),
        vec![(Endpoint::Heartbeat, Some(Duration::from_millis(3000)))]
    );
}

#[rstest]
#[case(Reply::timeout())]
#[case(Reply::fail(LinkError::Http(500)))]
#[case(Reply::fail(LinkError::Network("connection refused".into())))]
#[tokio::test(start_paused = true)]
async fn any_failure_shows_banner_and_marks_offline(#[case] reply: Reply) {
    let (ctrl, link, panel) = rig();
    link.push_heartbeat(reply);

    assert!(matches!(
        ctrl.check_heartbeat().await,
        HeartbeatOutcome::Failed(_)
    ));

    let p = panel.snapshot();
    assert!(p.banner_visible);
    assert_eq!(p.status.text, "Device Offline");
    assert_eq!(p.status.tone, Tone::Danger);
    assert_eq!(ctrl.status(), ConnectionStatus::Offline);
}

#[tokio::test(start_paused = true)]
async fn answer_without_sentinel_counts_as_offline() {
    let (ctrl, link, panel) = rig();
    link.push_heartbeat(Reply::body("rebooting"));

    assert_eq!(ctrl.check_heartbeat().await, HeartbeatOutcome::NotReady);
    assert!(panel.snapshot().banner_visible);
    assert_eq!(ctrl.status(), ConnectionStatus::Offline);
}

#[tokio::test(start_paused = true)]
async fn timeout_log_fires_once_per_unhealthy_stretch() {
    let (ctrl, link, panel) = rig();
    link.push_heartbeat(Reply::body("DEVICE_ONLINE"))
        .push_heartbeat(Reply::timeout())
        .push_heartbeat(Reply::timeout())
        .push_heartbeat(Reply::body("DEVICE_ONLINE"));

    let mut banner = Vec::new();
    for _ in 0..4 {
        ctrl.check_heartbeat().await;
        banner.push(panel.snapshot().banner_visible);
    }

    assert_eq!(banner, vec![false, true, true, false]);
    let log = panel.log();
    assert_eq!(log, vec!["[12:00:00] Heartbeat timeout (3000ms)"]);
    assert!(!ctrl.snapshot().timeout_logged);
}

#[tokio::test(start_paused = true)]
async fn timeout_log_rearms_after_success() {
    let (ctrl, link, panel) = rig();
    link.push_heartbeat(Reply::timeout())
        .push_heartbeat(Reply::timeout())
        .push_heartbeat(Reply::body("DEVICE_ONLINE"))
        .push_heartbeat(Reply::timeout())
        .push_heartbeat(Reply::timeout());

    for _ in 0..5 {
        ctrl.check_heartbeat().await;
    }

    assert_eq!(count_containing(&panel.log(), "Heartbeat timeout"), 2);
    assert!(ctrl.snapshot().timeout_logged);
}

#[tokio::test(start_paused = true)]
async fn non_timeout_failures_are_not_logged_to_panel() {
    let (ctrl, link, panel) = rig();
    link.push_heartbeat(Reply::fail(LinkError::Http(503)))
        .push_heartbeat(Reply::fail(LinkError::Network("reset".into())));

    ctrl.check_heartbeat().await;
    ctrl.check_heartbeat().await;

    assert!(panel.log().is_empty());
    assert!(!ctrl.snapshot().timeout_logged);
}

#[tokio::test(start_paused = true)]
async fn loop_ticks_at_fixed_interval_and_starts_once() {
    let (ctrl, link, _panel) = rig();
    for _ in 0..10 {
        link.push_heartbeat(Reply::body("DEVICE_ONLINE"));
    }

    assert!(ctrl.start_heartbeat());
    assert!(!ctrl.start_heartbeat());

    tokio::time::sleep(Duration::from_millis(1250)).await;
    assert_eq!(link.count(Endpoint::Heartbeat), 3);
    assert_eq!(link.count(Endpoint::Handshake), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_heartbeat_does_not_overlap() {
    let (ctrl, link, panel) = rig();
    link.push_heartbeat(Reply::body("DEVICE_ONLINE").after(Duration::from_millis(1200)));
    for _ in 0..10 {
        link.push_heartbeat(Reply::body("DEVICE_ONLINE"));
    }

    ctrl.start_heartbeat();

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(link.count(Endpoint::Heartbeat), 1);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(link.count(Endpoint::Heartbeat) >= 2);
    assert!(!panel.snapshot().banner_visible);
}
