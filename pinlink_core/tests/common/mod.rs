#![allow(dead_code)]

use std::sync::Arc;

use pinlink_core::mocks::ScriptedLink;
use pinlink_core::{Controller, ControllerBuilder};
use pinlink_traits::clock::test_clock::TestClock;
use pinlink_ui::RecordingPanel;

pub type TestController = Controller<ScriptedLink, RecordingPanel, TestClock>;

/// Controller wired to a scripted link, a recording panel and a clock frozen at 12:00:00.
pub fn rig() -> (Arc<TestController>, ScriptedLink, RecordingPanel) {
    let link = ScriptedLink::new();
    let panel = RecordingPanel::new();
    let ctrl = ControllerBuilder::new()
        .with_link(link.clone())
        .with_panel(panel.clone())
        .with_clock(TestClock::at(12, 0, 0))
        .build()
        .expect("default timing is valid");
    (ctrl, link, panel)
}

pub fn count_containing(lines: &[String], needle: &str) -> usize {
    lines.iter().filter(|l| l.contains(needle)).count()
}
