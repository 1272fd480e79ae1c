#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Panel projections: an in-memory panel model and a console echo of it.
use pinlink_traits::{Panel, Tone};
use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A label with its tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub tone: Tone,
}

impl Label {
    fn muted(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tone: Tone::Muted,
        }
    }
}

/// Everything the panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub status: Label,
    pub state: Label,
    pub controls_enabled: bool,
    pub banner_visible: bool,
    /// Newest first.
    pub log: Vec<String>,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            status: Label::muted("Unknown"),
            state: Label::muted("-"),
            controls_enabled: false,
            banner_visible: false,
            log: Vec::new(),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Panel that records into a shared `PanelState`. Clones share the state.
#[derive(Debug, Clone, Default)]
pub struct RecordingPanel {
    state: Arc<Mutex<PanelState>>,
}

impl RecordingPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PanelState {
        lock(&self.state).clone()
    }

    /// Log lines, newest first.
    pub fn log(&self) -> Vec<String> {
        lock(&self.state).log.clone()
    }

    /// Set the status label, reporting whether it changed.
    fn update_status(&self, text: &str, tone: Tone) -> bool {
        let mut s = lock(&self.state);
        if s.status.text == text && s.status.tone == tone {
            return false;
        }
        s.status.text = text.to_string();
        s.status.tone = tone;
        true
    }

    fn update_banner(&self, visible: bool) -> bool {
        std::mem::replace(&mut lock(&self.state).banner_visible, visible) != visible
    }
}

impl Panel for RecordingPanel {
    fn set_status(&self, text: &str, tone: Tone) {
        let mut s = lock(&self.state);
        s.status.text = text.to_string();
        s.status.tone = tone;
    }

    fn set_state(&self, text: &str, tone: Tone) {
        let mut s = lock(&self.state);
        s.state.text = text.to_string();
        s.state.tone = tone;
    }

    fn set_controls_enabled(&self, enabled: bool) {
        lock(&self.state).controls_enabled = enabled;
    }

    fn set_banner_visible(&self, visible: bool) {
        lock(&self.state).banner_visible = visible;
    }

    fn push_log(&self, line: &str) {
        lock(&self.state).log.insert(0, line.to_string());
    }
}

/// Records like `RecordingPanel` and echoes every visible change to a writer.
///
/// Repeated identical status updates (the heartbeat re-asserts the status
/// on every tick) are not echoed.
pub struct ConsolePanel {
    inner: RecordingPanel,
    out: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsolePanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsolePanel")
            .field("state", &self.inner.snapshot())
            .finish_non_exhaustive()
    }
}

impl ConsolePanel {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            inner: RecordingPanel::new(),
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Handle to the recorded state.
    pub fn recording(&self) -> &RecordingPanel {
        &self.inner
    }

    fn echo(&self, line: &str) {
        let mut out = lock(&self.out);
        // A closed stdout only loses the echo; the recorded state is intact.
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

impl Panel for ConsolePanel {
    fn set_status(&self, text: &str, tone: Tone) {
        if self.inner.update_status(text, tone) {
            self.echo(&format!("status: {text} [{tone}]"));
        }
    }

    fn set_state(&self, text: &str, tone: Tone) {
        self.inner.set_state(text, tone);
        self.echo(&format!("state: {text} [{tone}]"));
    }

    fn set_controls_enabled(&self, enabled: bool) {
        self.inner.set_controls_enabled(enabled);
    }

    fn set_banner_visible(&self, visible: bool) {
        if self.inner.update_banner(visible) {
            self.echo(if visible {
                "banner: connection lost"
            } else {
                "banner: hidden"
            });
        }
    }

    fn push_log(&self, line: &str) {
        self.inner.push_log(line);
        self.echo(line);
    }
}

/// Multi-line text dump of a panel.
pub fn render(p: &PanelState) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Status:   {} [{}]", p.status.text, p.status.tone);
    let _ = writeln!(s, "State:    {} [{}]", p.state.text, p.state.tone);
    let _ = writeln!(
        s,
        "Controls: {}",
        if p.controls_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    if p.banner_visible {
        let _ = writeln!(s, "!! Connection to device lost");
    }
    if !p.log.is_empty() {
        let _ = writeln!(s, "Log:");
        for line in &p.log {
            let _ = writeln!(s, "  {line}");
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            lock(&self.0).extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8_lossy(&lock(&self.0)).into_owned()
        }
    }

    #[test]
    fn console_suppresses_repeated_status() {
        let sink = Sink::default();
        let panel = ConsolePanel::new(Box::new(sink.clone()));

        panel.set_status("Device is Online", Tone::Ok);
        panel.set_status("Device is Online", Tone::Ok);
        panel.set_status("Device Offline", Tone::Danger);

        let out = sink.text();
        assert_eq!(out.matches("status: Device is Online [ok]").count(), 1);
        assert!(out.contains("status: Device Offline [danger]"));
    }

    #[test]
    fn console_echoes_banner_flips_only() {
        let sink = Sink::default();
        let panel = ConsolePanel::new(Box::new(sink.clone()));

        panel.set_banner_visible(false);
        panel.set_banner_visible(true);
        panel.set_banner_visible(true);
        panel.set_banner_visible(false);

        let out = sink.text();
        assert_eq!(out.matches("banner: connection lost").count(), 1);
        assert_eq!(out.matches("banner: hidden").count(), 1);
    }

    #[test]
    fn status_updates_report_changes_and_keep_log() {
        let panel = RecordingPanel::new();
        panel.push_log("[12:00:00] a");

        assert!(panel.update_status("Contacting...", Tone::Muted));
        assert!(!panel.update_status("Contacting...", Tone::Muted));
        assert!(panel.update_status("Contacting...", Tone::Warn));
        assert!(panel.update_banner(true));
        assert!(!panel.update_banner(true));

        let p = panel.snapshot();
        assert_eq!(p.status.tone, Tone::Warn);
        assert!(p.banner_visible);
        assert_eq!(p.log, vec!["[12:00:00] a"]);
    }

    #[test]
    fn render_shows_banner_and_log() {
        let mut p = PanelState::default();
        p.banner_visible = true;
        p.log = vec!["[12:00:01] b".into(), "[12:00:00] a".into()];

        let text = render(&p);
        assert!(text.contains("Status:   Unknown [muted]"));
        assert!(text.contains("Connection to device lost"));
        let b = text.find("] b").unwrap();
        let a = text.find("] a").unwrap();
        assert!(b < a, "newest line first");
    }
}
