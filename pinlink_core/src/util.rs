//! Small helpers shared by the loops.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Whether a response body marks the device as ready.
#[inline]
pub fn is_ready(body: &str, sentinel: &str) -> bool {
    body.trim().contains(sentinel)
}

/// Render a panel log line: `[HH:MM:SS] message`.
#[inline]
pub fn log_line(stamp: &str, message: &str) -> String {
    format!("[{stamp}] {message}")
}

/// Lock ignoring poisoning; the guarded data are plain flags.
#[inline]
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
