//! Diagnostic log and event callbacks.
//!
//! The layout pipeline never prints. Hosts that want to see what it does
//! register a log callback (level-gated, so filtered messages are never
//! formatted) and an event callback for named signals such as
//! `invariant_violation`.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

/// Log level for diagnostic callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Warn => 2,
            Self::Error => 3,
        }
    }
}

/// Event emitted when the chain had to repair a broken invariant.
pub const INVARIANT_VIOLATION: &str = "invariant_violation";
/// Event emitted after each completed layout pass (debug chains only).
pub const LAYOUT_PASS: &str = "layout";

type EventCallback = Box<dyn Fn(&str, &str) + Send + Sync + 'static>;
type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

static MIN_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info.as_u8());

fn event_callback() -> &'static Mutex<Option<EventCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<EventCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

fn log_callback() -> &'static Mutex<Option<LogCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<LogCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

/// Set the global event callback.
pub fn set_event_callback<F>(callback: F)
where
    F: Fn(&str, &str) + Send + Sync + 'static,
{
    if let Ok(mut guard) = event_callback().lock() {
        *guard = Some(Box::new(callback));
    }
}

/// Remove the global event callback.
pub fn clear_event_callback() {
    if let Ok(mut guard) = event_callback().lock() {
        *guard = None;
    }
}

/// Emit an event to the registered callback.
pub fn emit_event(name: &str, data: &str) {
    if let Ok(guard) = event_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(name, data);
        }
    }
}

/// Set the global log callback.
pub fn set_log_callback<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    if let Ok(mut guard) = log_callback().lock() {
        *guard = Some(Box::new(callback));
    }
}

/// Remove the global log callback.
pub fn clear_log_callback() {
    if let Ok(mut guard) = log_callback().lock() {
        *guard = None;
    }
}

/// Set the lowest level that reaches the log callback. Defaults to `Info`.
pub fn set_log_level(level: LogLevel) {
    MIN_LEVEL.store(level.as_u8(), Ordering::Relaxed);
}

/// Check whether a message at `level` would be delivered.
#[must_use]
pub fn log_enabled(level: LogLevel) -> bool {
    level.as_u8() >= MIN_LEVEL.load(Ordering::Relaxed)
}

/// Emit a log message.
pub fn emit_log(level: LogLevel, message: &str) {
    if log_enabled(level) {
        deliver_log(level, message);
    }
}

/// Hand a message to the log callback regardless of the level gate. Used by
/// chains that opted into per-pass tracing.
pub(crate) fn deliver_log(level: LogLevel, message: &str) {
    if let Ok(guard) = log_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(level, message);
        }
    }
}

/// Emit a lazily formatted log message.
///
/// The closure only runs when the level passes the gate, so hot paths can
/// describe chain state without paying for it in normal operation.
pub fn emit_log_with<F>(level: LogLevel, message: F)
where
    F: FnOnce() -> String,
{
    if log_enabled(level) {
        emit_log(level, &message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_event_callback() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = Arc::clone(&called);
        set_event_callback(move |name, _data| {
            if name == "unit-test-event" {
                called_clone.store(true, Ordering::SeqCst);
            }
        });
        emit_event("unit-test-event", "{}");
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(log_enabled(LogLevel::Error));
    }

    #[test]
    fn test_lazy_message_skipped_below_gate() {
        let evaluated = AtomicBool::new(false);
        // Debug is below the default gate.
        if !log_enabled(LogLevel::Debug) {
            emit_log_with(LogLevel::Debug, || {
                evaluated.store(true, Ordering::SeqCst);
                String::new()
            });
            assert!(!evaluated.load(Ordering::SeqCst));
        }
    }
}
