//! Diagnostic log callback system.
//!
//! Every diagnostic is emitted as a `tracing` event under the
//! `opentui_mouse` target. Hosts that do not run a subscriber can install a
//! plain callback instead.

use std::sync::{Mutex, OnceLock, PoisonError};

/// Log level for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

fn log_callback() -> &'static Mutex<Option<LogCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<LogCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

/// Set the global log callback.
pub fn set_log_callback<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    let mut guard = log_callback()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = Some(Box::new(callback));
}

/// Remove the global log callback.
pub fn clear_log_callback() {
    let mut guard = log_callback()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = None;
}

/// Emit a diagnostic.
pub fn emit_log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!(target: "opentui_mouse", "{message}"),
        LogLevel::Info => tracing::info!(target: "opentui_mouse", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "opentui_mouse", "{message}"),
        LogLevel::Error => tracing::error!(target: "opentui_mouse", "{message}"),
    }
    if let Ok(guard) = log_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(level, message);
        }
    }
}
