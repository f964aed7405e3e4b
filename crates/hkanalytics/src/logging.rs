//! Debug-mode diagnostics
//!
//! Lines logged here are only emitted while debug mode is on. They go through
//! `tracing`, so the host decides where they end up.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emit `message` at `level` when `debug_mode` is on; otherwise do nothing.
///
/// Returns whether the line was emitted.
pub fn log(debug_mode: bool, level: LogLevel, message: &str) -> bool {
    if !debug_mode {
        return false;
    }

    match level {
        LogLevel::Debug => tracing::debug!(target: "hkanalytics", "{}", message),
        LogLevel::Info => tracing::info!(target: "hkanalytics", "{}", message),
        LogLevel::Warning => tracing::warn!(target: "hkanalytics", "{}", message),
        LogLevel::Error => tracing::error!(target: "hkanalytics", "{}", message),
    }
    true
}
