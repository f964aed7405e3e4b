//! Backend that writes every call as a JSON line
//!
//! Nothing is sent anywhere; each forwarded call becomes one record on the
//! sink so payloads can be inspected before a real provider is wired in.

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::error::Error;
use std::io::{self, Write};

use super::{AnalyticsBackend, CrashBackend};
use crate::params::ParamMap;

pub struct LogBackend {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl LogBackend {
    pub fn new<W>(sink: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn emit(&self, channel: &str, call: &str, mut fields: Value) {
        if let Value::Object(ref mut map) = fields {
            map.insert("channel".to_string(), json!(channel));
            map.insert("call".to_string(), json!(call));
        }

        let line = match serde_json::to_string(&fields) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, call, "failed to encode backend record");
                return;
            }
        };

        // Fail silently; a broken sink must never reach the caller
        let mut sink = self.sink.lock();
        if let Err(e) = writeln!(sink, "{}", line).and_then(|_| sink.flush()) {
            tracing::warn!(error = %e, call, "failed to write backend record");
        }
    }
}

impl std::fmt::Debug for LogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBackend").finish_non_exhaustive()
    }
}

impl AnalyticsBackend for LogBackend {
    fn initialize(&self) {
        self.emit("analytics", "initialize", json!({}));
    }

    fn log_event(&self, name: &str, parameters: Option<&ParamMap>) {
        self.emit(
            "analytics",
            "log_event",
            json!({ "name": name, "parameters": parameters }),
        );
    }

    fn set_user_id(&self, id: &str) {
        self.emit("analytics", "set_user_id", json!({ "id": id }));
    }

    fn set_user_property(&self, name: &str, value: Option<&str>) {
        self.emit(
            "analytics",
            "set_user_property",
            json!({ "name": name, "value": value }),
        );
    }

    fn set_analytics_collection_enabled(&self, enabled: bool) {
        self.emit(
            "analytics",
            "set_collection_enabled",
            json!({ "enabled": enabled }),
        );
    }
}

impl CrashBackend for LogBackend {
    fn initialize(&self) {
        self.emit("crash", "initialize", json!({}));
    }

    fn set_user_id(&self, id: &str) {
        self.emit("crash", "set_user_id", json!({ "id": id }));
    }

    fn set_custom_value(&self, key: &str, value: &str) {
        self.emit(
            "crash",
            "set_custom_value",
            json!({ "key": key, "value": value }),
        );
    }

    fn log(&self, line: &str) {
        self.emit("crash", "log", json!({ "line": line }));
    }

    fn record_error(&self, error: &dyn Error, context: &ParamMap) {
        self.emit(
            "crash",
            "record_error",
            json!({ "error": error.to_string(), "context": context }),
        );
    }

    fn set_collection_enabled(&self, enabled: bool) {
        self.emit(
            "crash",
            "set_collection_enabled",
            json!({ "enabled": enabled }),
        );
    }
}
