//! In-memory backend
//!
//! Records every call it receives. Like a real provider it honours its own
//! collection flags: events and errors that arrive while collection is off
//! show up in the call log but are not collected.

use parking_lot::Mutex;
use std::error::Error;

use super::{AnalyticsBackend, CrashBackend};
use crate::params::ParamMap;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsCall {
    Initialize,
    LogEvent {
        name: String,
        parameters: Option<ParamMap>,
    },
    SetUserId(String),
    SetUserProperty {
        name: String,
        value: Option<String>,
    },
    SetCollectionEnabled(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrashCall {
    Initialize,
    SetUserId(String),
    SetCustomValue { key: String, value: String },
    Log(String),
    RecordError { error: String, context: ParamMap },
    SetCollectionEnabled(bool),
}

/// An analytics event kept while collection was on
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub parameters: Option<ParamMap>,
}

/// An error kept while crash collection was on
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedError {
    pub error: String,
    pub context: ParamMap,
}

#[derive(Debug)]
struct MemoryState {
    analytics_calls: Vec<AnalyticsCall>,
    crash_calls: Vec<CrashCall>,
    events: Vec<RecordedEvent>,
    errors: Vec<RecordedError>,
    analytics_collection: bool,
    crash_collection: bool,
}

#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    /// Both collection flags start on, as provider SDKs do.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                analytics_calls: Vec::new(),
                crash_calls: Vec::new(),
                events: Vec::new(),
                errors: Vec::new(),
                analytics_collection: true,
                crash_collection: true,
            }),
        }
    }

    pub fn analytics_calls(&self) -> Vec<AnalyticsCall> {
        self.state.lock().analytics_calls.clone()
    }

    pub fn crash_calls(&self) -> Vec<CrashCall> {
        self.state.lock().crash_calls.clone()
    }

    /// Events collected so far
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().events.clone()
    }

    /// Errors collected so far
    pub fn errors(&self) -> Vec<RecordedError> {
        self.state.lock().errors.clone()
    }

    /// Lines received through `CrashBackend::log`
    pub fn log_lines(&self) -> Vec<String> {
        self.state
            .lock()
            .crash_calls
            .iter()
            .filter_map(|call| match call {
                CrashCall::Log(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_analytics_collection_enabled(&self) -> bool {
        self.state.lock().analytics_collection
    }

    pub fn is_crash_collection_enabled(&self) -> bool {
        self.state.lock().crash_collection
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsBackend for MemoryBackend {
    fn initialize(&self) {
        self.state.lock().analytics_calls.push(AnalyticsCall::Initialize);
    }

    fn log_event(&self, name: &str, parameters: Option<&ParamMap>) {
        let mut state = self.state.lock();
        state.analytics_calls.push(AnalyticsCall::LogEvent {
            name: name.to_string(),
            parameters: parameters.cloned(),
        });
        if state.analytics_collection {
            state.events.push(RecordedEvent {
                name: name.to_string(),
                parameters: parameters.cloned(),
            });
        }
    }

    fn set_user_id(&self, id: &str) {
        self.state
            .lock()
            .analytics_calls
            .push(AnalyticsCall::SetUserId(id.to_string()));
    }

    fn set_user_property(&self, name: &str, value: Option<&str>) {
        self.state
            .lock()
            .analytics_calls
            .push(AnalyticsCall::SetUserProperty {
                name: name.to_string(),
                value: value.map(str::to_string),
            });
    }

    fn set_analytics_collection_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state
            .analytics_calls
            .push(AnalyticsCall::SetCollectionEnabled(enabled));
        state.analytics_collection = enabled;
    }
}

impl CrashBackend for MemoryBackend {
    fn initialize(&self) {
        self.state.lock().crash_calls.push(CrashCall::Initialize);
    }

    fn set_user_id(&self, id: &str) {
        self.state
            .lock()
            .crash_calls
            .push(CrashCall::SetUserId(id.to_string()));
    }

    fn set_custom_value(&self, key: &str, value: &str) {
        self.state.lock().crash_calls.push(CrashCall::SetCustomValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn log(&self, line: &str) {
        self.state
            .lock()
            .crash_calls
            .push(CrashCall::Log(line.to_string()));
    }

    fn record_error(&self, error: &dyn Error, context: &ParamMap) {
        let mut state = self.state.lock();
        state.crash_calls.push(CrashCall::RecordError {
            error: error.to_string(),
            context: context.clone(),
        });
        if state.crash_collection {
            state.errors.push(RecordedError {
                error: error.to_string(),
                context: context.clone(),
            });
        }
    }

    fn set_collection_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.crash_calls.push(CrashCall::SetCollectionEnabled(enabled));
        state.crash_collection = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use std::io;

    #[test]
    fn test_events_respect_collection_flag() {
        let backend = MemoryBackend::new();
        backend.log_event("kept", None);
        backend.set_analytics_collection_enabled(false);
        backend.log_event("dropped", Some(&params! { "a" => 1 }));

        assert_eq!(backend.analytics_calls().len(), 3);
        let names: Vec<String> = backend.events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["kept"]);
        assert!(!backend.is_analytics_collection_enabled());
    }

    #[test]
    fn test_errors_respect_collection_flag() {
        let backend = MemoryBackend::new();
        let err = io::Error::new(io::ErrorKind::Other, "boom");

        backend.set_collection_enabled(false);
        backend.record_error(&err, &ParamMap::new());
        assert!(backend.errors().is_empty());

        backend.set_collection_enabled(true);
        backend.record_error(&err, &ParamMap::new());
        assert_eq!(backend.errors().len(), 1);
        assert_eq!(backend.errors()[0].error, "boom");
    }

    #[test]
    fn test_log_lines() {
        let backend = MemoryBackend::new();
        backend.log("one");
        CrashBackend::set_user_id(&backend, "u-1");
        backend.log("two");
        assert_eq!(backend.log_lines(), vec!["one", "two"]);
    }
}
