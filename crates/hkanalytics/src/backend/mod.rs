//! Outward-facing collaborator interfaces
//!
//! The client never talks to an analytics or crash reporting SDK directly. It
//! calls into these two traits, and whatever implements them owns delivery,
//! batching and its own collection flags.

use std::error::Error;

use crate::params::ParamMap;

mod log;
mod memory;

pub use log::LogBackend;
pub use memory::{AnalyticsCall, CrashCall, MemoryBackend, RecordedError, RecordedEvent};

/// Analytics provider
pub trait AnalyticsBackend: Send + Sync {
    /// One-time provider setup. Called on the first `configure` only.
    fn initialize(&self) {}

    fn log_event(&self, name: &str, parameters: Option<&ParamMap>);

    fn set_user_id(&self, id: &str);

    fn set_user_property(&self, name: &str, value: Option<&str>);

    /// Provider-side collection flag. Events logged while it is off are the
    /// provider's to discard.
    fn set_analytics_collection_enabled(&self, enabled: bool);
}

/// Crash reporting provider
pub trait CrashBackend: Send + Sync {
    /// One-time provider setup. Called on the first `configure` only.
    fn initialize(&self) {}

    fn set_user_id(&self, id: &str);

    fn set_custom_value(&self, key: &str, value: &str);

    fn log(&self, line: &str);

    fn record_error(&self, error: &dyn Error, context: &ParamMap);

    fn set_collection_enabled(&self, enabled: bool);
}

/// Backend that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl AnalyticsBackend for NoopBackend {
    fn log_event(&self, _name: &str, _parameters: Option<&ParamMap>) {}
    fn set_user_id(&self, _id: &str) {}
    fn set_user_property(&self, _name: &str, _value: Option<&str>) {}
    fn set_analytics_collection_enabled(&self, _enabled: bool) {}
}

impl CrashBackend for NoopBackend {
    fn set_user_id(&self, _id: &str) {}
    fn set_custom_value(&self, _key: &str, _value: &str) {}
    fn log(&self, _line: &str) {}
    fn record_error(&self, _error: &dyn Error, _context: &ParamMap) {}
    fn set_collection_enabled(&self, _enabled: bool) {}
}
