//! Per-channel reporting gates
//!
//! Each channel is either enabled or disabled. Transitions are explicit and
//! take effect for subsequent operations only; nothing produced while a
//! channel is disabled is kept for later.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AnalyticsConfiguration;

/// Reporting pathway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Analytics,
    Crash,
}

impl Channel {
    pub fn as_str(&self) -> &str {
        match self {
            Channel::Analytics => "analytics",
            Channel::Crash => "crash",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enable/disable state of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingGate {
    enabled: bool,
}

impl ReportingGate {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Unconditional and idempotent
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// The analytics and crash gates, tracked independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingGates {
    analytics: ReportingGate,
    crash: ReportingGate,
}

impl ReportingGates {
    pub fn new(analytics_enabled: bool, crash_enabled: bool) -> Self {
        Self {
            analytics: ReportingGate::new(analytics_enabled),
            crash: ReportingGate::new(crash_enabled),
        }
    }

    pub fn from_configuration(config: &AnalyticsConfiguration) -> Self {
        Self::new(config.analytics_enabled, config.crash_reporting_enabled)
    }

    pub fn get(&self, channel: Channel) -> ReportingGate {
        match channel {
            Channel::Analytics => self.analytics,
            Channel::Crash => self.crash,
        }
    }

    pub fn set(&mut self, channel: Channel, enabled: bool) {
        match channel {
            Channel::Analytics => self.analytics.set_enabled(enabled),
            Channel::Crash => self.crash.set_enabled(enabled),
        }
    }

    pub fn is_enabled(&self, channel: Channel) -> bool {
        self.get(channel).is_enabled()
    }
}

impl Default for ReportingGates {
    fn default() -> Self {
        Self::from_configuration(&AnalyticsConfiguration::default())
    }
}
