//! # HKAnalytics
//!
//! Client-side telemetry façade. Application events and diagnostic context are
//! normalized here before they reach an external analytics provider and an
//! external crash reporter.
//!
//! ## What lives here
//!
//! - **Sanitization**: event parameters are bounded in count and value length
//! - **Breadcrumbs**: a bounded, time-ordered trail attached to error reports
//! - **Context**: last-write-wins user/session context
//! - **Gates**: per-channel enable/disable state for analytics and crash reporting
//!
//! Delivery, batching and retries belong to the backends behind
//! [`AnalyticsBackend`] and [`CrashBackend`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use hkanalytics::{params, AnalyticsConfiguration, MemoryBackend, TelemetryClient};
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let client = TelemetryClient::new(backend.clone(), backend.clone());
//! client.configure(AnalyticsConfiguration::default());
//!
//! client.add_breadcrumb("opened cart", None);
//! client.track("purchase", Some(&params! { "item" => "sku1", "price" => 9.99 }));
//!
//! assert_eq!(backend.events()[0].name, "purchase");
//! ```
//!
//! ## Opt-Out
//!
//! ```bash
//! # Via environment variable
//! export HKANALYTICS_DISABLED=1
//!
//! # Via config file (.hkanalytics/config.toml)
//! [analytics]
//! analytics_enabled = false
//! crash_reporting_enabled = false
//! ```

pub mod backend;
pub mod breadcrumbs;
pub mod client;
pub mod config;
pub mod context;
pub mod gate;
pub mod logging;
pub mod params;
pub mod sanitizer;

pub use backend::{AnalyticsBackend, CrashBackend, LogBackend, MemoryBackend, NoopBackend};
pub use breadcrumbs::{Breadcrumb, BreadcrumbLog, DEFAULT_BREADCRUMB_CAPACITY};
pub use client::TelemetryClient;
pub use config::{load_analytics_config, AnalyticsConfiguration, ConfigError};
pub use context::ContextStore;
pub use gate::{Channel, ReportingGate, ReportingGates};
pub use logging::LogLevel;
pub use params::{merge, ParamMap, ParamValue};
pub use sanitizer::{sanitize_parameters, ParameterSanitizer};

/// Re-export common types
pub type Result<T> = anyhow::Result<T>;
