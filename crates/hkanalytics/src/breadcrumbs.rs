//! Bounded breadcrumb trail
//!
//! Breadcrumbs are timestamped diagnostic entries kept in insertion order and
//! attached to error reports. The log holds at most `capacity` entries; once
//! full, each insert evicts the oldest entries, never more than needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::params::{render_pairs, ParamMap};

/// Number of breadcrumbs retained by [`BreadcrumbLog::new`]
pub const DEFAULT_BREADCRUMB_CAPACITY: usize = 100;

/// A single breadcrumb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    message: String,
    data: ParamMap,
    timestamp: DateTime<Utc>,
}

impl Breadcrumb {
    pub fn new(message: impl Into<String>, data: ParamMap, timestamp: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            data,
            timestamp,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &ParamMap {
        &self.data
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// `[HH:MM:SS.mmm] message | k1=v1, k2=v2`
    ///
    /// The time of day is rendered in UTC, not the host's local time zone.
    ///
    /// The data suffix follows map iteration order, so multi-key output is
    /// fine for logs but not for exact comparisons.
    pub fn description(&self) -> String {
        format!(
            "[{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.log_line()
        )
    }

    /// Message plus data suffix, without the timestamp
    pub fn log_line(&self) -> String {
        if self.data.is_empty() {
            self.message.clone()
        } else {
            format!("{} | {}", self.message, render_pairs(&self.data))
        }
    }
}

/// Capacity-bounded, insertion-ordered breadcrumb log
#[derive(Debug, Clone)]
pub struct BreadcrumbLog {
    entries: VecDeque<Breadcrumb>,
    capacity: usize,
}

impl BreadcrumbLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BREADCRUMB_CAPACITY)
    }

    /// A zero capacity is clamped to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a breadcrumb stamped with the current time and return a copy of it.
    pub fn append(&mut self, message: impl Into<String>, data: ParamMap) -> Breadcrumb {
        let breadcrumb = Breadcrumb::new(message, data, Utc::now());
        self.push(breadcrumb.clone());
        breadcrumb
    }

    pub fn push(&mut self, breadcrumb: Breadcrumb) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(breadcrumb);
    }

    /// Batch insert. Only the newest `capacity` entries of an oversized batch
    /// are kept.
    pub fn extend<I>(&mut self, breadcrumbs: I)
    where
        I: IntoIterator<Item = Breadcrumb>,
    {
        let mut batch: Vec<Breadcrumb> = breadcrumbs.into_iter().collect();
        if batch.len() > self.capacity {
            batch.drain(..batch.len() - self.capacity);
        }

        let overflow = (self.entries.len() + batch.len()).saturating_sub(self.capacity);
        self.entries.drain(..overflow);
        self.entries.extend(batch);
    }

    /// Copy of the log, oldest first
    pub fn snapshot(&self) -> Vec<Breadcrumb> {
        self.entries.iter().cloned().collect()
    }

    /// Rendered descriptions, oldest first
    pub fn descriptions(&self) -> Vec<String> {
        self.entries.iter().map(Breadcrumb::description).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breadcrumb> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BreadcrumbLog {
    fn default() -> Self {
        Self::new()
    }
}
