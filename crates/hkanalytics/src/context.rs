//! Accumulated user/session context
//!
//! Context only grows or gets overwritten; there is no removal.

use crate::params::{merge_into, ParamMap, ParamValue};

/// Key under which the current user identity is stored
pub const USER_ID_KEY: &str = "user_id";

#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    entries: ParamMap,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-write-wins per key; keys absent from `additional` are left alone.
    pub fn merge(&mut self, additional: &ParamMap) {
        merge_into(&mut self.entries, additional);
    }

    pub fn set_identity(&mut self, id: impl Into<String>) {
        self.entries
            .insert(USER_ID_KEY.to_string(), ParamValue::String(id.into()));
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn snapshot(&self) -> ParamMap {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
