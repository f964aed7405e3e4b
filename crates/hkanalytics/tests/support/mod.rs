//! Shared helpers for integration tests

#![allow(dead_code)]

use hkanalytics::{AnalyticsConfiguration, MemoryBackend, TelemetryClient};
use std::sync::Arc;
use thiserror::Error;

/// Error type handed to `record_error` in tests
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("payment declined: {0}")]
    PaymentDeclined(String),
    #[error("cart is empty")]
    EmptyCart,
}

/// Client wired to one in-memory backend for both channels
pub fn memory_client(config: AnalyticsConfiguration) -> (Arc<TelemetryClient>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let client = Arc::new(TelemetryClient::new(backend.clone(), backend.clone()));
    client.configure(config);
    (client, backend)
}
