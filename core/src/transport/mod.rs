//! The capability a host supplies to move bytes.
//!
//! # Design
//! A transport receives a fully built `HttpRequest` and resolves to exactly
//! one `TransportOutcome`. Returning a single value (rather than registering
//! load/error/timeout callbacks) makes the terminal events mutually
//! exclusive by construction. Transports should honor `HttpRequest::timeout`,
//! but the client enforces it as well.

mod blocking;

use async_trait::async_trait;

use crate::http::{HttpRequest, TransportOutcome};

pub use self::blocking::UreqTransport;

/// Performs one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> TransportOutcome;
}
