//! Platform abstraction layer: a thin HTTP client and a random bytes
//! service over host-supplied primitives.
//!
//! # Overview
//! `NetworkClient` builds a request URI from an `EndPoint`, an optional
//! additional path and optional query parameters, sends it through a
//! `Transport`, and classifies the outcome into a `PalError` taxonomy
//! (http-error, timeout, transport-error, response-decode-error).
//! `RngService` fills byte buffers from an `RngSource`.
//!
//! # Design
//! - The client is stateless apart from immutable configuration, so one
//!   instance can serve any number of concurrent calls.
//! - Request building and outcome classification are pure functions;
//!   only the `Transport` performs I/O. `UreqTransport` is the bundled
//!   implementation.
//! - Logging goes through the `Logger` trait and never affects outcomes.
//!
//! # Runtime
//! The client's futures can be polled by any executor. Under tokio (with
//! the time driver) the client enforces its timeout itself and
//! `UreqTransport` uses the blocking pool. Elsewhere the timeout is left to
//! the transport and `UreqTransport` blocks the polling thread.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod logging;
pub mod query;
pub mod rng;
pub mod transport;
pub mod uri;

pub use client::{classify, decode_json, NetworkClient, Payload};
pub use config::ClientConfig;
pub use endpoint::EndPoint;
pub use error::{ErrorContext, ErrorKind, PalError, TransportError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, TransportOutcome};
pub use logging::{Logger, NullLogger, TracingLogger};
pub use query::{QueryParams, QueryValue};
pub use rng::{OsRngSource, RngService, RngSource};
pub use transport::{Transport, UreqTransport};
