//! Error types for the network client and the random bytes service.
//!
//! # Design
//! Network failures always carry an `ErrorContext` with the URI that was
//! actually requested, plus the status and raw response when the transport
//! produced them. The `Display` text of each variant is the message callers
//! match on ("Failed GET request", "timed out", "unable to parse response").

use serde::Serialize;
use thiserror::Error;

use crate::http::HttpMethod;

/// Coarse classification of a `PalError`, stable across the FFI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Http,
    Timeout,
    Transport,
    ResponseDecode,
    RandomSource,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::Http => "http-error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transport => "transport-error",
            ErrorKind::ResponseDecode => "response-decode-error",
            ErrorKind::RandomSource => "random-source",
        }
    }
}

/// Structured detail attached to every network failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
    #[serde(rename = "endPoint")]
    pub endpoint: String,
    #[serde(rename = "httpStatusCode", skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ErrorContext {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: None,
            response: None,
        }
    }
}

/// A network-level failure reported by a `Transport` (DNS, refused
/// connection, broken pipe). Timeouts are reported separately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors returned by `NetworkClient`, `EndPoint` and `RngService`.
#[derive(Debug, Error)]
pub enum PalError {
    /// A constructor or operation was given a value it cannot accept.
    #[error("{0}")]
    InvalidArgument(String),

    /// The request completed with a status other than 200.
    #[error("Failed {method} request")]
    Http {
        method: HttpMethod,
        context: ErrorContext,
    },

    /// The configured timeout elapsed before the request completed.
    #[error("Failed {method} request, timed out")]
    Timeout {
        method: HttpMethod,
        context: ErrorContext,
    },

    /// The transport could not complete the exchange.
    #[error("Failed {method} request, {source}")]
    Transport {
        method: HttpMethod,
        context: ErrorContext,
        #[source]
        source: TransportError,
    },

    /// A 200 response body was not valid JSON.
    #[error("Failed {method} request, unable to parse response")]
    ResponseDecode {
        method: HttpMethod,
        context: ErrorContext,
        #[source]
        source: serde_json::Error,
    },

    /// The secure random source failed to fill the buffer.
    #[error("Failed to generate random bytes: {0}")]
    RandomSource(String),
}

impl PalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PalError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PalError::Http { .. } => ErrorKind::Http,
            PalError::Timeout { .. } => ErrorKind::Timeout,
            PalError::Transport { .. } => ErrorKind::Transport,
            PalError::ResponseDecode { .. } => ErrorKind::ResponseDecode,
            PalError::RandomSource(_) => ErrorKind::RandomSource,
        }
    }

    /// The request context, for the variants produced by a request.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            PalError::Http { context, .. }
            | PalError::Timeout { context, .. }
            | PalError::Transport { context, .. }
            | PalError::ResponseDecode { context, .. } => Some(context),
            PalError::InvalidArgument(_) | PalError::RandomSource(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.context().and_then(|c| c.status)
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PalError::InvalidArgument(message.into())
    }
}
