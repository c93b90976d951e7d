//! Client configuration.
//!
//! # Design
//! Optional settings stay optional here and are resolved to their defaults
//! (no timeout, `NullLogger`) exactly once, when `NetworkClient::new`
//! validates the configuration. Nothing is validated in this module, so an
//! invalid configuration fails at client construction rather than at the
//! first request.

use std::fmt;
use std::sync::Arc;

use crate::endpoint::EndPoint;
use crate::error::PalError;
use crate::logging::Logger;

/// Environment variable holding the absolute endpoint URI.
pub const ENDPOINT_ENV: &str = "PAL_ENDPOINT";
/// Environment variable holding the timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "PAL_TIMEOUT_MS";

#[derive(Clone, Default)]
pub struct ClientConfig {
    pub endpoint: Option<EndPoint>,
    /// Milliseconds; `0` disables the timeout.
    pub timeout_ms: i64,
    pub logger: Option<Arc<dyn Logger>>,
}

impl ClientConfig {
    pub fn new(endpoint: EndPoint) -> Self {
        Self {
            endpoint: Some(endpoint),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Read `PAL_ENDPOINT` and `PAL_TIMEOUT_MS`. A missing endpoint is left
    /// unset; a present but malformed value is an error.
    pub fn from_env() -> Result<Self, PalError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PalError> {
        let endpoint = lookup(ENDPOINT_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(|v| EndPoint::parse(&v))
            .transpose()?;
        let timeout_ms = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                PalError::invalid(format!("{TIMEOUT_ENV} must be an integer, got '{raw}'"))
            })?,
            None => 0,
        };
        Ok(Self {
            endpoint,
            timeout_ms,
            logger: None,
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout_ms", &self.timeout_ms)
            .field("logger", &self.logger.as_ref().map(|_| "<logger>"))
            .finish()
    }
}
