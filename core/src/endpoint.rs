//! Remote endpoint descriptor.

use std::fmt;

use url::Url;

use crate::error::PalError;

/// Scheme, host, optional port and optional root path of a remote service.
///
/// Immutable once built. `uri()` renders the canonical base URI with no
/// trailing slash and no query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndPoint {
    protocol: String,
    host: String,
    root_path: Option<String>,
    port: Option<u16>,
}

impl EndPoint {
    /// Build an endpoint. Leading and trailing slashes are trimmed from
    /// `root_path`; a path made only of slashes is treated as absent.
    pub fn new(
        protocol: &str,
        host: &str,
        root_path: Option<&str>,
        port: Option<u16>,
    ) -> Result<Self, PalError> {
        let protocol = protocol.trim().to_ascii_lowercase();
        if protocol != "http" && protocol != "https" {
            return Err(PalError::invalid(format!(
                "The protocol must be http or https, it is '{protocol}'"
            )));
        }
        let host = host.trim();
        if host.is_empty() {
            return Err(PalError::invalid("The host must not be empty"));
        }
        if port == Some(0) {
            return Err(PalError::invalid("The port must be > 0"));
        }
        let root_path = root_path
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            protocol,
            host: host.to_string(),
            root_path,
            port,
        })
    }

    /// Parse an absolute URI such as `http://localhost:14265/api`.
    pub fn parse(uri: &str) -> Result<Self, PalError> {
        let url = Url::parse(uri.trim())
            .map_err(|e| PalError::invalid(format!("The endpoint '{uri}' is not a valid URI: {e}")))?;
        if url.query().is_some() || url.fragment().is_some() {
            return Err(PalError::invalid(format!(
                "The endpoint '{uri}' must not contain a query or fragment"
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| PalError::invalid(format!("The endpoint '{uri}' has no host")))?;
        Self::new(url.scheme(), host, Some(url.path()), url.port())
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn root_path(&self) -> Option<&str> {
        self.root_path.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn uri(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EndPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if let Some(path) = &self.root_path {
            write!(f, "/{path}")?;
        }
        Ok(())
    }
}
