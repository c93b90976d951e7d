//! Random bytes service.
//!
//! A direct pass-through: the service allocates the buffer and the source
//! fills it in place. No reseeding, pooling or retries; randomness quality
//! is entirely the source's responsibility.

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::PalError;

/// A cryptographically secure source of random bytes.
pub trait RngSource: Send + Sync {
    fn fill(&self, buffer: &mut [u8]) -> Result<(), PalError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngSource;

impl RngSource for OsRngSource {
    fn fill(&self, buffer: &mut [u8]) -> Result<(), PalError> {
        OsRng
            .try_fill_bytes(buffer)
            .map_err(|e| PalError::RandomSource(e.to_string()))
    }
}

#[derive(Clone)]
pub struct RngService {
    source: Arc<dyn RngSource>,
}

impl RngService {
    /// A service backed by the operating system source.
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsRngSource))
    }

    pub fn with_source(source: Arc<dyn RngSource>) -> Self {
        Self { source }
    }

    /// Return `length` bytes filled by the source. The returned vector is
    /// the buffer the source wrote into.
    pub fn generate(&self, length: usize) -> Result<Vec<u8>, PalError> {
        let mut buffer = vec![0u8; length];
        if length > 0 {
            self.source.fill(&mut buffer)?;
        }
        Ok(buffer)
    }
}

impl Default for RngService {
    fn default() -> Self {
        Self::new()
    }
}
