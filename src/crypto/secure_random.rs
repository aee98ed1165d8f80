//! Entropy helpers backed by the operating system's CSPRNG.
//!
//! Key and session-id material must come from here, never from a seeded
//! PRNG. Failures of the entropy source are surfaced as
//! [`ProtocolError::RandomGenerator`] so callers can distinguish them from
//! protocol-level faults.

use crate::error::{ProtocolError, Result};

/// Fills a new buffer of `length` bytes with cryptographically secure
/// random data.
pub fn secure_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    getrandom::fill(&mut bytes).map_err(|_| ProtocolError::RandomGenerator)?;
    Ok(bytes)
}

/// Fills a fixed-size array with cryptographically secure random data.
pub fn secure_array<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::fill(&mut bytes).map_err(|_| ProtocolError::RandomGenerator)?;
    Ok(bytes)
}
