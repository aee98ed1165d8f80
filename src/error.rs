//! # Error Types
//!
//! Error handling for the data-path core.
//!
//! This module defines the closed set of failures a packet can run into on
//! its way through the framing and encryption engine. The variants mirror
//! the three logical groups of the protocol:
//!
//! - **Cryptographic errors**: entropy exhaustion, AEAD failures, key misuse
//! - **Data-path errors**: malformed inbound packets, peer-id gating
//! - **Control-channel errors**: truncated or inconsistent control framing
//!
//! Every error is terminal for the single packet being processed. Retries,
//! if any, are a transport-layer policy and never happen inside this crate.
//!
//! Buffer-capacity violations on the encode path are deliberately *not*
//! represented here: they indicate caller misuse of a documented sizing
//! contract and surface as assertions instead.

use std::io;
use thiserror::Error;

/// Primary error type for all data-path operations.
///
/// Decryption failures are intentionally uniform: a bad tag, a garbled
/// length and a wrong key all collapse into [`ProtocolError::Authentication`]
/// so that the error shape leaks nothing about where verification stopped.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// I/O failure surfaced by a stream codec driver.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The system entropy source failed to produce random bytes.
    #[error("random generator failure")]
    RandomGenerator,

    /// AEAD verification of an inbound packet failed.
    #[error("packet authentication failed")]
    Authentication,

    /// The cipher failed while producing an outbound packet.
    #[error("packet encryption failed")]
    Encryption,

    /// Key material or cipher configuration is unusable.
    #[error("cryptographic misuse: {0}")]
    Algorithm(String),

    /// An inbound packet is too short for its declared shape.
    #[error("malformed packet: {length} bytes, need at least {minimum}")]
    Overflow {
        /// Observed packet length.
        length: usize,
        /// Minimum length for the packet's header shape.
        minimum: usize,
    },

    /// A DataV2 packet carries a peer id other than the channel's.
    #[error("peer id mismatch: expected {expected:#08x}, found {found:#08x}")]
    PeerIdMismatch {
        /// Peer id bound to the receiving channel.
        expected: u32,
        /// Peer id found in the packet header.
        found: u32,
    },

    /// A control-channel packet failed structural validation.
    #[error("malformed control packet: {0}")]
    MalformedControlPacket(&'static str),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
