//! # Data Path
//!
//! Assembly, encryption, decryption and parsing of data-channel packets.
//!
//! The capability split mirrors the protocol's: a channel contract shared
//! by both directions, extended separately by the encrypt and decrypt
//! sides so a type serving only one direction never has to fake the other.
//!
//! ## Wire Format
//! ```text
//! [header (1 or 4)] [packet id (4, BE)] [ciphertext + tag]
//! ```
//!
//! where the pre-encryption plaintext is
//!
//! ```text
//! [packet id (4, BE)] [framing byte, if active] [payload (N)]
//! ```
//!
//! No operation here blocks or performs I/O; everything is a CPU-bound
//! transform over in-memory buffers, safe to drive from any concurrency
//! context. Channel state (peer id, framing mode) is set before
//! steady-state traffic or synchronized externally.

pub mod decrypter;
pub mod encrypter;

pub use decrypter::AeadDecrypter;
pub use encrypter::AeadEncrypter;

use crate::config::{
    DATA_PACKET_NO_COMPRESS, DATA_PACKET_NO_COMPRESS_SWAP, PACKET_HEADER_LENGTH,
    PACKET_HEADER_V2_LENGTH, PACKET_PEER_ID_DISABLED,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Compression framing negotiated for a channel.
///
/// Compression itself is not implemented; framing determines only whether
/// a marker byte sits between the packet id and the payload. Exactly one
/// mode is active per channel at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionFraming {
    /// No framing byte.
    #[default]
    Disabled,
    /// Legacy `comp-lzo` framing: one marker byte, `0xFA` when uncompressed.
    CompLzo,
    /// `compress` framing: one marker byte, `0xFB` when uncompressed.
    Compress,
}

impl CompressionFraming {
    /// Bytes of framing prepended to the payload.
    pub fn header_length(self) -> usize {
        match self {
            Self::Disabled => 0,
            Self::CompLzo | Self::Compress => 1,
        }
    }

    /// The marker byte written for an uncompressed payload.
    pub(crate) fn uncompressed_marker(self) -> Option<u8> {
        match self {
            Self::Disabled => None,
            Self::CompLzo => Some(DATA_PACKET_NO_COMPRESS),
            Self::Compress => Some(DATA_PACKET_NO_COMPRESS_SWAP),
        }
    }
}

/// Mutable state shared by both directions of a data channel.
pub trait DataPathChannel {
    /// Worst-case bytes this channel adds around a payload. Callers size
    /// destination buffers once as `payload_len + overhead_length()`.
    fn overhead_length(&self) -> usize;

    /// The bound 24-bit peer id, or
    /// [`PACKET_PEER_ID_DISABLED`](crate::config::PACKET_PEER_ID_DISABLED).
    fn peer_id(&self) -> u32;

    /// Binds a peer id (masked to 24 bits) and switches the channel to
    /// DataV2 headers. Binding the sentinel reverts to V1 headers.
    fn set_peer_id(&mut self, peer_id: u32);

    /// Active compression framing.
    fn compression_framing(&self) -> CompressionFraming;

    /// Switches compression framing.
    fn set_compression_framing(&mut self, framing: CompressionFraming);
}

/// Send side of a data channel.
pub trait DataPathEncrypter: DataPathChannel {
    /// Writes the data-packet plaintext (packet id, optional framing byte,
    /// payload) into `dest` and returns the bytes written.
    ///
    /// # Panics
    /// If `dest` is smaller than `payload.len() + overhead_length()`.
    /// Capacity is a documented caller contract, not a runtime condition.
    fn assemble_data_packet(&self, packet_id: u32, payload: &[u8], dest: &mut [u8]) -> usize;

    /// Closure-based assembly: the caller fills the payload region of
    /// `dest` in place, for framings produced on the fly. Returns the
    /// total bytes written including packet id and framing byte.
    fn assemble_data_packet_with<F>(
        &self,
        packet_id: u32,
        payload_length: usize,
        dest: &mut [u8],
        fill: F,
    ) -> usize
    where
        F: FnOnce(&mut [u8]);

    /// Encrypts an assembled plaintext into a complete wire packet under
    /// key id `key`.
    fn encrypted_data_packet(&self, key: u8, packet_id: u32, assembled: &[u8]) -> Result<Vec<u8>>;
}

/// Outcome of decrypting one data packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptedPacket {
    /// Bytes written to the destination buffer.
    pub length: usize,
    /// The packet's sequence number, surfaced for replay tracking.
    pub packet_id: u32,
}

/// Receive side of a data channel.
pub trait DataPathDecrypter: DataPathChannel {
    /// Validates and decrypts one wire packet into `dest`.
    ///
    /// `dest` receives the full plaintext including the leading packet id,
    /// so [`parse_payload`](Self::parse_payload) can take a view over it.
    /// Sizing `dest` as `packet.len()` is always sufficient.
    fn decrypt_data_packet(&self, packet: &[u8], dest: &mut [u8]) -> Result<DecryptedPacket>;

    /// Zero-copy view of the payload inside an already-decrypted buffer,
    /// past the packet id and any framing byte. The slice borrows from
    /// `decrypted` and is valid only as long as it is.
    fn parse_payload<'a>(&self, decrypted: &'a [u8]) -> &'a [u8];
}

/// Data header length for a given peer-id binding.
pub(crate) fn header_length(peer_id: u32) -> usize {
    if peer_id == PACKET_PEER_ID_DISABLED {
        PACKET_HEADER_LENGTH
    } else {
        PACKET_HEADER_V2_LENGTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_header_lengths() {
        assert_eq!(CompressionFraming::Disabled.header_length(), 0);
        assert_eq!(CompressionFraming::CompLzo.header_length(), 1);
        assert_eq!(CompressionFraming::Compress.header_length(), 1);
    }

    #[test]
    fn test_framing_markers() {
        assert_eq!(CompressionFraming::Disabled.uncompressed_marker(), None);
        assert_eq!(
            CompressionFraming::CompLzo.uncompressed_marker(),
            Some(0xfa)
        );
        assert_eq!(
            CompressionFraming::Compress.uncompressed_marker(),
            Some(0xfb)
        );
    }

    #[test]
    fn test_header_length_follows_peer_binding() {
        assert_eq!(header_length(crate::config::PACKET_PEER_ID_DISABLED), 1);
        assert_eq!(header_length(0x00ab_cd), 4);
    }
}
