//! # Packet Header Codec
//!
//! Bit-exact encode/decode of the two OpenVPN header shapes.
//!
//! ## Wire Format
//! ```text
//! V1-style:  [code(5 bits) | key(3 bits)] [session id (8), optional]
//! DataV2:    [code(5) | key(3)] [peer id (24-bit, network order)]
//! ```
//!
//! The DataV2 header is a single big-endian 32-bit word: the code+key byte
//! occupies the top 8 bits, the peer id the low 24. The sentinel
//! `0xFFFFFF` means "peer id disabled".
//!
//! All transforms here are pure functions over fixed-size buffers; callers
//! guarantee destination capacity.

use crate::config::{PACKET_HEADER_V2_LENGTH, SESSION_ID_LENGTH};

/// An 8-byte control-channel session identifier.
pub type SessionId = [u8; SESSION_ID_LENGTH];

/// Packet opcode, carried in the top 5 bits of the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketCode {
    /// Graceful key renegotiation request.
    SoftResetV1 = 0x03,
    /// Control-channel payload (TLS ciphertext).
    ControlV1 = 0x04,
    /// Acknowledgment-only control packet.
    AckV1 = 0x05,
    /// Data packet, 1-byte header.
    DataV1 = 0x06,
    /// Client-side session start.
    HardResetClientV2 = 0x07,
    /// Server-side session start.
    HardResetServerV2 = 0x08,
    /// Data packet, 4-byte header with peer id.
    DataV2 = 0x09,
    /// Any opcode this implementation does not speak.
    Unknown = 0xff,
}

impl PacketCode {
    /// Maps a raw 5-bit opcode to a known code, [`PacketCode::Unknown`]
    /// otherwise. Never fails: unknown opcodes are a routing decision for
    /// the session layer, not a parse error.
    pub fn from_byte(raw: u8) -> Self {
        match raw {
            0x03 => Self::SoftResetV1,
            0x04 => Self::ControlV1,
            0x05 => Self::AckV1,
            0x06 => Self::DataV1,
            0x07 => Self::HardResetClientV2,
            0x08 => Self::HardResetServerV2,
            0x09 => Self::DataV2,
            _ => Self::Unknown,
        }
    }
}

/// Encodes the 1-byte header: `(code << 3) | (key & 0b111)`.
///
/// Key ids occupy 3 bits. Passing `key > 7` is a caller bug; the value is
/// masked on the wire so an out-of-range id can never corrupt the opcode
/// bits, and debug builds assert.
pub fn packet_header(code: PacketCode, key: u8) -> u8 {
    debug_assert!(key <= 0b111, "key id out of range: {key}");
    ((code as u8) << 3) | (key & 0b111)
}

/// Splits a header byte into its opcode and key id.
pub fn packet_opcode(byte: u8) -> (PacketCode, u8) {
    (PacketCode::from_byte(byte >> 3), byte & 0b111)
}

/// Encodes the 4-byte DataV2 header.
///
/// Produces the big-endian word `((DataV2 << 3 | key) << 24) | (peer_id &
/// 0xFFFFFF)`: byte 0 is code+key, bytes 1-3 are the peer id in network
/// order. Peer ids are 24-bit; higher bits are masked off.
pub fn packet_header_data_v2(key: u8, peer_id: u32) -> [u8; PACKET_HEADER_V2_LENGTH] {
    debug_assert!(key <= 0b111, "key id out of range: {key}");
    let word = (u32::from(packet_header(PacketCode::DataV2, key)) << 24) | (peer_id & 0x00ff_ffff);
    word.to_be_bytes()
}

/// Extracts the 24-bit peer id from a DataV2 header, ignoring the code/key
/// byte. Returns `None` when fewer than 4 bytes are available; inbound
/// headers are untrusted and must not be sliced blindly.
pub fn data_v2_peer_id(bytes: &[u8]) -> Option<u32> {
    let word: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(word) & 0x00ff_ffff)
}

/// Builds a V1-style packet prefix: 1-byte header followed by the session
/// id when supplied.
pub fn packet_with_header(code: PacketCode, key: u8, session_id: Option<&SessionId>) -> Vec<u8> {
    let mut raw = Vec::with_capacity(1 + SESSION_ID_LENGTH);
    raw.push(packet_header(code, key));
    if let Some(session_id) = session_id {
        raw.extend_from_slice(session_id);
    }
    raw
}

/// Builds a DataV2 packet prefix: 4-byte header followed by the session id
/// when supplied.
pub fn packet_with_header_data_v2(
    key: u8,
    peer_id: u32,
    session_id: Option<&SessionId>,
) -> Vec<u8> {
    let mut raw = Vec::with_capacity(PACKET_HEADER_V2_LENGTH + SESSION_ID_LENGTH);
    raw.extend_from_slice(&packet_header_data_v2(key, peer_id));
    if let Some(session_id) = session_id {
        raw.extend_from_slice(session_id);
    }
    raw
}
