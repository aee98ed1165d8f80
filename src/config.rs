//! # Protocol Constants
//!
//! Wire-format constants shared by the header codec, the data path and the
//! control channel. All sizes are fixed by the OpenVPN wire protocol and
//! must not be changed without breaking interoperability.

/// Length of the per-packet sequence number (packet id), in bytes.
pub const PACKET_ID_LENGTH: usize = 4;

/// Length of a control-channel session id, in bytes.
pub const SESSION_ID_LENGTH: usize = 8;

/// Sentinel peer id meaning "no peer id negotiated" (24-bit all-ones).
///
/// A channel bound to this value emits V1-style 1-byte data headers instead
/// of the 4-byte DataV2 form.
pub const PACKET_PEER_ID_DISABLED: u32 = 0x00ff_ffff;

/// Length of the 4-byte DataV2 header (code+key byte and 24-bit peer id).
pub const PACKET_HEADER_V2_LENGTH: usize = 4;

/// Length of the 1-byte V1-style header.
pub const PACKET_HEADER_LENGTH: usize = 1;

/// Framing byte marking an uncompressed payload under comp-lzo framing.
pub const DATA_PACKET_NO_COMPRESS: u8 = 0xfa;

/// Framing byte marking an uncompressed payload under compress framing.
pub const DATA_PACKET_NO_COMPRESS_SWAP: u8 = 0xfb;

/// Framing byte marking an LZO-compressed payload. Recognized on inbound
/// packets for interoperability; never produced by this crate.
pub const DATA_PACKET_LZO_COMPRESS: u8 = 0x66;

/// The fixed keepalive payload, compared byte-for-byte by upper layers.
///
/// This is the OpenVPN ping magic. It travels through the data path like
/// any other payload and must round-trip bit-exact.
pub const PING_DATA: [u8; 16] = [
    0x2a, 0x18, 0x7b, 0xf3, 0x64, 0x1e, 0xb4, 0xcb, 0x07, 0xed, 0x2d, 0x0a, 0x98, 0x1f, 0xc7,
    0x48,
];

/// Returns whether a decrypted payload is the keepalive magic.
pub fn is_ping(payload: &[u8]) -> bool {
    payload == PING_DATA
}
