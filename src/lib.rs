//! # openvpn-datapath
//!
//! OpenVPN-compatible data channel encryption and packet framing core.
//!
//! This crate is the data-path layer of a VPN tunnel: it turns plaintext
//! payload buffers into authenticated, encrypted wire packets and back,
//! and frames the control-channel packets used during session
//! establishment. Transport sockets, the TLS handshake, key negotiation
//! and tunnel devices are collaborators that live elsewhere.
//!
//! ## Wire Format
//! ```text
//! Data packet:
//!   [header (1 or 4)] [packet id (4, BE)] [ciphertext + tag (16)]
//!
//! V1 header:      (code << 3) | key
//! DataV2 header:  big-endian word, code+key in byte 0,
//!                 24-bit peer id in bytes 1-3 (0xFFFFFF = disabled)
//! ```
//!
//! ## Usage
//! ```no_run
//! use openvpn_datapath::crypto::CryptoBox;
//! use openvpn_datapath::datapath::{
//!     AeadDecrypter, AeadEncrypter, DataPathChannel, DataPathDecrypter, DataPathEncrypter,
//! };
//!
//! # fn main() -> openvpn_datapath::error::Result<()> {
//! # let (cipher_key, hmac_key) = ([0u8; 32], [0u8; 32]);
//! let cb = CryptoBox::new(&cipher_key, &cipher_key, &hmac_key, &hmac_key)?;
//! let enc = AeadEncrypter::new(cb.encrypter());
//! let dec = AeadDecrypter::new(cb.decrypter());
//!
//! let payload = b"ip packet bytes";
//! let packet_id = 1;
//! let mut assembled = vec![0u8; payload.len() + enc.overhead_length()];
//! let length = enc.assemble_data_packet(packet_id, payload, &mut assembled);
//! let wire = enc.encrypted_data_packet(0, packet_id, &assembled[..length])?;
//!
//! let mut decrypted = vec![0u8; wire.len()];
//! let out = dec.decrypt_data_packet(&wire, &mut decrypted)?;
//! assert_eq!(dec.parse_payload(&decrypted[..out.length]), payload);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//! - Per-packet AEAD (ChaCha20-Poly1305) with the packet id as nonce
//!   material; packet-id uniqueness per key and direction is the caller's
//!   invariant
//! - Inbound packets pass length and peer-id gates before any
//!   cryptographic work
//! - Key material is zeroized on drop; payloads and keys are never logged

#![deny(missing_docs)]

pub mod config;
pub mod core;
pub mod crypto;
pub mod datapath;
pub mod error;
pub mod utils;

pub use crate::config::{is_ping, PACKET_PEER_ID_DISABLED, PING_DATA};
pub use crate::core::packet::{PacketCode, SessionId};
pub use crate::crypto::CryptoBox;
pub use crate::datapath::{
    AeadDecrypter, AeadEncrypter, CompressionFraming, DataPathChannel, DataPathDecrypter,
    DataPathEncrypter, DecryptedPacket,
};
pub use crate::error::{ProtocolError, Result};
