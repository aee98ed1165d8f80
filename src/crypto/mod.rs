//! # Cryptographic Primitives
//!
//! The per-packet cryptographic transform behind the data path.
//!
//! ## Components
//! - **PacketCipher**: trait seam between the data path and the cipher
//! - **CryptoBox**: ChaCha20-Poly1305 AEAD bound to one key generation
//! - **SecureRandom**: entropy helpers for key-material generation
//!
//! ## Security
//! - AEAD nonces are derived from the packet id plus a per-direction
//!   implicit tail; packet-id uniqueness per (key, direction) is the
//!   caller's invariant
//! - Key material is zeroized on drop (zeroize crate)
//! - Verification failures are uniform: no error distinguishes a bad tag
//!   from a bad length

pub mod aead;
pub mod secure_random;

pub use aead::CryptoBox;
pub use secure_random::{secure_array, secure_bytes};

use crate::error::Result;

/// Cipher key length in bytes (ChaCha20-Poly1305).
pub const CIPHER_KEY_LENGTH: usize = 32;

/// HMAC key length in bytes. AEAD suites use it only as implicit-IV
/// material, matching how OpenVPN repurposes the negotiated HMAC key.
pub const HMAC_KEY_LENGTH: usize = 32;

/// Authentication tag length in bytes (Poly1305).
pub const TAG_LENGTH: usize = 16;

/// AEAD nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// Length of the implicit nonce tail appended to the packet id.
pub const NONCE_TAIL_LENGTH: usize = NONCE_LENGTH - crate::config::PACKET_ID_LENGTH;

/// One direction of a per-packet authenticated cipher.
///
/// Implemented by [`CryptoBox`]'s halves; the data path is generic over it
/// so tests can substitute instrumented fakes and alternative suites can
/// plug in without touching the framing logic.
pub trait PacketCipher {
    /// Bytes the cipher adds to a sealed payload (the tag).
    fn encryption_overhead(&self) -> usize;

    /// Seals `plaintext`, authenticating `aad` alongside it.
    ///
    /// Returns the full ciphertext-plus-tag or fails as a whole; partial
    /// output is never produced.
    fn seal(&self, packet_id: u32, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Verifies and opens `ciphertext`.
    ///
    /// Any verification failure yields the uniform
    /// [`Authentication`](crate::error::ProtocolError::Authentication)
    /// error and no plaintext bytes.
    fn open(&self, packet_id: u32, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;
}
