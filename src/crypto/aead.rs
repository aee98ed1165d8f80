//! ChaCha20-Poly1305 AEAD bound to one negotiated key generation.
//!
//! A [`CryptoBox`] holds the four key blocks a negotiation produces
//! (cipher and HMAC keys for each direction) and hands out one
//! [`AeadCipher`] per direction. With an AEAD suite the HMAC keys carry no
//! MAC of their own; their leading bytes become the implicit nonce tail,
//! as OpenVPN derives AEAD implicit IVs from the negotiated HMAC key.
//!
//! ## Nonce Construction
//! ```text
//! nonce (12 bytes) = packet id (4 bytes, BE) || implicit tail (8 bytes)
//! ```
//!
//! The packet id travels in clear ahead of the ciphertext, so the receiver
//! can rebuild the nonce before opening. Uniqueness of the packet id per
//! (key, direction) is the session layer's invariant; reuse is a
//! catastrophic failure for this construction.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{
    PacketCipher, CIPHER_KEY_LENGTH, HMAC_KEY_LENGTH, NONCE_LENGTH, NONCE_TAIL_LENGTH, TAG_LENGTH,
};
use crate::error::{ProtocolError, Result};

/// Implicit nonce material, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct NonceTail([u8; NONCE_TAIL_LENGTH]);

/// One direction of the negotiated AEAD.
///
/// The underlying cipher state zeroizes its key schedule on drop.
#[derive(Clone)]
pub struct AeadCipher {
    cipher: ChaCha20Poly1305,
    nonce_tail: NonceTail,
}

impl AeadCipher {
    fn new(cipher_key: &[u8], hmac_key: &[u8]) -> Result<Self> {
        if cipher_key.len() != CIPHER_KEY_LENGTH {
            return Err(ProtocolError::Algorithm(format!(
                "cipher key must be {CIPHER_KEY_LENGTH} bytes, got {}",
                cipher_key.len()
            )));
        }
        if hmac_key.len() != HMAC_KEY_LENGTH {
            return Err(ProtocolError::Algorithm(format!(
                "hmac key must be {HMAC_KEY_LENGTH} bytes, got {}",
                hmac_key.len()
            )));
        }

        let cipher = ChaCha20Poly1305::new_from_slice(cipher_key)
            .map_err(|_| ProtocolError::Algorithm("unusable cipher key".into()))?;

        let mut tail = [0u8; NONCE_TAIL_LENGTH];
        tail.copy_from_slice(&hmac_key[..NONCE_TAIL_LENGTH]);

        Ok(Self {
            cipher,
            nonce_tail: NonceTail(tail),
        })
    }

    fn make_nonce(&self, packet_id: u32) -> Nonce {
        let mut nonce = [0u8; NONCE_LENGTH];
        nonce[..4].copy_from_slice(&packet_id.to_be_bytes());
        nonce[4..].copy_from_slice(&self.nonce_tail.0);
        Nonce::from(nonce)
    }
}

impl PacketCipher for AeadCipher {
    fn encryption_overhead(&self) -> usize {
        TAG_LENGTH
    }

    fn seal(&self, packet_id: u32, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = self.make_nonce(packet_id);
        self.cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| ProtocolError::Encryption)
    }

    fn open(&self, packet_id: u32, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        // The aead API reports all failures through one opaque error;
        // keep that uniformity in the typed outcome.
        let nonce = self.make_nonce(packet_id);
        self.cipher
            .decrypt(
                &nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| ProtocolError::Authentication)
    }
}

/// Key material and cipher state for one key generation of a channel.
///
/// Created when a negotiation completes, used for any number of packets,
/// and dropped (zeroizing its keys) when the key id rotates. Multiple
/// boxes may be alive at once during rollover; the session layer sequences
/// which key id is current.
pub struct CryptoBox {
    enc: AeadCipher,
    dec: AeadCipher,
}

impl CryptoBox {
    /// Configures both directions from the negotiated key blocks.
    ///
    /// # Errors
    /// [`ProtocolError::Algorithm`] when any key block has the wrong
    /// length.
    pub fn new(
        cipher_enc_key: &[u8],
        cipher_dec_key: &[u8],
        hmac_enc_key: &[u8],
        hmac_dec_key: &[u8],
    ) -> Result<Self> {
        Ok(Self {
            enc: AeadCipher::new(cipher_enc_key, hmac_enc_key)?,
            dec: AeadCipher::new(cipher_dec_key, hmac_dec_key)?,
        })
    }

    /// The send-direction cipher.
    pub fn encrypter(&self) -> AeadCipher {
        self.enc.clone()
    }

    /// The receive-direction cipher.
    pub fn decrypter(&self) -> AeadCipher {
        self.dec.clone()
    }
}
