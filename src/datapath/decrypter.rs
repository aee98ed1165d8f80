//! Receive-side data path: validation, decryption and payload parsing.

use crate::config::{PACKET_ID_LENGTH, PACKET_PEER_ID_DISABLED};
use crate::core::packet::{data_v2_peer_id, packet_opcode, PacketCode};
use crate::crypto::aead::AeadCipher;
use crate::crypto::PacketCipher;
use crate::datapath::{
    header_length, CompressionFraming, DataPathChannel, DataPathDecrypter, DecryptedPacket,
};
use crate::error::{ProtocolError, Result};
use tracing::{debug, warn};

/// Data-path decrypter over an AEAD cipher (or any [`PacketCipher`]).
///
/// Carries the receive-direction channel state. Inbound packets are
/// untrusted: length and peer-id gates run before any cryptographic work
/// so malformed floods cost no cipher time.
pub struct AeadDecrypter<C: PacketCipher = AeadCipher> {
    cipher: C,
    peer_id: u32,
    framing: CompressionFraming,
}

impl AeadDecrypter {
    /// Wraps the receive-direction cipher of a
    /// [`CryptoBox`](crate::crypto::CryptoBox).
    pub fn new(cipher: AeadCipher) -> Self {
        Self::from_cipher(cipher)
    }
}

impl<C: PacketCipher> AeadDecrypter<C> {
    /// Builds a decrypter over any packet cipher implementation.
    pub fn from_cipher(cipher: C) -> Self {
        Self {
            cipher,
            peer_id: PACKET_PEER_ID_DISABLED,
            framing: CompressionFraming::Disabled,
        }
    }
}

impl<C: PacketCipher> DataPathChannel for AeadDecrypter<C> {
    fn overhead_length(&self) -> usize {
        header_length(self.peer_id)
            + PACKET_ID_LENGTH
            + self.framing.header_length()
            + self.cipher.encryption_overhead()
    }

    fn peer_id(&self) -> u32 {
        self.peer_id
    }

    fn set_peer_id(&mut self, peer_id: u32) {
        self.peer_id = peer_id & 0x00ff_ffff;
    }

    fn compression_framing(&self) -> CompressionFraming {
        self.framing
    }

    fn set_compression_framing(&mut self, framing: CompressionFraming) {
        self.framing = framing;
    }
}

impl<C: PacketCipher> DataPathDecrypter for AeadDecrypter<C> {
    fn decrypt_data_packet(&self, packet: &[u8], dest: &mut [u8]) -> Result<DecryptedPacket> {
        let tag_length = self.cipher.encryption_overhead();

        // Cheapest gate first: no header byte, no packet.
        let Some(&first) = packet.first() else {
            return Err(ProtocolError::Overflow {
                length: 0,
                minimum: 1 + PACKET_ID_LENGTH + tag_length,
            });
        };

        let (code, _key) = packet_opcode(first);
        let header = if code == PacketCode::DataV2 { 4 } else { 1 };
        let minimum = header + PACKET_ID_LENGTH + tag_length;
        if packet.len() < minimum {
            debug!(length = packet.len(), minimum, "dropping short data packet");
            return Err(ProtocolError::Overflow {
                length: packet.len(),
                minimum,
            });
        }

        if code == PacketCode::DataV2 {
            // Length was gated above; a 4-byte read cannot fail here.
            let found = data_v2_peer_id(packet).ok_or(ProtocolError::Overflow {
                length: packet.len(),
                minimum,
            })?;
            if found != self.peer_id {
                warn!(
                    expected = self.peer_id,
                    found, "dropping data packet for foreign peer id"
                );
                return Err(ProtocolError::PeerIdMismatch {
                    expected: self.peer_id,
                    found,
                });
            }
        }

        let packet_id_bytes = &packet[header..header + PACKET_ID_LENGTH];
        let packet_id = u32::from_be_bytes(
            packet_id_bytes
                .try_into()
                .map_err(|_| ProtocolError::Authentication)?,
        );

        let aad = &packet[..header + PACKET_ID_LENGTH];
        let ciphertext = &packet[header + PACKET_ID_LENGTH..];
        let plaintext = self.cipher.open(packet_id, aad, ciphertext).map_err(|e| {
            debug!(length = packet.len(), "data packet failed authentication");
            e
        })?;

        let length = PACKET_ID_LENGTH + plaintext.len();
        let prefix = PACKET_ID_LENGTH + self.framing.header_length();
        if length < prefix {
            debug!(length, "decrypted packet shorter than its framing prefix");
            return Err(ProtocolError::Overflow {
                length,
                minimum: prefix,
            });
        }
        assert!(
            dest.len() >= length,
            "decrypt buffer too small: {} < {length}",
            dest.len()
        );
        dest[..PACKET_ID_LENGTH].copy_from_slice(packet_id_bytes);
        dest[PACKET_ID_LENGTH..length].copy_from_slice(&plaintext);

        Ok(DecryptedPacket { length, packet_id })
    }

    fn parse_payload<'a>(&self, decrypted: &'a [u8]) -> &'a [u8] {
        &decrypted[PACKET_ID_LENGTH + self.framing.header_length()..]
    }
}
