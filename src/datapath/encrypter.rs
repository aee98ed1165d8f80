//! Send-side data path: plaintext assembly and packet encryption.

use crate::config::{PACKET_ID_LENGTH, PACKET_PEER_ID_DISABLED};
use crate::core::packet::{packet_header, packet_header_data_v2, PacketCode};
use crate::crypto::aead::AeadCipher;
use crate::crypto::PacketCipher;
use crate::datapath::{
    header_length, CompressionFraming, DataPathChannel, DataPathEncrypter,
};
use crate::error::Result;

/// Data-path encrypter over an AEAD cipher (or any [`PacketCipher`]).
///
/// Holds the channel's send-direction state: bound peer id and
/// compression framing. Emits DataV2 4-byte headers while a peer id is
/// bound, V1 1-byte headers otherwise.
pub struct AeadEncrypter<C: PacketCipher = AeadCipher> {
    cipher: C,
    peer_id: u32,
    framing: CompressionFraming,
}

impl AeadEncrypter {
    /// Wraps the send-direction cipher of a
    /// [`CryptoBox`](crate::crypto::CryptoBox).
    pub fn new(cipher: AeadCipher) -> Self {
        Self::from_cipher(cipher)
    }
}

impl<C: PacketCipher> AeadEncrypter<C> {
    /// Builds an encrypter over any packet cipher implementation.
    pub fn from_cipher(cipher: C) -> Self {
        Self {
            cipher,
            peer_id: PACKET_PEER_ID_DISABLED,
            framing: CompressionFraming::Disabled,
        }
    }

    fn write_prefix(&self, packet_id: u32, dest: &mut [u8]) -> usize {
        dest[..PACKET_ID_LENGTH].copy_from_slice(&packet_id.to_be_bytes());
        let mut offset = PACKET_ID_LENGTH;
        if let Some(marker) = self.framing.uncompressed_marker() {
            dest[offset] = marker;
            offset += 1;
        }
        offset
    }
}

impl<C: PacketCipher> DataPathChannel for AeadEncrypter<C> {
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

impl<C: PacketCipher> DataPathEncrypter for AeadEncrypter<C> {
    fn assemble_data_packet(&self, packet_id: u32, payload: &[u8], dest: &mut [u8]) -> usize {
        let length = PACKET_ID_LENGTH + self.framing.header_length() + payload.len();
        assert!(
            dest.len() >= length,
            "assembly buffer too small: {} < {length}",
            dest.len()
        );

        let offset = self.write_prefix(packet_id, dest);
        dest[offset..length].copy_from_slice(payload);
        length
    }

    fn assemble_data_packet_with<F>(
        &self,
        packet_id: u32,
        payload_length: usize,
        dest: &mut [u8],
        fill: F,
    ) -> usize
    where
        F: FnOnce(&mut [u8]),
    {
        let length = PACKET_ID_LENGTH + self.framing.header_length() + payload_length;
        assert!(
            dest.len() >= length,
            "assembly buffer too small: {} < {length}",
            dest.len()
        );

        let offset = self.write_prefix(packet_id, dest);
        fill(&mut dest[offset..length]);
        length
    }

    fn encrypted_data_packet(&self, key: u8, packet_id: u32, assembled: &[u8]) -> Result<Vec<u8>> {
        assert!(
            assembled.len() >= PACKET_ID_LENGTH,
            "assembled packet shorter than a packet id"
        );
        debug_assert_eq!(
            assembled[..PACKET_ID_LENGTH],
            packet_id.to_be_bytes(),
            "assembled packet id disagrees with argument"
        );

        let header: Vec<u8> = if self.peer_id == PACKET_PEER_ID_DISABLED {
            vec![packet_header(PacketCode::DataV1, key)]
        } else {
            packet_header_data_v2(key, self.peer_id).to_vec()
        };

        // AAD covers everything sent in clear: header and packet id.
        let mut aad = Vec::with_capacity(header.len() + PACKET_ID_LENGTH);
        aad.extend_from_slice(&header);
        aad.extend_from_slice(&assembled[..PACKET_ID_LENGTH]);

        let ciphertext = self
            .cipher
            .seal(packet_id, &aad, &assembled[PACKET_ID_LENGTH..])?;

        let mut packet = Vec::with_capacity(aad.len() + ciphertext.len());
        packet.extend_from_slice(&aad);
        packet.extend_from_slice(&ciphertext);
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CryptoBox, CIPHER_KEY_LENGTH, HMAC_KEY_LENGTH};

    fn encrypter() -> AeadEncrypter {
        let cipher_key = [0x42u8; CIPHER_KEY_LENGTH];
        let hmac_key = [0x24u8; HMAC_KEY_LENGTH];
        let cb = CryptoBox::new(&cipher_key, &cipher_key, &hmac_key, &hmac_key).unwrap();
        AeadEncrypter::new(cb.encrypter())
    }

    #[test]
    fn test_assemble_without_framing() {
        let enc = encrypter();
        let mut dest = vec![0u8; 64];
        let written = enc.assemble_data_packet(0x0102_0304, &[0xaa, 0xbb], &mut dest);
        assert_eq!(written, 6);
        assert_eq!(&dest[..6], &[0x01, 0x02, 0x03, 0x04, 0xaa, 0xbb]);
    }

    #[test]
    fn test_assemble_with_comp_lzo_framing() {
        let mut enc = encrypter();
        enc.set_compression_framing(CompressionFraming::CompLzo);
        let mut dest = vec![0u8; 64];
        let written = enc.assemble_data_packet(1, &[0xaa], &mut dest);
        assert_eq!(written, 6);
        assert_eq!(&dest[..6], &[0x00, 0x00, 0x00, 0x01, 0xfa, 0xaa]);
    }

    #[test]
    fn test_assemble_with_closure_fill() {
        let mut enc = encrypter();
        enc.set_compression_framing(CompressionFraming::Compress);
        let mut dest = vec![0u8; 64];
        let written = enc.assemble_data_packet_with(2, 3, &mut dest, |payload| {
            payload.copy_from_slice(&[0x07, 0x08, 0x09]);
        });
        assert_eq!(written, 8);
        assert_eq!(&dest[..8], &[0x00, 0x00, 0x00, 0x02, 0xfb, 0x07, 0x08, 0x09]);
    }

    #[test]
    #[should_panic(expected = "assembly buffer too small")]
    fn test_assemble_undersized_buffer_panics() {
        let enc = encrypter();
        let mut dest = vec![0u8; 4];
        enc.assemble_data_packet(1, &[0xaa, 0xbb], &mut dest);
    }

    #[test]
    fn test_encrypted_packet_uses_v1_header_without_peer() {
        let enc = encrypter();
        let mut dest = vec![0u8; 64];
        let length = enc.assemble_data_packet(5, b"hi", &mut dest);
        let packet = enc.encrypted_data_packet(3, 5, &dest[..length]).unwrap();

        // DataV1 (0x06) << 3 | key 3
        assert_eq!(packet[0], 0x33);
        assert_eq!(&packet[1..5], &5u32.to_be_bytes());
        assert_eq!(packet.len(), b"hi".len() + enc.overhead_length());
    }

    #[test]
    fn test_encrypted_packet_uses_v2_header_with_peer() {
        let mut enc = encrypter();
        enc.set_peer_id(0x00ab_cd);
        let mut dest = vec![0u8; 64];
        let length = enc.assemble_data_packet(5, b"hi", &mut dest);
        let packet = enc.encrypted_data_packet(3, 5, &dest[..length]).unwrap();

        assert_eq!(&packet[..4], &[0x4b, 0x00, 0xab, 0xcd]);
        assert_eq!(&packet[4..8], &5u32.to_be_bytes());
        assert_eq!(packet.len(), b"hi".len() + enc.overhead_length());
    }

    #[test]
    fn test_peer_id_masked_to_24_bits() {
        let mut enc = encrypter();
        enc.set_peer_id(0x6438_5837);
        assert_eq!(enc.peer_id(), 0x0038_5837);
    }

    #[test]
    fn test_overhead_length_components() {
        let mut enc = encrypter();
        assert_eq!(enc.overhead_length(), 1 + 4 + 16);

        enc.set_peer_id(0x1234);
        enc.set_compression_framing(CompressionFraming::CompLzo);
        assert_eq!(enc.overhead_length(), 4 + 4 + 1 + 16);
    }
}
