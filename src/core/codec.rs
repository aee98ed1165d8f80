//! # Control Stream Codec
//!
//! Framing for control-channel packets carried over a reliable byte stream.
//! Datagram links carry one packet per datagram and do not use this codec;
//! stream links prefix every packet with its length:
//!
//! ```text
//! [length (2, BE)] [packet (length bytes)] [length (2, BE)] [packet] ...
//! ```
//!
//! Decoding is zero-copy: complete frames are split off the read buffer
//! without reallocation.

use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Length of the stream frame prefix.
const FRAME_PREFIX_LENGTH: usize = 2;

/// Tokio codec for the length-prefixed control packet stream.
#[derive(Debug, Default)]
pub struct ControlStreamCodec;

impl Decoder for ControlStreamCodec {
    type Item = Bytes;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if src.len() < FRAME_PREFIX_LENGTH {
            return Ok(None);
        }

        let packet_length = u16::from_be_bytes([src[0], src[1]]) as usize;
        if src.len() < FRAME_PREFIX_LENGTH + packet_length {
            // Incomplete frame; wait for more bytes without consuming.
            return Ok(None);
        }

        src.advance(FRAME_PREFIX_LENGTH);
        Ok(Some(src.split_to(packet_length).freeze()))
    }
}

impl Encoder<&[u8]> for ControlStreamCodec {
    type Error = ProtocolError;

    fn encode(&mut self, packet: &[u8], dst: &mut BytesMut) -> Result<()> {
        let length = u16::try_from(packet.len()).map_err(|_| {
            ProtocolError::MalformedControlPacket("packet exceeds stream frame limit")
        })?;

        dst.reserve(FRAME_PREFIX_LENGTH + packet.len());
        dst.put_u16(length);
        dst.put_slice(packet);
        Ok(())
    }
}

/// One-shot helper: frames a batch of packets into a single stream buffer.
pub fn stream_packets(packets: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut codec = ControlStreamCodec;
    let mut raw = BytesMut::new();
    for packet in packets {
        codec.encode(packet, &mut raw)?;
    }
    Ok(raw.to_vec())
}
