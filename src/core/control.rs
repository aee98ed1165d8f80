//! # Control-Channel Framing
//!
//! Serialization of the control-channel packets used during session
//! establishment, plus the per-session bookkeeping both peers keep for the
//! control direction (packet-id counters, pending acks, traffic counters).
//!
//! ## Wire Format
//! ```text
//! [code|key (1)]
//! [local session id (8)]
//! [ack count (1)] [acked packet ids (4 each, BE)]
//! [remote session id (8), present iff ack count > 0]
//! [packet id (4, BE)] [payload (N)]     -- omitted entirely for AckV1
//! ```
//!
//! The TLS ciphertext carried in `payload` is opaque here; handshake
//! orchestration lives outside this crate.

use crate::config::{PACKET_ID_LENGTH, SESSION_ID_LENGTH};
use crate::core::packet::{packet_header, packet_opcode, PacketCode, SessionId};
use crate::error::{ProtocolError, Result};
use std::collections::HashSet;

/// A parsed or to-be-serialized control-channel packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPacket {
    /// Packet opcode. [`PacketCode::AckV1`] packets carry acks only.
    pub code: PacketCode,
    /// Key id (0-7) of the negotiation this packet belongs to.
    pub key: u8,
    /// Sender's session id.
    pub session_id: SessionId,
    /// Control-channel sequence number. Ignored for `AckV1`.
    pub packet_id: u32,
    /// Opaque control payload (TLS records). Empty for `AckV1`.
    pub payload: Vec<u8>,
    /// Packet ids being acknowledged.
    pub ack_ids: Vec<u32>,
    /// Receiver's session id; required whenever `ack_ids` is non-empty.
    pub remote_session_id: Option<SessionId>,
}

impl ControlPacket {
    /// Builds a payload-bearing control packet with no piggybacked acks.
    pub fn outgoing(
        code: PacketCode,
        key: u8,
        session_id: SessionId,
        packet_id: u32,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            code,
            key,
            session_id,
            packet_id,
            payload,
            ack_ids: Vec::new(),
            remote_session_id: None,
        }
    }

    /// Builds an `AckV1` packet acknowledging `ack_ids`.
    pub fn ack(
        key: u8,
        session_id: SessionId,
        ack_ids: Vec<u32>,
        remote_session_id: SessionId,
    ) -> Self {
        Self {
            code: PacketCode::AckV1,
            key,
            session_id,
            packet_id: 0,
            payload: Vec::new(),
            ack_ids,
            remote_session_id: Some(remote_session_id),
        }
    }

    /// Serialized length in bytes.
    pub fn serialized_length(&self) -> usize {
        let mut length = 1 + SESSION_ID_LENGTH + 1 + PACKET_ID_LENGTH * self.ack_ids.len();
        if !self.ack_ids.is_empty() {
            length += SESSION_ID_LENGTH;
        }
        if self.code != PacketCode::AckV1 {
            length += PACKET_ID_LENGTH + self.payload.len();
        }
        length
    }

    /// Serializes into the control-channel wire format.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedControlPacket`] when more than 255 acks are
    /// attached or a non-empty ack list lacks the remote session id.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        if self.ack_ids.len() > u8::MAX as usize {
            return Err(ProtocolError::MalformedControlPacket("too many ack ids"));
        }

        let mut raw = Vec::with_capacity(self.serialized_length());
        raw.push(packet_header(self.code, self.key));
        raw.extend_from_slice(&self.session_id);
        raw.push(self.ack_ids.len() as u8);
        for ack_id in &self.ack_ids {
            raw.extend_from_slice(&ack_id.to_be_bytes());
        }
        if !self.ack_ids.is_empty() {
            let remote = self
                .remote_session_id
                .ok_or(ProtocolError::MalformedControlPacket(
                    "acks without remote session id",
                ))?;
            raw.extend_from_slice(&remote);
        }
        if self.code != PacketCode::AckV1 {
            raw.extend_from_slice(&self.packet_id.to_be_bytes());
            raw.extend_from_slice(&self.payload);
        }
        Ok(raw)
    }

    /// Parses a control packet, validating every length field.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedControlPacket`] on any truncation or on an
    /// opcode this implementation does not speak.
    pub fn deserialize(raw: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(raw);

        let (code, key) = packet_opcode(cursor.take_byte("header")?);
        if code == PacketCode::Unknown || code == PacketCode::DataV1 || code == PacketCode::DataV2 {
            return Err(ProtocolError::MalformedControlPacket("not a control opcode"));
        }

        let session_id: SessionId = cursor.take_array("session id")?;
        let ack_count = cursor.take_byte("ack count")? as usize;
        let mut ack_ids = Vec::with_capacity(ack_count);
        for _ in 0..ack_count {
            ack_ids.push(u32::from_be_bytes(cursor.take_array("ack id")?));
        }
        let remote_session_id = if ack_count > 0 {
            Some(cursor.take_array("remote session id")?)
        } else {
            None
        };

        let (packet_id, payload) = if code == PacketCode::AckV1 {
            cursor.expect_end("trailing bytes after acks")?;
            (0, Vec::new())
        } else {
            let packet_id = u32::from_be_bytes(cursor.take_array("packet id")?);
            (packet_id, cursor.take_rest().to_vec())
        };

        Ok(Self {
            code,
            key,
            session_id,
            packet_id,
            payload,
            ack_ids,
            remote_session_id,
        })
    }
}

/// Bounded reader over an untrusted control packet.
struct Cursor<'a> {
    raw: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(raw: &'a [u8]) -> Self {
        Self { raw, offset: 0 }
    }

    fn take_byte(&mut self, what: &'static str) -> Result<u8> {
        let byte = *self
            .raw
            .get(self.offset)
            .ok_or(ProtocolError::MalformedControlPacket(what))?;
        self.offset += 1;
        Ok(byte)
    }

    fn take_array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let bytes = self
            .raw
            .get(self.offset..self.offset + N)
            .ok_or(ProtocolError::MalformedControlPacket(what))?;
        self.offset += N;
        bytes
            .try_into()
            .map_err(|_| ProtocolError::MalformedControlPacket(what))
    }

    fn take_rest(&mut self) -> &'a [u8] {
        let rest = &self.raw[self.offset..];
        self.offset = self.raw.len();
        rest
    }

    fn expect_end(&self, what: &'static str) -> Result<()> {
        if self.offset == self.raw.len() {
            Ok(())
        } else {
            Err(ProtocolError::MalformedControlPacket(what))
        }
    }
}

/// A value tracked independently per direction, with a reset value.
#[derive(Debug, Clone)]
pub struct BidirectionalState<T: Clone> {
    /// Receive-direction value.
    pub inbound: T,
    /// Send-direction value.
    pub outbound: T,
    reset_value: T,
}

impl<T: Clone> BidirectionalState<T> {
    /// Creates a pair where both directions start at `reset_value`.
    pub fn new(reset_value: T) -> Self {
        Self {
            inbound: reset_value.clone(),
            outbound: reset_value.clone(),
            reset_value,
        }
    }

    /// Returns both directions to the reset value.
    pub fn reset(&mut self) {
        self.inbound = self.reset_value.clone();
        self.outbound = self.reset_value.clone();
    }

    /// `(inbound, outbound)` snapshot.
    pub fn pair(&self) -> (T, T) {
        (self.inbound.clone(), self.outbound.clone())
    }
}

/// Per-session control-channel bookkeeping.
///
/// Owns the control packet-id counters, the set of inbound packet ids still
/// awaiting an outgoing ack, and the data-channel traffic counters the
/// session uses for renegotiation thresholds.
#[derive(Debug)]
pub struct ControlChannel {
    packet_id: BidirectionalState<u32>,
    pending_acks: HashSet<u32>,
    data_count: BidirectionalState<u64>,
}

impl ControlChannel {
    /// Creates a channel with zeroed counters.
    pub fn new() -> Self {
        Self {
            packet_id: BidirectionalState::new(0),
            pending_acks: HashSet::new(),
            data_count: BidirectionalState::new(0),
        }
    }

    /// Assigns the next outbound control packet id.
    pub fn next_outbound_packet_id(&mut self) -> u32 {
        let packet_id = self.packet_id.outbound;
        self.packet_id.outbound = self.packet_id.outbound.wrapping_add(1);
        packet_id
    }

    /// Records the highest-seen inbound control packet id.
    pub fn note_inbound_packet_id(&mut self, packet_id: u32) {
        if packet_id >= self.packet_id.inbound {
            self.packet_id.inbound = packet_id.wrapping_add(1);
        }
    }

    /// Marks an inbound packet id as needing an ack.
    pub fn add_pending_ack(&mut self, packet_id: u32) {
        self.pending_acks.insert(packet_id);
    }

    /// Clears acks that have been sent.
    pub fn remove_pending_acks(&mut self, packet_ids: &[u32]) {
        for packet_id in packet_ids {
            self.pending_acks.remove(packet_id);
        }
    }

    /// Whether any inbound packets still await an ack.
    pub fn has_pending_acks(&self) -> bool {
        !self.pending_acks.is_empty()
    }

    /// Drains the pending-ack set for an outgoing `AckV1` packet.
    pub fn take_pending_acks(&mut self) -> Vec<u32> {
        self.pending_acks.drain().collect()
    }

    /// Adds to the received data-channel byte counter.
    pub fn add_received_data_count(&mut self, count: u64) {
        self.data_count.inbound += count;
    }

    /// Adds to the sent data-channel byte counter.
    pub fn add_sent_data_count(&mut self, count: u64) {
        self.data_count.outbound += count;
    }

    /// `(received, sent)` data-channel byte counters.
    pub fn current_data_count(&self) -> (u64, u64) {
        self.data_count.pair()
    }

    /// Resets all bookkeeping, e.g. across a hard reset.
    pub fn reset(&mut self) {
        self.packet_id.reset();
        self.pending_acks.clear();
        self.data_count.reset();
    }
}

impl Default for ControlChannel {
    fn default() -> Self {
        Self::new()
    }
}
