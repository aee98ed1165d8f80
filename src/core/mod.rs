//! # Core Protocol Components
//!
//! Packet header codec, control-channel framing, and stream codec.
//!
//! This module owns the bit-exact wire shapes of the protocol: the 1-byte
//! and 4-byte packet headers, the control packet layout, and the
//! length-prefixed framing used when control packets ride a byte stream.
//!
//! ## Components
//! - **Packet**: opcodes and header encode/decode
//! - **Control**: control packet serialization + session bookkeeping
//! - **Codec**: tokio codec for framing control packets over streams

pub mod codec;
pub mod control;
pub mod packet;
