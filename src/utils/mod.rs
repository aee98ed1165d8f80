//! # Utility Modules
//!
//! Supporting utilities for the data path.
//!
//! ## Components
//! - **Replay**: sliding-window packet-id replay detection

pub mod replay;

pub use replay::ReplayWindow;
