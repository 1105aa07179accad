//! Streaming feed module
//!
//! This module provides:
//! - WebSocket client with auto-reconnection and exponential backoff
//! - Wire frame decoding into typed feed events

pub mod client;
pub mod events;

pub use client::*;
pub use events::*;
