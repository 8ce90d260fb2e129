//! Shared wire types for the gifcast server.
//!
//! This crate provides Serde-serializable types for:
//! - Conversion scope identifiers
//! - The `/convert` response body
//! - WebSocket push message schemas

pub mod conversion;
pub mod ws;

// Re-export common types
pub use conversion::{ConversionId, ConversionIdError, ConvertResponse};
pub use ws::{WsMessage, WsMessageType};
