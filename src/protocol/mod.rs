//! Wire Protocol Implementation
//!
//! This module provides the value model and codec for the Redis-like
//! wire protocol spoken by Nedis.
//!
//! ## Modules
//!
//! - `types`: Defines the `RespValue` enum and serialization
//! - `parser`: Decoder for incoming frames, including the
//!   "value plus remainder" primitive used for streaming
//!
//! ## Example
//!
//! ```
//! use nedis::protocol::{decode, RespValue};
//! use bytes::Bytes;
//!
//! // Parsing incoming data
//! let request = decode(b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n").unwrap();
//! assert_eq!(request.into_array().map(|a| a.len()), Some(2));
//!
//! // Creating responses
//! let response = RespValue::bulk_string(Bytes::from("Ariz"));
//! assert_eq!(response.serialize(), b"$4\r\nAriz\r\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{decode, decode_with_remainder, parse_inline, ParseError, ParseResult, RespParser};
pub use types::RespValue;
