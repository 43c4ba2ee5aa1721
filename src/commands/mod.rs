//! Command Handler Module
//!
//! This module implements the command processing layer for Nedis.
//! It receives decoded requests, executes them against the storage engine,
//! and returns appropriate responses.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  RESP Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Alias        │
//! │  - Resolve      │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `SET`, `GET`, `DEL`, `EXISTS`, `KEYS`
//! - `FLUSH`, `FLUSHDB`, `FLUSHALL`
//! - `INFO`, `PING`, `DBSIZE`, `SAVE`

pub mod error;
pub mod handler;

// Re-export the main command handler
pub use error::CommandError;
pub use handler::{resolve, Call, CommandHandler, Operation};
