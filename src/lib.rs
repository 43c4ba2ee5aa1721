//! # Nedis - A Minimal In-Memory Key-Value Server
//!
//! Nedis is a small key-value server that speaks the Redis wire protocol
//! (RESP2 and the RESP3 value types). It keeps its whole keyspace in memory
//! and saves a full snapshot at shutdown.
//!
//! ## Features
//!
//! - **Redis-Compatible Framing**: array requests, inline command lines,
//!   and all fourteen RESP type bytes
//! - **Pipelining**: several frames per read, or one frame across many
//! - **Snapshots**: the keyspace is restored at startup and saved on
//!   shutdown or `SAVE`
//! - **Async I/O**: Built on Tokio, one task per connection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               Nedis                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │                     ┌─────────────┐    ┌──────────────────────────────┐ │
//! │                     │    RESP     │    │        StorageEngine         │ │
//! │                     │   Codec     │    │  RwLock<keyspace> + state    │ │
//! │                     └─────────────┘    └──────────────┬───────────────┘ │
//! │                                                       │                 │
//! │                                                       ▼                 │
//! │                                          ┌────────────────────────┐     │
//! │                                          │     dyn Snapshot       │     │
//! │                                          └────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use nedis::commands::CommandHandler;
//! use nedis::protocol::RespValue;
//! use nedis::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let handler = CommandHandler::new(Arc::new(StorageEngine::new()));
//!
//! let reply = handler.process(b"*3\r\n$3\r\nSET\r\n$4\r\nname\r\n$4\r\nAriz\r\n");
//! assert_eq!(reply, RespValue::ok());
//!
//! let reply = handler.process(b"GET name");
//! assert_eq!(reply.serialize(), b"$4\r\nAriz\r\n");
//! ```
//!
//! ## Supported Commands
//!
//! - `SET key value`
//! - `GET key`
//! - `DEL key [key ...]`
//! - `EXISTS key`
//! - `KEYS [pattern]`
//! - `FLUSH` / `FLUSHDB` / `FLUSHALL`
//! - `INFO [section]`
//! - `PING [message]`
//! - `DBSIZE`
//! - `SAVE`
//!
//! ## Module Overview
//!
//! - [`protocol`]: RESP value model, encoder and decoder
//! - [`storage`]: Keyspace, lifecycle state and snapshots
//! - [`commands`]: Alias table, operation registry and dispatch
//! - [`connection`]: Client connection management
//! - [`config`]: Command-line configuration
//!
//! ## Thread Safety
//!
//! Every connection task shares one `Arc<StorageEngine>`. The keyspace sits
//! behind a single `RwLock`, so each command is atomic with respect to the
//! others, and snapshot writes hold the read lock for their duration.

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{CommandError, CommandHandler};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{decode, decode_with_remainder, ParseError, RespValue};
pub use storage::{LifecycleState, StorageEngine, Value};

/// The default port Nedis listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host Nedis binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default snapshot file
pub const DEFAULT_SNAPSHOT_PATH: &str = "nedis.snapshot";

/// Version of Nedis
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
