//! Connection Handler Module
//!
//! The transport side of Nedis. `main.rs` accepts sockets and spawns one
//! task per client; each task owns a read buffer and turns the byte stream
//! into frames for the [`CommandHandler`](crate::commands::CommandHandler).
//!
//! ```text
//!   TcpListener::accept()
//!          │ spawn
//!          ▼
//!   ConnectionHandler ── read ──> BytesMut ── split ──> Frame
//!          ▲                                              │
//!          └──────────── write reply <── CommandHandler <─┘
//! ```
//!
//! Replies go out in request order, one per frame. Shared counters live in
//! [`ConnectionStats`].
//!
//! ## Example
//!
//! ```ignore
//! use nedis::connection::{handle_connection, ConnectionStats};
//! use nedis::commands::CommandHandler;
//! use nedis::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(StorageEngine::new());
//! let stats = Arc::new(ConnectionStats::new());
//!
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, CommandHandler::new(storage), stats));
//! ```

pub mod handler;

pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
