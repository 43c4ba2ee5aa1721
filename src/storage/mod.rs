//! Storage Engine Module
//!
//! This module provides the keyspace for Nedis: a single lock-guarded map
//! shared by every connection, a small lifecycle state machine, and the
//! snapshot hooks used at startup, on `SAVE` and at shutdown.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌──────────────────────────┐   ┌────────────────────────┐  │
//! │  │ RwLock<HashMap<K, Value>>│   │ RwLock<LifecycleState> │  │
//! │  └──────────────────────────┘   └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//!              ┌───────────────────────────┐
//!              │      dyn Snapshot         │
//!              │  (FileSnapshot / Memory)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use nedis::storage::{LifecycleState, MemorySnapshot, StorageEngine, Value};
//!
//! let engine = StorageEngine::open(Box::new(MemorySnapshot::new())).unwrap();
//! assert_eq!(engine.state(), LifecycleState::Running);
//!
//! engine.set("name".to_string(), Value::from("Ariz"));
//! assert_eq!(engine.get("name"), Some(Value::from("Ariz")));
//!
//! engine.shutdown().unwrap();
//! assert_eq!(engine.state(), LifecycleState::Shutdown);
//! ```

pub mod engine;
pub mod lifecycle;
pub mod pattern;
pub mod snapshot;
pub mod value;

// Re-export commonly used types
pub use engine::{StorageEngine, StorageStats};
pub use lifecycle::LifecycleState;
pub use snapshot::{FileSnapshot, Keyspace, MemorySnapshot, PersistenceError, Snapshot};
pub use value::Value;
