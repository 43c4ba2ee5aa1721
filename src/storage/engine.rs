//! Thread-Safe Storage Engine
//!
//! This module implements the keyspace shared by every connection, together
//! with the lifecycle state machine and the snapshot hooks around it.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │                                                             │
//! │   state: RwLock<LifecycleState>                             │
//! │          commands read | transitions write                  │
//! │                                                             │
//! │   data:  RwLock<HashMap<String, Value>>                     │
//! │          many readers | one writer                          │
//! │                                                             │
//! │   snapshot: Box<dyn Snapshot>   (startup / SAVE / shutdown) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every keyspace operation takes the lock once and does a single in-memory
//! step, so each one is atomic with respect to the others. Snapshot writes
//! hold the read lock for their whole duration and never observe a torn
//! keyspace.
//!
//! Commands run inside [`StorageEngine::while_running`], which holds a read
//! guard on the lifecycle state for the whole operation. Shutdown takes the
//! write guard before it saves, so it waits for in-flight commands and every
//! acknowledged write reaches the final snapshot. Locks are always taken in
//! the order state, then data.
//!
//! ## Lifecycle
//!
//! `Starting` (load snapshot) -> `Running` -> `ShuttingDown` (save snapshot)
//! -> `Shutdown`. A second shutdown request is a no-op.

use crate::storage::pattern::glob_match;
use crate::storage::snapshot::{Keyspace, MemorySnapshot, PersistenceError, Snapshot};
use crate::storage::{LifecycleState, Value};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// The main storage engine for Nedis.
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// all client handler tasks. All operations are thread-safe.
///
/// # Example
///
/// ```
/// use nedis::storage::{StorageEngine, Value};
///
/// let engine = StorageEngine::new();
///
/// engine.set("name".to_string(), Value::from("Ariz"));
/// assert_eq!(engine.get("name"), Some(Value::from("Ariz")));
/// assert_eq!(engine.delete(&["name".to_string(), "other".to_string()]), 1);
/// ```
pub struct StorageEngine {
    /// The keyspace
    data: RwLock<Keyspace>,

    /// Lifecycle state; commands hold it shared, transitions exclusively
    state: RwLock<LifecycleState>,

    /// Where full-dataset snapshots are saved and loaded
    snapshot: Box<dyn Snapshot>,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total keys removed by DEL
    del_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("state", &*self.state.read_recursive())
            .field("keys", &self.data.read().len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an in-memory engine that is immediately `Running`.
    ///
    /// Snapshots go to a [`MemorySnapshot`] and are lost with the process.
    pub fn new() -> Self {
        let engine = Self::starting(Box::new(MemorySnapshot::new()));
        *engine.state.write() = LifecycleState::Running;
        engine
    }

    /// Opens an engine backed by `snapshot`.
    ///
    /// Runs `Starting -> Running`, restoring the last snapshot on the way.
    /// A missing snapshot starts an empty keyspace; any other load failure
    /// is returned and the engine is not created.
    pub fn open(snapshot: Box<dyn Snapshot>) -> Result<Self, PersistenceError> {
        let engine = Self::starting(snapshot);
        info!("Nedis is starting...");

        engine.load()?;

        *engine.state.write() = LifecycleState::Running;
        info!("Nedis is running");
        Ok(engine)
    }

    fn starting(snapshot: Box<dyn Snapshot>) -> Self {
        Self {
            data: RwLock::new(Keyspace::new()),
            state: RwLock::new(LifecycleState::Starting),
            snapshot,
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
        }
    }

    /// Replaces the keyspace with the saved snapshot, if there is one.
    fn load(&self) -> Result<(), PersistenceError> {
        let mut data = self.data.write();
        match self.snapshot.load()? {
            Some(keyspace) => {
                *data = keyspace;
                info!(keys = data.len(), "Snapshot loaded");
            }
            None => info!("No snapshot found, starting with an empty keyspace"),
        }
        Ok(())
    }

    /// Returns the current lifecycle state.
    ///
    /// Safe to call from inside [`while_running`](Self::while_running).
    pub fn state(&self) -> LifecycleState {
        *self.state.read_recursive()
    }

    /// Runs `op` only while the engine is `Running`.
    ///
    /// The state cannot change until `op` returns, so shutdown never
    /// overlaps a command. Outside `Running` the current state is returned
    /// and `op` is not called.
    pub fn while_running<T>(&self, op: impl FnOnce() -> T) -> Result<T, LifecycleState> {
        let state = self.state.read();
        if !state.accepts_commands() {
            return Err(*state);
        }
        Ok(op())
    }

    /// Writes the whole keyspace to the snapshot.
    ///
    /// Returns the number of keys written.
    pub fn dump(&self) -> Result<usize, PersistenceError> {
        let data = self.data.read();
        self.snapshot.save(&data)?;
        info!(keys = data.len(), "Keyspace saved");
        Ok(data.len())
    }

    /// Moves to `ShuttingDown`, writes the final snapshot, then `Shutdown`.
    ///
    /// Calling this again once shutdown has begun does nothing. The engine
    /// reaches `Shutdown` even when the snapshot fails; the error is handed
    /// back for the caller to report.
    ///
    /// Blocks until commands already inside `while_running` have finished.
    pub fn shutdown(&self) -> Result<(), PersistenceError> {
        let mut state = self.state.write();
        if *state >= LifecycleState::ShuttingDown {
            debug!(state = %*state, "Shutdown already requested");
            return Ok(());
        }

        *state = LifecycleState::ShuttingDown;
        info!("Shutdown requested, saving the final snapshot");

        let result = self.dump().map(|_| ());

        *state = LifecycleState::Shutdown;
        if result.is_ok() {
            info!("Nedis is now ready to exit");
        }
        result
    }

    /// Inserts or replaces `key`.
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set(&self, key: String, value: Value) -> bool {
        self.set_count.fetch_add(1, Ordering::Relaxed);
        self.data.write().insert(key, value).is_none()
    }

    /// Gets the value for a key.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        self.data.read().get(key).cloned()
    }

    /// Removes every listed key that is present.
    ///
    /// Returns the number of keys that were removed. A key listed twice is
    /// only counted once.
    pub fn delete(&self, keys: &[String]) -> u64 {
        let mut data = self.data.write();
        let deleted = keys.iter().filter(|k| data.remove(k.as_str()).is_some()).count() as u64;
        self.del_count.fetch_add(deleted, Ordering::Relaxed);
        deleted
    }

    /// Checks if a key exists.
    pub fn exists(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Returns a sorted copy of the keys, optionally filtered by a glob.
    pub fn keys(&self, pattern: Option<&str>) -> Vec<String> {
        let data = self.data.read();
        let mut keys: Vec<String> = data
            .keys()
            .filter(|k| pattern.map_or(true, |p| glob_match(p, k)))
            .cloned()
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Clears all data from the keyspace.
    pub fn flush(&self) {
        self.data.write().clear();
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the keyspace is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns database statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
        }
    }
}

/// Database statistics.
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// Number of keys
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total keys removed by DEL
    pub del_ops: u64,
}
