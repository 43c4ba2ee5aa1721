//! Snapshot Persistence
//!
//! A snapshot is a full copy of the keyspace. The engine loads one at startup
//! and writes one on shutdown (or on `SAVE`). Where the bytes go is decided by
//! the [`Snapshot`] implementation:
//!
//! - [`FileSnapshot`] - bincode on disk, written to `<path>.tmp` then renamed
//!   so a crash mid-write never leaves a torn file behind
//! - [`MemorySnapshot`] - keeps the last save in memory; used when
//!   persistence is disabled and in tests
//!
//! A missing snapshot is not an error: `load` returns `Ok(None)`.

use crate::storage::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The full key -> value mapping.
pub type Keyspace = HashMap<String, Value>;

/// Errors raised while saving or loading a snapshot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
}

/// Whole-dataset save/restore.
pub trait Snapshot: Send + Sync {
    /// Persists the entire keyspace, replacing any previous snapshot.
    fn save(&self, keyspace: &Keyspace) -> Result<(), PersistenceError>;

    /// Restores the last saved keyspace, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Keyspace>, PersistenceError>;
}

/// Snapshot stored in a single file.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn write_tmp(&self, tmp: &Path, keyspace: &Keyspace) -> Result<(), PersistenceError> {
        let file = File::create(tmp).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, keyspace).map_err(|source| {
            PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(|e| self.io_error(e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| self.io_error(e))
    }
}

impl Snapshot for FileSnapshot {
    fn save(&self, keyspace: &Keyspace) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        self.write_tmp(&tmp, keyspace)?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), keys = keyspace.len(), "Snapshot written");
        Ok(())
    }

    fn load(&self) -> Result<Option<Keyspace>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let keyspace = bincode::deserialize_from(BufReader::new(file)).map_err(|source| {
            PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(Some(keyspace))
    }
}

/// Snapshot kept in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshot {
    saved: Mutex<Option<Keyspace>>,
}

impl MemorySnapshot {
    /// An empty slot; the first `load` reports no snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-filled with `keyspace`.
    pub fn with_keyspace(keyspace: Keyspace) -> Self {
        Self {
            saved: Mutex::new(Some(keyspace)),
        }
    }

    /// The most recently saved keyspace.
    pub fn saved(&self) -> Option<Keyspace> {
        self.saved.lock().clone()
    }
}

impl Snapshot for MemorySnapshot {
    fn save(&self, keyspace: &Keyspace) -> Result<(), PersistenceError> {
        *self.saved.lock() = Some(keyspace.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Keyspace>, PersistenceError> {
        Ok(self.saved())
    }
}

impl<S: Snapshot + ?Sized> Snapshot for std::sync::Arc<S> {
    fn save(&self, keyspace: &Keyspace) -> Result<(), PersistenceError> {
        (**self).save(keyspace)
    }

    fn load(&self) -> Result<Option<Keyspace>, PersistenceError> {
        (**self).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn temp_path() -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("nedis_test_{}_{}.snapshot", std::process::id(), n))
    }

    fn sample() -> Keyspace {
        let mut keyspace = Keyspace::new();
        keyspace.insert("name".to_string(), Value::from("Ariz"));
        keyspace.insert("count".to_string(), Value::Int(42));
        keyspace.insert(
            "nested".to_string(),
            Value::List(vec![Value::Float(1.5), Value::Nil, Value::Bool(true)]),
        );
        keyspace
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let snapshot = FileSnapshot::new(temp_path());
        assert!(snapshot.load().unwrap().is_none());
    }

    #[test]
    fn test_file_save_and_load() {
        let path = temp_path();
        let snapshot = FileSnapshot::new(&path);

        snapshot.save(&sample()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let loaded = snapshot.load().unwrap().unwrap();
        assert_eq!(loaded, sample());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let path = temp_path();
        let snapshot = FileSnapshot::new(&path);

        snapshot.save(&sample()).unwrap();
        snapshot.save(&Keyspace::new()).unwrap();
        assert_eq!(snapshot.load().unwrap(), Some(Keyspace::new()));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path();
        fs::write(&path, b"\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();

        let err = FileSnapshot::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt { .. }));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_memory_snapshot() {
        let snapshot = MemorySnapshot::new();
        assert!(snapshot.load().unwrap().is_none());

        snapshot.save(&sample()).unwrap();
        assert_eq!(snapshot.load().unwrap(), Some(sample()));
    }
}
