//! Key/value backends for the session store.
//!
//! [`Storage`] is the seam between the typed [`SessionStore`](crate::SessionStore)
//! and wherever bytes actually live. Two backends ship with the crate:
//!
//! - [`FileStorage`] — a JSON file on disk. Survives process restarts.
//! - [`MemoryStorage`] — a map in memory. For tests and ephemeral clients.
//!
//! Writes go through [`Storage::apply`] as a batch, and a batch is applied
//! all-or-nothing. That is what makes logout atomic: token, user and the
//! auxiliary keys disappear in one step, and no reader can observe a
//! half-cleared session.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::StoreError;

/// A single mutation inside a write batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    /// Insert or overwrite `key` with `value`.
    Set(String, String),
    /// Remove `key`. Removing an absent key is a no-op.
    Remove(String),
}

impl StorageOp {
    pub fn set(key: &str, value: impl Into<String>) -> Self {
        Self::Set(key.to_owned(), value.into())
    }

    pub fn remove(key: &str) -> Self {
        Self::Remove(key.to_owned())
    }
}

/// A durable string-to-string map.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because one storage instance is shared (behind
/// an `Arc`) by the session state, the transport and the refresh task.
pub trait Storage: Send + Sync + 'static {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    /// Backend-specific; the bundled backends never fail on reads.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Applies every operation in `ops`, atomically.
    ///
    /// Either the whole batch becomes visible to subsequent `get` calls or
    /// none of it does.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the batch could not be persisted; the
    /// previous contents remain in place.
    fn apply(&self, ops: &[StorageOp]) -> Result<(), StoreError>;
}

fn apply_ops(map: &mut BTreeMap<String, String>, ops: &[StorageOp]) {
    for op in ops {
        match op {
            StorageOp::Set(key, value) => {
                map.insert(key.clone(), value.clone());
            }
            StorageOp::Remove(key) => {
                map.remove(key);
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock can't leave the map half-written:
    // batches are applied to a copy and swapped in whole.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-memory [`Storage`]. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn apply(&self, ops: &[StorageOp]) -> Result<(), StoreError> {
        apply_ops(&mut lock(&self.entries), ops);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// [`Storage`] backed by a single JSON object on disk.
///
/// The file is read once in [`open`](Self::open) and cached. Every batch
/// rewrites the whole file via write-to-temp + rename, so a crash mid-write
/// leaves either the old or the new contents, never a torn file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens (or prepares to create) the storage file at `path`.
    ///
    /// Missing parent directories are created. A missing file is an empty
    /// store. A file that isn't a JSON object of strings is logged and
    /// treated as empty; it gets replaced on the next write.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the directory can't be created or an
    /// existing file can't be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::io("creating storage directory", parent, e))?;
        }

        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(map) => map,
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "storage file is corrupt, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::io("reading storage file", &path, e)),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "storage opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// The file this storage persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|e| StoreError::Encode(sessionkit_protocol::ProtocolError::Encode(e)))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|e| StoreError::io("writing storage file", &tmp, e))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::io("replacing storage file", &self.path, e))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn apply(&self, ops: &[StorageOp]) -> Result<(), StoreError> {
        // Hold the lock across the disk write so concurrent batches are
        // serialized and the cache never runs ahead of the file.
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        apply_ops(&mut next, ops);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}
