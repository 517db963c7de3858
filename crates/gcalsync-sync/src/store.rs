//! Durable configuration and per-calendar state.
//!
//! [`ConfigStore`] holds operator and OAuth settings as JSON values under
//! dotted keys (`auth.client_id`, `calendars`, ...). Writes are staged in
//! memory until [`ConfigStore::save`].
//!
//! [`StateStore`] holds one [`DayCacheEntry`] per calendar id. Entries are
//! keyed by the raw calendar id, so ids containing separators cannot collide.
//!
//! Both come in an in-memory flavour for tests and a JSON-file flavour that
//! merges with what is on disk and writes through a temp file and rename.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::cache::DayCacheEntry;
use crate::error::{SyncError, SyncResult};

/// Key/value configuration storage.
pub trait ConfigStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stages `value` under `key`.
    fn set(&self, key: &str, value: Value);

    /// Persists staged values.
    fn save(&self) -> SyncResult<()>;
}

/// Per-calendar day cache storage.
pub trait StateStore: Send + Sync {
    /// Returns the entry for `calendar_id`.
    fn get(&self, calendar_id: &str) -> Option<DayCacheEntry>;

    /// Stores `entry`, replacing any entry for the same calendar.
    fn set(&self, entry: DayCacheEntry) -> SyncResult<()>;
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory [`ConfigStore`].
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<BTreeMap<String, Value>>,
    saves: RwLock<usize>,
}

impl MemoryConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to seed a value.
    pub fn with_value(self, key: impl Into<String>, value: Value) -> Self {
        write(&self.values).insert(key.into(), value);
        self
    }

    /// Returns how many times [`ConfigStore::save`] was called.
    pub fn save_count(&self) -> usize {
        *read(&self.saves)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        read(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        write(&self.values).insert(key.to_string(), value);
    }

    fn save(&self) -> SyncResult<()> {
        *write(&self.saves) += 1;
        Ok(())
    }
}

/// In-memory [`StateStore`].
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: RwLock<BTreeMap<String, DayCacheEntry>>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        read(&self.entries).is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, calendar_id: &str) -> Option<DayCacheEntry> {
        read(&self.entries).get(calendar_id).cloned()
    }

    fn set(&self, entry: DayCacheEntry) -> SyncResult<()> {
        write(&self.entries).insert(entry.calendar_id.clone(), entry);
        Ok(())
    }
}

/// [`ConfigStore`] backed by a JSON object file.
///
/// `save` re-reads the file and writes back only the keys set through this
/// handle, so concurrent processes saving different keys keep each other's
/// values. The file is owner-only on Unix since it holds the client secret
/// and tokens.
#[derive(Debug)]
pub struct JsonFileConfigStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, Value>>,
    staged: RwLock<BTreeSet<String>>,
}

impl JsonFileConfigStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> SyncResult<Self> {
        let path = path.into();
        let values = load_map(&path)?;
        Ok(Self {
            path,
            values: RwLock::new(values),
            staged: RwLock::new(BTreeSet::new()),
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        read(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut values = write(&self.values);
        write(&self.staged).insert(key.to_string());
        values.insert(key.to_string(), value);
    }

    fn save(&self) -> SyncResult<()> {
        let mut values = write(&self.values);
        let mut staged = write(&self.staged);

        let mut merged: BTreeMap<String, Value> = load_map(&self.path)?;
        for key in staged.iter() {
            if let Some(value) = values.get(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
        write_atomic(&self.path, &merged)?;

        *values = merged;
        staged.clear();
        Ok(())
    }
}

/// [`StateStore`] backed by a JSON object file keyed by calendar id.
///
/// Every `set` re-reads the file and replaces only its own calendar's entry.
#[derive(Debug)]
pub struct JsonFileStateStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, DayCacheEntry>>,
}

impl JsonFileStateStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> SyncResult<Self> {
        let path = path.into();
        let entries = load_map(&path)?;
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStateStore {
    fn get(&self, calendar_id: &str) -> Option<DayCacheEntry> {
        read(&self.entries).get(calendar_id).cloned()
    }

    fn set(&self, entry: DayCacheEntry) -> SyncResult<()> {
        let mut entries = write(&self.entries);
        let mut merged: BTreeMap<String, DayCacheEntry> = load_map(&self.path)?;
        merged.insert(entry.calendar_id.clone(), entry);
        write_atomic(&self.path, &merged)?;
        *entries = merged;
        Ok(())
    }
}

fn load_map<T: DeserializeOwned>(path: &Path) -> SyncResult<BTreeMap<String, T>> {
    if !path.exists() {
        debug!("no store file at {:?}", path);
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&content)
        .map_err(|e| SyncError::store(format!("failed to parse {}: {}", path.display(), e)))
}

/// Writes `value` as pretty JSON to `path` through a uniquely named temp
/// file in the same directory, then renames it into place.
///
/// The temp file is created owner-only on Unix and keeps that mode.
fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> SyncResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let content = serde_json::to_string_pretty(value)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!("saved {:?}", path);
    Ok(())
}
