//! Persisted Counter Store
//!
//! Durable integer key-value storage that survives process restarts:
//! - `MemoryCounterStore`: shared in-process map (clones see the same data)
//! - `JsonCounterStore`: JSON object file, written on `flush`

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

/// Counter store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable integer storage.
///
/// `store_int` may buffer; only `flush` guarantees the value survives a
/// restart. Implementations use interior mutability so one store can be
/// shared between sessions.
pub trait CounterStore: Send + Sync {
    /// Read a value, 0 if the key was never written
    fn load_int(&self, key: &str) -> StoreResult<i64>;

    /// Write a value
    fn store_int(&self, key: &str, value: i64) -> StoreResult<()>;

    /// Commit buffered writes
    fn flush(&self) -> StoreResult<()>;
}

impl<S: CounterStore + ?Sized> CounterStore for Arc<S> {
    fn load_int(&self, key: &str) -> StoreResult<i64> {
        (**self).load_int(key)
    }

    fn store_int(&self, key: &str, value: i64) -> StoreResult<()> {
        (**self).store_int(key, value)
    }

    fn flush(&self) -> StoreResult<()> {
        (**self).flush()
    }
}

/// Make an arbitrary identifier safe to embed in a store key.
pub fn sanitize_key(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' => '_',
            c if c.is_whitespace() => '_',
            _ => c,
        })
        .collect();

    if sanitized.is_empty() {
        "default".to_string()
    } else {
        sanitized
    }
}

// ============ Memory Store ============

/// In-process store.
///
/// Cloning yields a handle onto the same map, so dropping an engine and
/// building a new one from a clone behaves like a process restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounterStore {
    values: Arc<RwLock<HashMap<String, i64>>>,
    writes: Arc<AtomicU64>,
    flushes: Arc<AtomicU64>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key
    pub fn with_value(self, key: &str, value: i64) -> Self {
        self.values.write().insert(key.to_string(), value);
        self
    }

    /// Number of `store_int` calls so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Number of `flush` calls so far
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }
}

impl CounterStore for MemoryCounterStore {
    fn load_int(&self, key: &str) -> StoreResult<i64> {
        Ok(self.values.read().get(key).copied().unwrap_or(0))
    }

    fn store_int(&self, key: &str, value: i64) -> StoreResult<()> {
        self.values.write().insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn flush(&self) -> StoreResult<()> {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ============ JSON File Store ============

/// File-backed store holding a flat JSON object of integers.
///
/// Writes are buffered in memory and committed by `flush` through a temp
/// file + rename so a crash mid-write never leaves a truncated file behind.
#[derive(Debug)]
pub struct JsonCounterStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, i64>>,
    dirty: AtomicBool,
    /// Serializes flushes; they share one temp file
    flush_guard: Mutex<()>,
}

impl JsonCounterStore {
    /// Open (or lazily create) a store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or malformed file is
    /// reported as `Corrupt` instead of being silently replaced.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str::<BTreeMap<String, i64>>(&content).map_err(
                |e| StoreError::Corrupt {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                },
            )?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        log::debug!("Opened counter store {:?} ({} keys)", path, values.len());

        Ok(Self {
            path,
            values: RwLock::new(values),
            dirty: AtomicBool::new(false),
            flush_guard: Mutex::new(()),
        })
    }

    /// Open the store at the platform default location
    pub fn open_default() -> StoreResult<Self> {
        Self::open(Self::default_path())
    }

    /// Get default store file path
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("GachaForge")
            .join("counters.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Are there writes not yet flushed?
    pub fn has_pending_writes(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn write_file(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = {
            let values = self.values.read();
            serde_json::to_string_pretty(&*values)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?
        };

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CounterStore for JsonCounterStore {
    fn load_int(&self, key: &str) -> StoreResult<i64> {
        Ok(self.values.read().get(key).copied().unwrap_or(0))
    }

    fn store_int(&self, key: &str, value: i64) -> StoreResult<()> {
        self.values.write().insert(key.to_string(), value);
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    fn flush(&self) -> StoreResult<()> {
        let _guard = self.flush_guard.lock();

        // Cleared before the snapshot: a write racing this flush re-marks it
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        if let Err(e) = self.write_file() {
            self.dirty.store(true, Ordering::Release);
            return Err(e);
        }
        log::debug!("Flushed counter store {:?}", self.path);
        Ok(())
    }
}
