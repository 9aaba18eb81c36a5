#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistent counter storage for the blast-fishing guarantee tracks.
//!
//! Counters live in memory first and on disk second. Every read is served
//! from the in-memory cache; every write updates the cache synchronously and
//! then makes a best-effort attempt to persist the whole document. Storage
//! faults are logged and absorbed: a failed write costs durability, never the
//! session's counts, and a store whose previous contents cannot be read keeps
//! new values in memory instead of overwriting what is on disk.

pub mod codec;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use blast_fishing_core::CounterStore;

/// Volatile counter store used by tests and hosts without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: Mutex<BTreeMap<String, i64>>,
}

impl MemoryCounterStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current counters out of the store.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, i64>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CounterStore for MemoryCounterStore {
    fn counter(&self, key: &str) -> i64 {
        self.lock().get(key).copied().unwrap_or(0)
    }

    fn set_counter(&self, key: &str, value: i64) {
        let _ = self.lock().insert(key.to_string(), value);
    }

    fn increment_counter(&self, key: &str) -> i64 {
        let mut counters = self.lock();
        let value = counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        *value
    }
}

/// File-backed counter store with an in-memory-first cache.
#[derive(Debug)]
pub struct FileCounterStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

#[derive(Debug)]
struct StoreState {
    counters: BTreeMap<String, i64>,
    // Disk holds data that could not be read; do not clobber it with a
    // partial document built from this session alone.
    recovery_needed: bool,
}

impl FileCounterStore {
    /// Opens the store backed by the document at `path`.
    ///
    /// A missing file starts the store empty. A corrupt document is logged
    /// and discarded, after which the next write replaces it. An unreadable
    /// file (I/O failure other than absence) also starts the store empty but
    /// suppresses disk writes until the document becomes readable again, so
    /// existing counts are never overwritten blind.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (counters, recovery_needed) = load_counters(&path);
        Self {
            path,
            state: Mutex::new(StoreState {
                counters,
                recovery_needed,
            }),
        }
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copies the current counters out of the store.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.lock().counters.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &mut StoreState) {
        if state.recovery_needed {
            match load_counters(&self.path) {
                (previous, false) => {
                    // Session values win over whatever was recovered.
                    for (key, value) in previous {
                        let _ = state.counters.entry(key).or_insert(value);
                    }
                    state.recovery_needed = false;
                }
                _ => {
                    log::warn!(
                        "counter_store: {} still unreadable, holding counters in memory only",
                        self.path.display()
                    );
                    return;
                }
            }
        }

        let document = codec::encode(&state.counters);
        if let Err(error) = atomic_write(&self.path, document.as_bytes()) {
            log::error!(
                "counter_store: failed to persist {}: {error}",
                self.path.display()
            );
        }
    }
}

impl CounterStore for FileCounterStore {
    fn counter(&self, key: &str) -> i64 {
        self.lock().counters.get(key).copied().unwrap_or(0)
    }

    fn set_counter(&self, key: &str, value: i64) {
        let mut state = self.lock();
        let _ = state.counters.insert(key.to_string(), value);
        self.persist(&mut state);
    }

    fn increment_counter(&self, key: &str) -> i64 {
        let mut state = self.lock();
        let value = state.counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        let next = *value;
        self.persist(&mut state);
        next
    }
}

fn load_counters(path: &Path) -> (BTreeMap<String, i64>, bool) {
    match fs::read_to_string(path) {
        Ok(document) => match codec::decode(&document) {
            Ok(counters) => (counters, false),
            Err(error) => {
                log::error!(
                    "counter_store: discarding corrupt document {}: {error}",
                    path.display()
                );
                (BTreeMap::new(), false)
            }
        },
        Err(error) if error.kind() == io::ErrorKind::NotFound => (BTreeMap::new(), false),
        Err(error) => {
            log::error!(
                "counter_store: cannot read {}: {error}",
                path.display()
            );
            (BTreeMap::new(), true)
        }
    }
}

/// Writes the document through a temp file and rename so a crash mid-write
/// leaves the previous document intact.
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    {
        let mut file = File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}
