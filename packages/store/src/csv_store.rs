//! File-backed [`RecordStore`].
//!
//! The table lives in one CSV file. Every write goes to `<file>.tmp`, is
//! synced to disk, then renamed over the target, so readers see either the
//! old table or the new one. Appends are serialized by an in-process mutex
//! plus a `<file>.lock` file that other processes respect.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use resume_ledger_record_models::ParsedRecord;

use crate::{AppendError, MasterTable, RecordStore, StoreError, load_merge_persist};

/// Location and locking behaviour of a [`CsvRecordStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path of the master CSV.
    pub path: PathBuf,
    /// How long to wait for another writer's lock before giving up.
    pub lock_timeout: Duration,
    /// Pause between lock attempts.
    pub lock_retry_interval: Duration,
}

impl StoreConfig {
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
            lock_retry_interval: Self::DEFAULT_LOCK_RETRY_INTERVAL,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path of the temporary file used for atomic writes.
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".tmp")
    }

    /// Path of the cross-process writer lock.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".lock")
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Master table stored as a CSV file.
#[derive(Debug)]
pub struct CsvRecordStore {
    config: StoreConfig,
    writer: Mutex<()>,
}

impl CsvRecordStore {
    #[must_use]
    pub const fn new(config: StoreConfig) -> Self {
        Self {
            config,
            writer: Mutex::new(()),
        }
    }

    /// Creates a store at `path` with default locking.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(path))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn ensure_parent_dir(&self) -> Result<(), StoreError> {
        match self.config.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    fn write_temp(&self, tmp: &Path, table: &MasterTable) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: tmp.to_path_buf(),
            source,
        };

        let bytes = table.to_csv_bytes()?;
        let mut file = File::create(tmp).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        Ok(())
    }
}

impl RecordStore for CsvRecordStore {
    fn load(&self) -> Result<Option<MasterTable>, StoreError> {
        let path = &self.config.path;
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No master table at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.clone(),
                    source,
                });
            }
        };

        let len = file
            .metadata()
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?
            .len();
        if len == 0 {
            log::debug!("Master table at {} is empty", path.display());
            return Ok(None);
        }

        let table = MasterTable::read_csv(BufReader::new(file))?;
        log::debug!(
            "Loaded {} rows ({len} bytes) from {}",
            table.len(),
            path.display()
        );
        Ok(Some(table))
    }

    fn persist(&self, table: &MasterTable) -> Result<(), StoreError> {
        self.ensure_parent_dir()?;

        let tmp = self.config.temp_path();
        if let Err(e) = self.write_temp(&tmp, table) {
            std::fs::remove_file(&tmp).ok();
            return Err(e);
        }

        std::fs::rename(&tmp, &self.config.path).map_err(|source| {
            std::fs::remove_file(&tmp).ok();
            StoreError::Io {
                path: self.config.path.clone(),
                source,
            }
        })?;

        log::info!(
            "Persisted {} rows to {}",
            table.len(),
            self.config.path.display()
        );
        Ok(())
    }

    fn append(&self, record: ParsedRecord) -> Result<MasterTable, AppendError> {
        let _guard = self
            .writer
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;
        self.ensure_parent_dir()?;
        let _lock = LockFile::acquire(
            self.config.lock_path(),
            self.config.lock_timeout,
            self.config.lock_retry_interval,
        )?;

        load_merge_persist(self, record)
    }
}

/// Exclusive cross-process lock, held while the file exists.
#[derive(Debug)]
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(path: PathBuf, timeout: Duration, retry: Duration) -> Result<Self, StoreError> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    // Owner pid, for humans inspecting a stale lock.
                    if let Err(e) = writeln!(file, "{}", std::process::id()) {
                        log::debug!("Failed to record pid in {}: {e}", path.display());
                    }
                    log::debug!("Acquired store lock {}", path.display());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        log::warn!(
                            "Gave up waiting for store lock {} after {waited:?}",
                            path.display()
                        );
                        let owner = lock_owner(&path);
                        return Err(StoreError::Locked {
                            path,
                            owner,
                            waited,
                        });
                    }
                    std::thread::sleep(retry);
                }
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
    }
}

/// Reads the holder recorded in a lock file.
fn lock_owner(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => format!("pid {}", contents.trim()),
        Ok(_) => "an unknown process".to_owned(),
        Err(e) => {
            log::debug!("Failed to read lock owner from {}: {e}", path.display());
            "an unknown process".to_owned()
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("Failed to release store lock {}: {e}", self.path.display());
        }
    }
}
