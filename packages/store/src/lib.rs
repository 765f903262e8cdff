#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Durable, append-only storage of parsed records.
//!
//! Every processed upload adds exactly one row to the master table. The
//! [`RecordStore`] trait hides where the table lives; [`CsvRecordStore`]
//! keeps it in a single CSV file that is rewritten atomically, and
//! [`InMemoryRecordStore`] keeps it in process memory.

pub mod csv_store;
pub mod table;

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use resume_ledger_record_models::ParsedRecord;

pub use csv_store::{CsvRecordStore, StoreConfig};
pub use table::MasterTable;

/// File name of the master CSV.
pub const DEFAULT_STORE_FILE: &str = "all_parsed_resumes.csv";

/// Returns the default master CSV location, `data/all_parsed_resumes.csv`
/// relative to the working directory.
#[must_use]
pub fn default_store_path() -> PathBuf {
    PathBuf::from("data").join(DEFAULT_STORE_FILE)
}

/// Errors from reading or writing the master table.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File-system operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The stored header does not match the current columns.
    #[error("Schema mismatch: expected columns {expected:?}, found {found:?}")]
    SchemaMismatch {
        /// Current column names.
        expected: Vec<String>,
        /// Column names found in the stored table.
        found: Vec<String>,
    },

    /// Another writer held the store lock for longer than the timeout.
    #[error(
        "Timed out after {waited:?} waiting for store lock {} held by {owner}; \
         delete the lock file if that process is no longer running",
        path.display()
    )]
    Locked {
        /// Lock file path.
        path: PathBuf,
        /// Holder recorded in the lock file, such as `pid 4242`.
        owner: String,
        /// How long acquisition was attempted.
        waited: Duration,
    },

    /// A writer panicked while holding the in-process lock.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// A failed [`RecordStore::append`].
///
/// When the failure happened while persisting, `table` holds the merged
/// table so the caller can still show or export it.
#[derive(Debug, thiserror::Error)]
#[error("Failed to append record: {source}")]
pub struct AppendError {
    /// What went wrong.
    pub source: StoreError,
    /// The merged table, if the failure came after the merge.
    pub table: Option<MasterTable>,
}

impl AppendError {
    #[must_use]
    pub const fn new(source: StoreError, table: Option<MasterTable>) -> Self {
        Self { source, table }
    }
}

impl From<StoreError> for AppendError {
    fn from(source: StoreError) -> Self {
        Self::new(source, None)
    }
}

/// Combines a previously stored table (if any) with one new record.
///
/// With no prior table the result has exactly one row; otherwise it is
/// the prior rows in order followed by `record`.
#[must_use]
pub fn merge(existing: Option<MasterTable>, record: ParsedRecord) -> MasterTable {
    let mut table = existing.unwrap_or_default();
    table.append(record);
    table
}

/// Persistent home of the master table.
pub trait RecordStore {
    /// Reads the stored table, or `None` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// * If the stored table cannot be read or does not match the schema
    fn load(&self) -> Result<Option<MasterTable>, StoreError>;

    /// Replaces the stored table with `table`, all or nothing.
    ///
    /// # Errors
    ///
    /// * If the table cannot be written
    fn persist(&self, table: &MasterTable) -> Result<(), StoreError>;

    /// Loads, merges `record`, and persists, returning the merged table.
    ///
    /// The default implementation takes no lock of its own; stores shared
    /// between writers override it to hold their writer guard throughout.
    ///
    /// # Errors
    ///
    /// * If loading fails; nothing is written
    /// * If persisting fails; the error carries the merged table
    fn append(&self, record: ParsedRecord) -> Result<MasterTable, AppendError> {
        load_merge_persist(self, record)
    }
}

/// The read-modify-write cycle shared by every [`RecordStore::append`].
fn load_merge_persist<S: RecordStore + ?Sized>(
    store: &S,
    record: ParsedRecord,
) -> Result<MasterTable, AppendError> {
    let existing = store.load()?;
    let table = merge(existing, record);
    match store.persist(&table) {
        Ok(()) => {
            log::debug!("Master table now has {} rows", table.len());
            Ok(table)
        }
        Err(e) => Err(AppendError::new(e, Some(table))),
    }
}

/// A [`RecordStore`] that lives only in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    table: Mutex<Option<MasterTable>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `table`.
    #[must_use]
    pub const fn with_table(table: MasterTable) -> Self {
        Self {
            table: Mutex::new(Some(table)),
        }
    }
}

impl RecordStore for InMemoryRecordStore {
    fn load(&self) -> Result<Option<MasterTable>, StoreError> {
        let table = self.table.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(table.clone())
    }

    fn persist(&self, table: &MasterTable) -> Result<(), StoreError> {
        let mut stored = self.table.lock().map_err(|_| StoreError::LockPoisoned)?;
        *stored = Some(table.clone());
        Ok(())
    }

    fn append(&self, record: ParsedRecord) -> Result<MasterTable, AppendError> {
        let mut stored = self.table.lock().map_err(|_| StoreError::LockPoisoned)?;
        let table = merge(stored.take(), record);
        *stored = Some(table.clone());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ParsedRecord {
        ParsedRecord {
            name: name.to_owned(),
            ..ParsedRecord::default()
        }
    }

    fn names(table: &MasterTable) -> Vec<&str> {
        table.rows().iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn merge_without_prior_table_has_one_row() {
        let table = merge(None, record("Ada"));
        assert_eq!(names(&table), vec!["Ada"]);
    }

    #[test]
    fn merge_appends_after_prior_rows() {
        let prior = merge(Some(merge(None, record("R1"))), record("R2"));
        let table = merge(Some(prior), record("R3"));
        assert_eq!(names(&table), vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn in_memory_store_appends_in_order() {
        let store = InMemoryRecordStore::new();
        assert!(store.load().unwrap().is_none());

        store.append(record("R1")).unwrap();
        let table = store.append(record("R2")).unwrap();

        assert_eq!(names(&table), vec!["R1", "R2"]);
        assert_eq!(store.load().unwrap(), Some(table));
    }

    #[test]
    fn in_memory_store_starts_from_given_table() {
        let store = InMemoryRecordStore::with_table(merge(None, record("Existing")));
        let table = store.append(record("New")).unwrap();
        assert_eq!(names(&table), vec!["Existing", "New"]);
    }

    /// Loads a fixed table and refuses every write.
    struct ReadOnlyStore(MasterTable);

    impl RecordStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<MasterTable>, StoreError> {
            Ok(Some(self.0.clone()))
        }

        fn persist(&self, _table: &MasterTable) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: PathBuf::from("read-only"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn failed_persist_returns_merged_table() {
        let store = ReadOnlyStore(merge(None, record("R1")));
        let err = store.append(record("R2")).unwrap_err();

        assert!(matches!(err.source, StoreError::Io { .. }));
        let table = err.table.expect("merged table");
        assert_eq!(names(&table), vec!["R1", "R2"]);
    }

    /// Fails to load.
    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn load(&self) -> Result<Option<MasterTable>, StoreError> {
            Err(StoreError::SchemaMismatch {
                expected: vec!["Name".to_owned()],
                found: vec!["Other".to_owned()],
            })
        }

        fn persist(&self, _table: &MasterTable) -> Result<(), StoreError> {
            panic!("persist must not run after a failed load");
        }
    }

    #[test]
    fn failed_load_writes_nothing() {
        let err = BrokenStore.append(record("R1")).unwrap_err();
        assert!(matches!(err.source, StoreError::SchemaMismatch { .. }));
        assert!(err.table.is_none());
    }

    #[test]
    fn default_path_uses_master_file_name() {
        assert!(default_store_path().ends_with("data/all_parsed_resumes.csv"));
    }

    #[test]
    fn io_error_names_the_path() {
        let err = StoreError::Io {
            path: PathBuf::from("data/all_parsed_resumes.csv"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("I/O error on data/all_parsed_resumes.csv: "));
    }
}
