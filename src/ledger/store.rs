//! Persistence for the flat ledger list.
//!
//! Every mutation is read-all, modify in memory, write-all. There is no
//! locking and no conflict detection; the last writer wins.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::record::StoredRecord;
use crate::error::{PlanError, Result};

/// Storage contract injected into the reconciler
pub trait LedgerStore {
    /// Load every persisted element. Missing or unreadable data yields an empty list.
    fn load_all(&self) -> Vec<StoredRecord>;

    /// Replace the persisted list with `records`
    fn save_all(&self, records: &[StoredRecord]) -> Result<()>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for &S {
    fn load_all(&self) -> Vec<StoredRecord> {
        (**self).load_all()
    }

    fn save_all(&self, records: &[StoredRecord]) -> Result<()> {
        (**self).save_all(records)
    }
}

/// Ledger kept as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn load_all(&self) -> Vec<StoredRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger file yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not read ledger, treating as empty"
                );
                return Vec::new();
            }
        };

        parse_records(&content).unwrap_or_else(|| {
            warn!(path = %self.path.display(), "ledger is not a JSON list, treating as empty");
            Vec::new()
        })
    }

    fn save_all(&self, records: &[StoredRecord]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;

        // Write a sibling temp file, then rename over the ledger
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|source| {
                let _ = fs::remove_file(&tmp);
                PlanError::LedgerWrite {
                    path: self.path.clone(),
                    source,
                }
            })?;

        debug!(path = %self.path.display(), records = records.len(), "ledger saved");
        Ok(())
    }
}

fn parse_records(content: &str) -> Option<Vec<StoredRecord>> {
    if content.trim().is_empty() {
        return Some(Vec::new());
    }
    serde_json::from_str(content).ok()
}

/// In-process ledger, used by tests and by callers that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<Vec<StoredRecord>>,
    saves: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<StoredRecord>) -> Self {
        Self {
            records: RefCell::new(records),
            saves: RefCell::new(0),
        }
    }

    /// Number of `save_all` calls so far
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }

    pub fn snapshot(&self) -> Vec<StoredRecord> {
        self.records.borrow().clone()
    }
}

impl LedgerStore for MemoryStore {
    fn load_all(&self) -> Vec<StoredRecord> {
        self.records.borrow().clone()
    }

    fn save_all(&self, records: &[StoredRecord]) -> Result<()> {
        *self.records.borrow_mut() = records.to_vec();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
