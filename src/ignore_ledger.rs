//! Persistent record of names a run must never treat as input.
//!
//! Every category folder produced by a sort run is written to a hidden file in the
//! sorted directory, so the next run leaves `txt/` or `2024-05-01/` alone instead of
//! filing it under `dirs/`.

use crate::error::{SortError, SortResult};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the ledger file kept inside the sorted directory.
pub const LEDGER_FILE_NAME: &str = ".file-sorter";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreLedger {
    names: BTreeSet<String>,
}

impl IgnoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the path of the ledger file for `directory`.
    pub fn file_path(directory: &Path) -> PathBuf {
        directory.join(LEDGER_FILE_NAME)
    }

    /// Loads the ledger of `directory`.
    ///
    /// A missing ledger file yields an empty ledger. Recorded names whose path no
    /// longer exists are dropped without error.
    pub fn load(directory: &Path) -> SortResult<Self> {
        let ledger_path = Self::file_path(directory);

        let content = match fs::read_to_string(&ledger_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(SortError::LedgerReadFailed {
                    path: ledger_path,
                    source: e,
                });
            }
        };

        let mut ledger = Self::new();
        for name in content.lines().filter(|line| !line.is_empty()) {
            match fs::symlink_metadata(directory.join(name)) {
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(name, "Dropping stale ignore entry");
                }
                _ => {
                    ledger.insert(name);
                }
            }
        }

        Ok(ledger)
    }

    /// Overwrites the ledger file of `directory` with one name per line.
    pub fn persist(&self, directory: &Path) -> SortResult<()> {
        let ledger_path = Self::file_path(directory);
        let content: String = self.names.iter().map(|name| format!("{}\n", name)).collect();

        fs::write(&ledger_path, content).map_err(|e| SortError::LedgerWriteFailed {
            path: ledger_path,
            source: e,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Adds `name`; returns false when it was already recorded.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
