//! Error types shared by every stage of a sort run.
//!
//! Almost every failure is fatal to the run: the orchestrator stops at the first
//! error and reports it. The two tolerated conditions (stale ledger names and
//! unreadable descendants while hashing a directory) never surface here.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("Invalid sort criteria '{value}': needs to be 'ext' or 'mod'")]
    InvalidCriterion { value: String },

    #[error("Directory does not exist: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Could not read directory {}: {source}", path.display())]
    DirectoryReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not read ignore file {}: {source}", path.display())]
    LedgerReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not write ignore file {}: {source}", path.display())]
    LedgerWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not resolve the running executable: {source}")]
    ExecutableUnavailable { source: std::io::Error },

    #[error("Could not create folder {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not inspect {}: {source}", path.display())]
    InspectFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not move {} to {}: {source}", path.display(), destination.display())]
    FileMoveFailure {
        path: PathBuf,
        destination: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not remove {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not hash {}: {source}", path.display())]
    FingerprintFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SortError {
    /// True for errors the user fixes by correcting input; these are always raised
    /// before anything on disk is touched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidCriterion { .. } | Self::DirectoryNotFound { .. } | Self::Config(_)
        )
    }
}

pub type SortResult<T> = Result<T, SortError>;
