//! file-sorter - sort the files of a directory into category folders
//!
//! Entries are bucketed by lowercase extension or by modification day, moved into
//! `<directory>/<category>/` by concurrent workers, and name collisions are settled
//! by comparing content fingerprints. Category folders are remembered in a ledger
//! file so later runs leave them alone.

pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod fingerprint;
pub mod ignore_ledger;
pub mod logging;
pub mod output;
pub mod reconcile;

pub use config::{CompiledExclusions, ConfigError, SorterConfig};
pub use error::{SortError, SortResult};
pub use file_category::{Category, Classifier, Criterion, DateZone, Entry, ExclusionSet};
pub use file_organizer::FileOrganizer;
pub use fingerprint::{Fingerprint, fingerprint};
pub use ignore_ledger::{IgnoreLedger, LEDGER_FILE_NAME};
pub use reconcile::{Outcome, Placement, Reconciled, Reconciler};

pub use cli::{RunSummary, SortOptions, run_cli};
