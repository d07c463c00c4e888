//! Per-entry placement decisions.
//!
//! For every classified entry the reconciler looks at its destination and picks one
//! of four placements:
//!
//! | Destination state                          | Placement           | Outcome              |
//! |--------------------------------------------|---------------------|----------------------|
//! | absent                                     | `Move`              | `Moved`              |
//! | present, same fingerprint                  | `Duplicate`         | `Deduplicated`       |
//! | present, different, suffixed name free     | `Disambiguate`      | `MovedDisambiguated` |
//! | present, different, suffixed name taken    | `RepeatedDuplicate` | `Deduplicated`       |
//!
//! A taken fingerprint-suffixed name is assumed to hold the same content and is not
//! hashed again.
//!
//! Planning only reads the filesystem, so dry runs share it with real runs.

use crate::error::{SortError, SortResult};
use crate::file_category::Entry;
use crate::fingerprint::{Fingerprint, fingerprint};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What will happen to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Rename into the free destination.
    Move { destination: PathBuf },
    /// Destination holds identical content; remove the source.
    Duplicate { existing: PathBuf },
    /// Destination holds different content; rename to the fingerprint-suffixed path.
    Disambiguate {
        destination: PathBuf,
        fingerprint: Fingerprint,
    },
    /// The fingerprint-suffixed path is taken as well; remove the source.
    RepeatedDuplicate { existing: PathBuf },
}

impl Placement {
    pub fn outcome(&self) -> Outcome {
        match self {
            Placement::Move { .. } => Outcome::Moved,
            Placement::Duplicate { .. } | Placement::RepeatedDuplicate { .. } => {
                Outcome::Deduplicated
            }
            Placement::Disambiguate { .. } => Outcome::MovedDisambiguated,
        }
    }

    /// Path the entry's content lives at once the placement is applied.
    pub fn target(&self) -> &Path {
        match self {
            Placement::Move { destination } | Placement::Disambiguate { destination, .. } => {
                destination
            }
            Placement::Duplicate { existing } | Placement::RepeatedDuplicate { existing } => {
                existing
            }
        }
    }
}

/// Terminal state of a reconciled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Moved,
    Deduplicated,
    MovedDisambiguated,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Moved => f.write_str("moved"),
            Outcome::Deduplicated => f.write_str("deduplicated"),
            Outcome::MovedDisambiguated => f.write_str("moved (renamed)"),
        }
    }
}

/// An entry together with the placement chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub entry: Entry,
    pub placement: Placement,
}

impl Reconciled {
    pub fn outcome(&self) -> Outcome {
        self.placement.outcome()
    }
}

pub struct Reconciler;

impl Reconciler {
    /// Decides the placement of `entry` without changing anything on disk.
    pub fn plan(entry: &Entry) -> SortResult<Placement> {
        let destination = entry.destination_path();
        if !exists(&destination)? {
            return Ok(Placement::Move { destination });
        }

        let source_fingerprint = fingerprint(&entry.source_path())?;
        let existing_fingerprint = fingerprint(&destination)?;
        if source_fingerprint == existing_fingerprint {
            return Ok(Placement::Duplicate {
                existing: destination,
            });
        }

        let disambiguated = entry.disambiguated_path(&source_fingerprint);
        if exists(&disambiguated)? {
            Ok(Placement::RepeatedDuplicate {
                existing: disambiguated,
            })
        } else {
            Ok(Placement::Disambiguate {
                destination: disambiguated,
                fingerprint: source_fingerprint,
            })
        }
    }

    /// Carries out `placement` for `entry`.
    pub fn apply(entry: &Entry, placement: &Placement) -> SortResult<Outcome> {
        let source = entry.source_path();
        match placement {
            Placement::Move { destination } | Placement::Disambiguate { destination, .. } => {
                fs::rename(&source, destination).map_err(|e| SortError::FileMoveFailure {
                    path: source.clone(),
                    destination: destination.clone(),
                    source: e,
                })?;
            }
            Placement::Duplicate { .. } | Placement::RepeatedDuplicate { .. } => {
                remove(&source)?;
            }
        }

        tracing::debug!(
            name = ?entry.name,
            category = %entry.category,
            outcome = %placement.outcome(),
            target = %placement.target().display(),
            "Reconciled entry"
        );
        Ok(placement.outcome())
    }

    /// Plans and applies the placement of `entry`.
    pub fn reconcile(entry: &Entry) -> SortResult<Reconciled> {
        let placement = Self::plan(entry)?;
        Self::apply(entry, &placement)?;
        Ok(Reconciled {
            entry: entry.clone(),
            placement,
        })
    }
}

fn exists(path: &Path) -> SortResult<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SortError::InspectFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn remove(path: &Path) -> SortResult<()> {
    let fail = |e| SortError::RemoveFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let metadata = fs::symlink_metadata(path).map_err(fail)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(fail)
    } else {
        fs::remove_file(path).map_err(fail)
    }
}
