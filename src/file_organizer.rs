/// Concurrent execution of reconcile decisions.
///
/// Category folders are created up front, then every entry is reconciled on the
/// rayon pool. Entries do not coordinate: two workers racing for the same
/// destination name are settled by whoever renames first, the other one sees an
/// occupied destination and falls through to the fingerprint comparison.
use crate::error::{SortError, SortResult};
use crate::file_category::Entry;
use crate::reconcile::{Reconciled, Reconciler};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

pub struct FileOrganizer;

impl FileOrganizer {
    /// Creates `<directory>/<category>` once for each distinct category of `entries`.
    ///
    /// Existing folders are kept. New folders get mode 0755 on Unix.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use file_sorter::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let created = FileOrganizer::create_category_folders(Path::new("/path/to/base"), &[]);
    /// assert!(created.unwrap().is_empty());
    /// ```
    pub fn create_category_folders(
        directory: &Path,
        entries: &[Entry],
    ) -> SortResult<BTreeSet<PathBuf>> {
        let folders: BTreeSet<PathBuf> = entries
            .iter()
            .map(|entry| directory.join(entry.category.dir_name()))
            .collect();

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }

        for folder in &folders {
            builder
                .create(folder)
                .map_err(|e| SortError::DirectoryCreationFailed {
                    path: folder.clone(),
                    source: e,
                })?;
        }

        tracing::info!(count = folders.len(), "Category folders ready");
        Ok(folders)
    }

    /// Reconciles every entry in parallel and waits for all of them.
    ///
    /// The first failure stops further entries from being scheduled and is
    /// returned; moves that already happened stay in place.
    pub fn execute(entries: &[Entry], progress: &ProgressBar) -> SortResult<Vec<Reconciled>> {
        entries
            .par_iter()
            .map(|entry| {
                let reconciled = Reconciler::reconcile(entry);
                progress.inc(1);
                reconciled
            })
            .collect()
    }

    /// Plans every entry in parallel without touching the filesystem.
    pub fn plan_all(entries: &[Entry]) -> SortResult<Vec<Reconciled>> {
        entries
            .par_iter()
            .map(|entry| {
                Reconciler::plan(entry).map(|placement| Reconciled {
                    entry: entry.clone(),
                    placement,
                })
            })
            .collect()
    }
}
