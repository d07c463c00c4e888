/// Classification of directory entries into category folders.
///
/// An entry's category is the lowercase extension of its name, the literal `none`
/// for extensionless names, `dirs` for subdirectories, or the `YYYY-MM-DD`
/// modification date when sorting by date.
///
/// # Examples
///
/// ```
/// use file_sorter::file_category::Category;
///
/// assert_eq!(Category::from_extension("Photo.JPG").dir_name(), "jpg");
/// assert_eq!(Category::from_extension("archive.tar.gz").dir_name(), "gz");
/// assert_eq!(Category::from_extension("Makefile").dir_name(), "none");
/// ```
use crate::config::CompiledExclusions;
use crate::error::{SortError, SortResult};
use crate::fingerprint::Fingerprint;
use crate::ignore_ledger::{IgnoreLedger, LEDGER_FILE_NAME};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

/// How entries are bucketed into category folders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Criterion {
    /// By lowercase file extension (`ext`).
    #[default]
    Extension,
    /// By modification day (`mod`).
    Modified,
}

impl FromStr for Criterion {
    type Err = SortError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ext" => Ok(Criterion::Extension),
            "mod" => Ok(Criterion::Modified),
            other => Err(SortError::InvalidCriterion {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Extension => f.write_str("ext"),
            Criterion::Modified => f.write_str("mod"),
        }
    }
}

/// Clock used to turn a modification time into a calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateZone {
    #[default]
    Utc,
    Local,
}

/// Name of the folder every subdirectory is sorted into.
pub const DIRECTORY_CATEGORY: &str = "dirs";

/// Name of the folder for names without an extension.
pub const NO_EXTENSION_CATEGORY: &str = "none";

/// A category label, which is also the name of its folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    /// Category of a file name when sorting by extension.
    ///
    /// The extension is the text after the last dot, so `.bashrc` lands in
    /// `bashrc` and `notes.` lands in `none`. Bytes that are not valid UTF-8 are
    /// replaced in the label only.
    pub fn from_extension(name: impl AsRef<OsStr>) -> Self {
        let bytes = name.as_ref().as_encoded_bytes();
        let extension = bytes
            .iter()
            .rposition(|&b| b == b'.')
            .map(|dot| String::from_utf8_lossy(&bytes[dot + 1..]).to_lowercase())
            .unwrap_or_default();

        if extension.is_empty() {
            Self(NO_EXTENSION_CATEGORY.to_string())
        } else {
            Self(extension)
        }
    }

    /// Category of a modification time when sorting by date.
    pub fn from_modified(modified: SystemTime, zone: DateZone) -> Self {
        let day = match zone {
            DateZone::Utc => DateTime::<Utc>::from(modified).format("%Y-%m-%d").to_string(),
            DateZone::Local => DateTime::<Local>::from(modified)
                .format("%Y-%m-%d")
                .to_string(),
        };
        Self(day)
    }

    pub fn directories() -> Self {
        Self(DIRECTORY_CATEGORY.to_string())
    }

    /// Returns the folder name for this category.
    pub fn dir_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One item of a directory listing snapshot.
#[derive(Debug, Clone)]
pub struct ListingItem {
    pub name: OsString,
    pub is_dir: bool,
    pub modified: SystemTime,
}

/// Reads the immediate children of `directory`, sorted by name.
pub fn read_listing(directory: &Path) -> SortResult<Vec<ListingItem>> {
    let read_failed = |e| SortError::DirectoryReadFailed {
        path: directory.to_path_buf(),
        source: e,
    };

    let mut items = Vec::new();
    for entry in fs::read_dir(directory).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let metadata = entry.metadata().map_err(read_failed)?;
        items.push(ListingItem {
            name: entry.file_name(),
            is_dir: metadata.is_dir(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(items)
}

/// A classified entry of the directory being sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: OsString,
    pub category: Category,
    pub directory: PathBuf,
}

impl Entry {
    /// `<directory>/<name>`
    pub fn source_path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }

    /// `<directory>/<category>`
    pub fn category_path(&self) -> PathBuf {
        self.directory.join(self.category.dir_name())
    }

    /// `<directory>/<category>/<name>`
    pub fn destination_path(&self) -> PathBuf {
        self.category_path().join(&self.name)
    }

    /// `<directory>/<category>/<name>-<fingerprint>.<category>`, used when the plain
    /// destination holds different content.
    pub fn disambiguated_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        let mut file_name = self.name.clone();
        file_name.push(format!("-{}.{}", fingerprint, self.category));
        self.category_path().join(file_name)
    }
}

/// Names and paths the classifier must never hand to the move engine.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    names: HashSet<String>,
    paths: HashSet<PathBuf>,
    rules: CompiledExclusions,
}

impl ExclusionSet {
    /// Exclusions every run carries: the ledger file and the running executable.
    pub fn for_run(executable: Option<&Path>) -> Self {
        let mut exclusions = Self::default();
        exclusions.reserve_name(LEDGER_FILE_NAME);
        if let Some(path) = executable {
            exclusions.reserve_path(path);
        }
        exclusions
    }

    pub fn reserve_name(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    /// Reserves an absolute path. Stored canonicalized when the path resolves.
    pub fn reserve_path(&mut self, path: &Path) {
        self.paths.insert(canonical(path));
    }

    pub fn with_rules(mut self, rules: CompiledExclusions) -> Self {
        self.rules = rules;
        self
    }

    pub fn is_excluded(&self, directory: &Path, name: &OsStr) -> bool {
        let label = name.to_string_lossy();
        if self.names.contains(&*label) || self.rules.is_excluded(&label) {
            return true;
        }
        !self.paths.is_empty() && self.paths.contains(&canonical(&directory.join(name)))
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Assigns categories to a listing and records them in the ignore ledger.
#[derive(Debug, Clone)]
pub struct Classifier {
    criterion: Criterion,
    zone: DateZone,
    exclusions: ExclusionSet,
}

impl Classifier {
    pub fn new(criterion: Criterion, zone: DateZone, exclusions: ExclusionSet) -> Self {
        Self {
            criterion,
            zone,
            exclusions,
        }
    }

    /// Category of a single listing item. Directories are always `dirs`.
    pub fn category_of(&self, item: &ListingItem) -> Category {
        if item.is_dir {
            return Category::directories();
        }
        match self.criterion {
            Criterion::Extension => Category::from_extension(&item.name),
            Criterion::Modified => Category::from_modified(item.modified, self.zone),
        }
    }

    /// Classifies every item of `listing` that is neither in the ledger nor
    /// excluded, adding each produced category to `ledger`.
    ///
    /// An item whose name is a category produced by this same listing is the
    /// category folder itself and is skipped, whatever the listing order.
    pub fn classify(
        &self,
        directory: &Path,
        listing: &[ListingItem],
        ledger: &mut IgnoreLedger,
    ) -> Vec<Entry> {
        let candidates: Vec<(&ListingItem, Category)> = listing
            .iter()
            .filter(|item| {
                if item.name.to_str().is_some_and(|name| ledger.contains(name)) {
                    tracing::debug!(name = ?item.name, "Skipping previously sorted folder");
                    return false;
                }
                if self.exclusions.is_excluded(directory, &item.name) {
                    tracing::debug!(name = ?item.name, "Skipping excluded entry");
                    return false;
                }
                true
            })
            .map(|item| (item, self.category_of(item)))
            .collect();

        let produced: HashSet<&str> = candidates
            .iter()
            .map(|(_, category)| category.dir_name())
            .collect();

        let mut entries = Vec::new();
        for (item, category) in &candidates {
            if item.name.to_str().is_some_and(|name| produced.contains(name)) {
                tracing::debug!(name = ?item.name, "Skipping category folder");
                continue;
            }
            ledger.insert(category.dir_name());
            entries.push(Entry {
                name: item.name.clone(),
                category: category.clone(),
                directory: directory.to_path_buf(),
            });
        }

        entries
    }
}
