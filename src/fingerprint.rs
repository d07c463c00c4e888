//! Content fingerprints used to tell a true duplicate from a name collision.
//!
//! A regular file is fingerprinted by the MD5 digest of its bytes. A directory is
//! fingerprinted by the MD5 digest of the bytes of every file below it, concatenated
//! in lexicographic path order.

use crate::error::{SortError, SortResult};
use md5::{Digest, Md5};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Lowercase hexadecimal MD5 digest of a file or directory tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_hasher(hasher: Md5) -> Self {
        Self(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the fingerprint of `path`.
///
/// Failing to open `path` itself is an error. Inside a directory, descendants that
/// cannot be walked, opened or read are skipped and the digest covers whatever was
/// readable.
pub fn fingerprint(path: &Path) -> SortResult<Fingerprint> {
    let metadata = fs::metadata(path).map_err(|e| SortError::FingerprintFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.is_dir() {
        directory_fingerprint(path)
    } else {
        file_fingerprint(path)
    }
}

fn file_fingerprint(path: &Path) -> SortResult<Fingerprint> {
    let fail = |e: io::Error| SortError::FingerprintFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = File::open(path).map_err(fail)?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher).map_err(fail)?;

    Ok(Fingerprint::from_hasher(hasher))
}

fn directory_fingerprint(path: &Path) -> SortResult<Fingerprint> {
    // The root must be listable; everything below it is best effort.
    fs::read_dir(path).map_err(|e| SortError::FingerprintFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Md5::new();
    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() || e.path_is_symlink())
    {
        let Ok(mut file) = File::open(entry.path()) else {
            tracing::debug!(path = %entry.path().display(), "Skipping unreadable file while hashing");
            continue;
        };
        if let Err(e) = io::copy(&mut file, &mut hasher) {
            tracing::debug!(path = %entry.path().display(), error = %e, "Partial read while hashing");
        }
    }

    Ok(Fingerprint::from_hasher(hasher))
}
