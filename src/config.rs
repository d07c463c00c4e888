//! Sort defaults and exclusion rules loaded from a TOML file.
//!
//! # Configuration File Format
//!
//! ```toml
//! [sort]
//! criteria = "ext"    # or "mod"
//! timezone = "utc"    # or "local"
//!
//! [exclude]
//! names = ["Thumbs.db", "desktop.ini"]
//! patterns = ["*.part", "*.crdownload"]
//! regex = ["^~\\$"]
//! ```
//!
//! Every section and key is optional.

use crate::file_category::DateZone;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or compiling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),

    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub sort: SortSettings,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Where this configuration was read from, if anywhere.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortSettings {
    /// Criterion used when none is given on the command line. Validated at run time
    /// so that a bad value here fails the same way as a bad `-c` flag.
    pub criteria: Option<String>,

    #[serde(default)]
    pub timezone: DateZone,
}

/// Names that are never classified, on top of the built-in reservations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExcludeRules {
    #[serde(default)]
    pub names: Vec<String>,

    /// Glob patterns matched against the entry name.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the entry name.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl SorterConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Attempts, in order:
    /// 1. `config_path`, when given (it must exist)
    /// 2. `~/.config/file-sorter/config.toml`
    /// 3. built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("file-sorter")
                .join("config.toml");
            if home_config.is_file() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: Self = toml::from_str(&content)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Compiles the exclusion rules so patterns are parsed once per run.
    pub fn compile_exclusions(&self) -> Result<CompiledExclusions, ConfigError> {
        CompiledExclusions::new(&self.exclude)
    }
}

/// Pre-parsed exclusion rules, matched against bare entry names.
#[derive(Debug, Clone, Default)]
pub struct CompiledExclusions {
    names: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl CompiledExclusions {
    fn new(rules: &ExcludeRules) -> Result<Self, ConfigError> {
        let patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names: rules.names.iter().cloned().collect(),
            patterns,
            regexes,
        })
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.names.contains(name)
            || self.patterns.iter().any(|pattern| pattern.matches(name))
            || self.regexes.iter().any(|regex| regex.is_match(name))
    }
}
