//! Sort run orchestration.
//!
//! A run goes through these stages, stopping at the first error:
//! 1. Load configuration and validate the criterion
//! 2. Check the target directory and take a listing snapshot
//! 3. Load the ignore ledger and classify the listing
//! 4. Create category folders
//! 5. Reconcile every entry concurrently
//! 6. Persist the ignore ledger
//!
//! Nothing on disk changes before stage 4, so configuration mistakes have no side
//! effects. A dry run stops after planning at stage 3.

use crate::config::SorterConfig;
use crate::error::{SortError, SortResult};
use crate::file_category::{Classifier, Criterion, ExclusionSet, read_listing};
use crate::file_organizer::FileOrganizer;
use crate::ignore_ledger::IgnoreLedger;
use crate::output::OutputFormatter;
use crate::reconcile::{Outcome, Reconciled};
use std::path::{Path, PathBuf};

/// Options for a single sort run.
#[derive(Debug, Clone, Default)]
pub struct SortOptions {
    /// `ext` or `mod`; falls back to the configured criterion, then `ext`.
    pub criteria: Option<String>,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
    /// Plan only; no folder, move, delete or ledger write.
    pub dry_run: bool,
    /// Print errors only.
    pub quiet: bool,
    /// Path of the running executable, never sorted. Resolved from the process when
    /// `None`.
    pub executable: Option<PathBuf>,
}

/// What a run did (or, for a dry run, would do).
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub directory: PathBuf,
    pub criterion: Criterion,
    pub dry_run: bool,
    pub reconciled: Vec<Reconciled>,
}

impl RunSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.reconciled
            .iter()
            .filter(|r| r.outcome() == outcome)
            .count()
    }
}

/// Sorts `directory` according to `options`.
///
/// # Examples
///
/// ```no_run
/// use file_sorter::cli::{run_cli, SortOptions};
/// use std::path::Path;
///
/// let options = SortOptions {
///     criteria: Some("mod".to_string()),
///     ..Default::default()
/// };
/// match run_cli(Path::new("/path/to/directory"), &options) {
///     Ok(summary) => println!("Sorted {} entries", summary.reconciled.len()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(directory: &Path, options: &SortOptions) -> SortResult<RunSummary> {
    let out = OutputFormatter::new(options.quiet);

    let config = SorterConfig::load(options.config_path.as_deref())?;
    let criterion: Criterion = options
        .criteria
        .as_deref()
        .or(config.sort.criteria.as_deref())
        .unwrap_or("ext")
        .parse()?;

    if !directory.is_dir() {
        return Err(SortError::DirectoryNotFound {
            path: directory.to_path_buf(),
        });
    }

    let exclusions = build_exclusions(options, &config)?;
    let listing = read_listing(directory)?;
    let mut ledger = IgnoreLedger::load(directory)?;
    tracing::info!(
        directory = %directory.display(),
        %criterion,
        listed = listing.len(),
        ignored = ledger.len(),
        "Starting sort"
    );

    let classifier = Classifier::new(criterion, config.sort.timezone, exclusions);
    let entries = classifier.classify(directory, &listing, &mut ledger);
    for entry in entries.iter().filter(|e| e.name.to_str().is_none()) {
        out.warning(&format!(
            "{} is not valid UTF-8 and is shown with replacement characters",
            entry.name.to_string_lossy()
        ));
    }

    if options.dry_run {
        out.dry_run_notice(&format!("Analyzing contents of: {}", directory.display()));
        let planned = FileOrganizer::plan_all(&entries)?;
        for item in &planned {
            out.plain(&format!(
                " - {} → would be {} to {}",
                item.entry.name.to_string_lossy(),
                item.outcome(),
                item.placement.target().display()
            ));
        }
        out.summary_table(&planned);
        out.success("Dry run complete. No files were modified.");
        return Ok(RunSummary {
            directory: directory.to_path_buf(),
            criterion,
            dry_run: true,
            reconciled: planned,
        });
    }

    out.info(&format!("Sorting contents of: {}", directory.display()));
    FileOrganizer::create_category_folders(directory, &entries)?;

    let progress = out.create_progress_bar(entries.len() as u64);
    let reconciled = FileOrganizer::execute(&entries, &progress)?;
    progress.finish_and_clear();

    ledger.persist(directory)?;

    if entries.is_empty() {
        out.plain("Nothing to sort.");
    } else {
        out.summary_table(&reconciled);
    }
    tracing::info!(directory = %directory.display(), "Sorted");
    out.success(&format!("Sorted {}", directory.display()));

    Ok(RunSummary {
        directory: directory.to_path_buf(),
        criterion,
        dry_run: false,
        reconciled,
    })
}

/// Collects the names and paths this run must leave alone: the ledger file, the
/// running executable, the configuration file and the configured exclusions.
fn build_exclusions(options: &SortOptions, config: &SorterConfig) -> SortResult<ExclusionSet> {
    let executable = match &options.executable {
        Some(path) => path.clone(),
        None => std::env::current_exe()
            .map_err(|e| SortError::ExecutableUnavailable { source: e })?,
    };
    tracing::debug!(executable = %executable.display(), "Reserved executable path");

    let mut exclusions =
        ExclusionSet::for_run(Some(&executable)).with_rules(config.compile_exclusions()?);
    if let Some(config_file) = &config.source_path {
        exclusions.reserve_path(config_file);
    }
    Ok(exclusions)
}
