//! Output formatting and styling module.
//!
//! Everything the user sees on the terminal goes through [`OutputFormatter`]:
//! colored status lines, the progress bar shown while entries are reconciled, and the
//! per-category summary table. Quiet mode silences all of it except errors.

use crate::reconcile::{Outcome, Reconciled};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Outcome counts for one category folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub moved: usize,
    pub deduplicated: usize,
    pub renamed: usize,
}

impl CategoryCounts {
    pub fn total(&self) -> usize {
        self.moved + self.deduplicated + self.renamed
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Moved => self.moved += 1,
            Outcome::Deduplicated => self.deduplicated += 1,
            Outcome::MovedDisambiguated => self.renamed += 1,
        }
    }
}

/// Groups reconciled entries by category folder name.
pub fn count_by_category(reconciled: &[Reconciled]) -> BTreeMap<String, CategoryCounts> {
    let mut counts: BTreeMap<String, CategoryCounts> = BTreeMap::new();
    for item in reconciled {
        counts
            .entry(item.entry.category.dir_name().to_string())
            .or_default()
            .record(item.outcome());
    }
    counts
}

/// Prints status lines, progress and summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter {
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Prints a success message in green with a checkmark.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", "✓".green(), message);
        }
    }

    /// Prints an error message in red with an X mark. Shown even in quiet mode.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use file_sorter::output::OutputFormatter;
    /// OutputFormatter::new(true).error("could not rename file");
    /// ```
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", "⚠".yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.cyan());
        }
    }

    pub fn plain(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    pub fn header(&self, header: &str) {
        if !self.quiet {
            println!("\n{}", header.bold());
        }
    }

    pub fn dry_run_notice(&self, message: &str) {
        if !self.quiet {
            println!("{}", format!("[DRY RUN] {}", message).yellow());
        }
    }

    /// Creates a progress bar for `total` entries; hidden in quiet mode.
    pub fn create_progress_bar(&self, total: u64) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints a table of outcomes per category folder.
    pub fn summary_table(&self, reconciled: &[Reconciled]) {
        if self.quiet {
            return;
        }
        self.header("SUMMARY");

        let counts = count_by_category(reconciled);
        let width = counts.keys().map(|name| name.len()).max().unwrap_or(0).max(8);

        println!(
            "{:<width$} | {:>5} | {:>5} | {:>7}",
            "Category".bold(),
            "Moved".bold(),
            "Dedup".bold(),
            "Renamed".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 28));

        let mut totals = CategoryCounts::default();
        for (category, count) in &counts {
            println!(
                "{:<width$} | {:>5} | {:>5} | {:>7}",
                category,
                count.moved.to_string().green(),
                count.deduplicated.to_string().yellow(),
                count.renamed.to_string().cyan(),
                width = width
            );
            totals.moved += count.moved;
            totals.deduplicated += count.deduplicated;
            totals.renamed += count.renamed;
        }

        println!("{}", "-".repeat(width + 28));
        let total = totals.total();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            if total == 1 { "entry" } else { "entries" },
            width = width
        );
    }
}
