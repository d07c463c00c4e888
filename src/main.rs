use clap::{CommandFactory, Parser};
use file_sorter::cli::{SortOptions, run_cli};
use file_sorter::logging::init_logging;
use file_sorter::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Sorts files into directories, based on their file extension or modification date
#[derive(Parser)]
#[command(name = "file-sorter")]
#[command(version)]
struct Args {
    /// Directory whose files are sorted
    directory: Option<PathBuf>,

    /// Sort criteria of the files (ext|mod). Default: ext
    #[arg(short = 'c', long = "criteria")]
    criteria: Option<String>,

    /// Configuration file (default: ~/.config/file-sorter/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show what would happen without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// Increase diagnostic logging (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let Some(directory) = args.directory else {
        let _ = Args::command().print_help();
        return ExitCode::from(1);
    };

    let options = SortOptions {
        criteria: args.criteria,
        config_path: args.config,
        dry_run: args.dry_run,
        quiet: args.quiet,
        executable: None,
    };

    match run_cli(&directory, &options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, configuration = e.is_configuration(), "Sort aborted");
            OutputFormatter::new(args.quiet).error(&e.to_string());
            ExitCode::from(1)
        }
    }
}
