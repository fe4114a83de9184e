//! Command-line interface module for tidykit.
//!
//! This module handles all CLI-related functionality including:
//! - Command definitions (parsed with clap)
//! - Configuration loading
//! - Dispatch to the rename, sort and duplicate engines
//! - Rendering of the returned reports

use crate::config::TidyConfig;
use crate::duplicates::{DuplicateFinder, DuplicateOptions, NoProgress, ScanProgress};
use crate::error::TidyResult;
use crate::file_organizer::{FileOrganizer, PlannedMove};
use crate::output::{HashProgress, OutputFormatter};
use crate::renamer::Renamer;
use crate::report::OperationReport;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Bulk-rename, sort, and de-duplicate files.
#[derive(Debug, Parser)]
#[command(name = "tidykit", version, about)]
pub struct Cli {
    /// Read settings from this TOML file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v for info, -vv for debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: TidyCommand,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Subcommand)]
pub enum TidyCommand {
    /// Rename files in a directory by literal or regex substitution.
    Rename {
        /// Directory whose files are renamed (not recursive).
        dir: PathBuf,
        /// Text or regular expression to search for.
        pattern: String,
        /// Replacement text. In regex mode, `$1` or `${name}` refer to captures.
        replacement: String,
        /// Treat the pattern as a regular expression.
        #[arg(long)]
        regex: bool,
    },
    /// Move files into category folders by extension.
    Sort {
        /// Directory to sort (not recursive).
        dir: PathBuf,
        /// Show where files would go without moving anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Find duplicate files by content, optionally removing the copies.
    Dupes {
        /// Directory to scan recursively.
        dir: PathBuf,
        /// Delete every duplicate, keeping the first copy of each group.
        #[arg(long)]
        remove: bool,
        /// Hash files on all cores.
        #[arg(long)]
        parallel: bool,
        /// Only hash files whose size is shared with another file.
        #[arg(long)]
        size_prefilter: bool,
    },
}

/// What a command produced.
#[derive(Debug)]
pub enum CommandOutcome {
    /// An engine ran and returned its report.
    Report(OperationReport),
    /// A sort dry run: the moves that would be made.
    Plan(Vec<PlannedMove>),
}

/// Runs a parsed command line.
///
/// Returns an error message for terminal failures: a bad configuration file,
/// a missing directory, or an invalid regex. Per-file failures are part of the
/// printed report and do not make this fail.
pub fn run_cli(cli: &Cli) -> Result<(), String> {
    run_cli_with_config(&cli.command, cli.config.as_deref(), cli.json)
}

/// Runs a command with an optional configuration file.
///
/// # Examples
///
/// ```no_run
/// use tidykit::cli::{run_cli_with_config, TidyCommand};
/// use std::path::PathBuf;
///
/// let command = TidyCommand::Sort { dir: PathBuf::from("/path/to/downloads"), dry_run: true };
/// if let Err(e) = run_cli_with_config(&command, None, false) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli_with_config(
    command: &TidyCommand,
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), String> {
    let config =
        TidyConfig::load(config_path).map_err(|e| format!("Error loading configuration: {}", e))?;

    // The progress bar would interleave with JSON on the terminal.
    let progress: Box<dyn ScanProgress> = if json {
        Box::new(NoProgress)
    } else {
        Box::new(HashProgress::new())
    };
    let outcome = execute(command, &config, progress.as_ref()).map_err(|e| e.to_string())?;

    match outcome {
        CommandOutcome::Report(report) if json => OutputFormatter::print_json(&report),
        CommandOutcome::Report(report) => OutputFormatter::print_report(&report),
        CommandOutcome::Plan(plan) => print_plan(command, &plan, json),
    }

    Ok(())
}

/// Dispatches a command to its engine.
///
/// Flags on the command line switch duplicate-scan options on in addition to
/// whatever the configuration enables.
pub fn execute(
    command: &TidyCommand,
    config: &TidyConfig,
    progress: &dyn ScanProgress,
) -> TidyResult<CommandOutcome> {
    match command {
        TidyCommand::Rename {
            dir,
            pattern,
            replacement,
            regex,
        } => Renamer::new()
            .rename(dir, pattern, replacement, *regex)
            .map(CommandOutcome::Report),
        TidyCommand::Sort { dir, dry_run } => {
            let organizer = FileOrganizer::new(config.sort.clone());
            if *dry_run {
                organizer.plan(dir).map(CommandOutcome::Plan)
            } else {
                organizer.sort(dir).map(CommandOutcome::Report)
            }
        }
        TidyCommand::Dupes {
            dir,
            remove,
            parallel,
            size_prefilter,
        } => {
            let mut options: DuplicateOptions = config.duplicates.into();
            options.parallel |= *parallel;
            options.size_prefilter |= *size_prefilter;
            DuplicateFinder::new(options)
                .find_duplicates_with_progress(dir, *remove, progress)
                .map(CommandOutcome::Report)
        }
    }
}

/// Prints the moves a sort dry run would make.
fn print_plan(command: &TidyCommand, plan: &[PlannedMove], json: bool) {
    if json {
        let moves: Vec<_> = plan
            .iter()
            .map(|m| {
                serde_json::json!({
                    "source": m.source.to_string_lossy(),
                    "destination": m.destination.to_string_lossy(),
                    "category": m.category,
                })
            })
            .collect();
        match serde_json::to_string_pretty(&moves) {
            Ok(text) => OutputFormatter::plain(&text),
            Err(e) => OutputFormatter::error(&format!("Could not serialize plan: {}", e)),
        }
        return;
    }

    if plan.is_empty() {
        OutputFormatter::dry_run_notice("No files found to organize.");
        return;
    }

    OutputFormatter::dry_run_notice("Files would be organized as follows:");
    let mut counts = std::collections::BTreeMap::new();
    for planned in plan {
        let source_name = planned
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let dest_name = planned
            .destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        OutputFormatter::plain(&format!(" - {}", source_name));
        OutputFormatter::plain(&format!("   → Would move to {}/{}", planned.category, dest_name));
        *counts.entry(planned.category.clone()).or_insert(0usize) += 1;
    }
    OutputFormatter::summary_table(&counts, plan.len());

    if let TidyCommand::Sort { dir, .. } = command {
        OutputFormatter::success("Dry run complete. No files were modified.");
        OutputFormatter::info(&format!(
            "Run 'tidykit sort {}' (without --dry-run) to execute the organization.",
            dir.display()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dupes_flags() {
        let cli = Cli::try_parse_from(["tidykit", "dupes", "/data", "--remove", "--parallel"]).unwrap();
        match cli.command {
            TidyCommand::Dupes {
                dir,
                remove,
                parallel,
                size_prefilter,
            } => {
                assert_eq!(dir, PathBuf::from("/data"));
                assert!(remove);
                assert!(parallel);
                assert!(!size_prefilter);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rename_with_global_flags() {
        let cli = Cli::try_parse_from([
            "tidykit", "rename", "/data", "IMG_", "img-", "--regex", "--json", "-vv",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, TidyCommand::Rename { regex: true, .. }));
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["tidykit"]).is_err());
    }
}
