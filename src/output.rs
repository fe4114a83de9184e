//! Output formatting and styling module.
//!
//! Renders [`OperationReport`]s for the terminal: coloured markers per line
//! kind, a summary table for sorting, and a progress bar while duplicate
//! scans hash files. The engines never print; everything visible goes
//! through here.

use crate::duplicates::ScanProgress;
use crate::report::{LineKind, OperationReport, ReportLine};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Returns the text a report line is printed with, marker included.
    ///
    /// ```
    /// use tidykit::output::OutputFormatter;
    /// use tidykit::report::{LineKind, ReportLine};
    ///
    /// colored::control::set_override(false);
    /// let line = ReportLine { kind: LineKind::Error, text: "boom".to_string() };
    /// assert_eq!(OutputFormatter::format_line(&line), "✗ boom");
    /// ```
    pub fn format_line(line: &ReportLine) -> String {
        match line.kind {
            LineKind::Info => line.text.clone(),
            LineKind::Success => format!("{} {}", "✓".green(), line.text),
            LineKind::Warning => format!("{} {}", "⚠".yellow(), line.text),
            LineKind::Error => format!("{} {}", "✗".red(), line.text),
        }
    }

    /// Returns the lines [`print_report`](Self::print_report) writes, in order.
    ///
    /// The report's own lines already carry its summary, so nothing is added
    /// after them besides the closing rule.
    pub fn render_report(report: &OperationReport) -> Vec<String> {
        let rule = "=".repeat(60);
        let mut out = vec![
            rule.clone(),
            format!("OPERATION REPORT: {}", report.operation().title())
                .bold()
                .to_string(),
            format!("Started {}", report.started_at().format("%Y-%m-%d %H:%M:%S"))
                .dimmed()
                .to_string(),
            rule.clone(),
        ];
        out.extend(report.lines().iter().map(Self::format_line));
        out.push(rule);
        out
    }

    /// Prints a full operation report.
    pub fn print_report(report: &OperationReport) {
        println!();
        for line in Self::render_report(report) {
            println!("{}", line);
        }
        println!();
    }

    /// Prints a report as JSON, falling back to the plain rendering if
    /// serialization fails.
    pub fn print_json(report: &OperationReport) {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                Self::error(&format!("Could not serialize report: {}", e));
                Self::print_report(report);
            }
        }
    }

    fn progress_style() -> Option<ProgressStyle> {
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .ok()
            .map(|style| style.progress_chars("█▓░"))
    }

    /// Prints a summary table with file counts by category.
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_category_len = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in category_counts {
            let file_word = if *count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                file_word,
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_category_len
        );
    }
}

/// Progress bar shown while a duplicate scan hashes files.
///
/// The bar is created hidden and sized once the number of files is known.
pub struct HashProgress {
    bar: ProgressBar,
}

impl HashProgress {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for HashProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanProgress for HashProgress {
    fn begin(&self, total: u64) {
        self.bar.set_length(total);
        if let Some(style) = OutputFormatter::progress_style() {
            self.bar.set_style(style);
        }
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.set_message("hashing");
    }

    fn advance(&self) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
