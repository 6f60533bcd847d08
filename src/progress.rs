//! Progress reporting for the directory walker
//!
//! Standard output carries the path stream, so everything here writes to
//! stderr.

use crate::walker::{WalkProgress, WalkResult};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Spinner that displays walk status on stderr
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());

        // Template is a literal; falling back keeps the default look
        if let Ok(spinner) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(spinner.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &WalkProgress) {
        self.bar.set_message(progress_message(progress));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line status for the spinner
fn progress_message(progress: &WalkProgress) -> String {
    format!(
        "Dirs: {} | Files: {} | Ignored: {} | Rate: {:.0}/s | Pending: {} | Queue: {} | Workers: {}/{}",
        format_number(progress.dirs),
        format_number(progress.files),
        format_number(progress.ignored),
        progress.files_per_second(),
        format_number(progress.in_flight.max(0) as u64),
        progress.queue_size,
        progress.active_workers,
        progress.total_workers,
    )
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Print a summary of the walk results to stderr
pub fn print_summary(result: &WalkResult, root: &str) {
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        result.total_files as f64 / duration_secs
    } else {
        0.0
    };

    let title = if result.completed {
        style("Walk Complete").green().bold()
    } else {
        style("Walk Aborted").red().bold()
    };

    eprintln!();
    eprintln!("{}", title);
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Root:").bold(), root);
    eprintln!("  {} {}", style("Workers:").bold(), result.workers);
    eprintln!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(result.total_dirs)
    );
    eprintln!("  {} {}", style("Files:").bold(), format_number(result.total_files));
    eprintln!("  {} {}", style("Ignored:").bold(), format_number(result.ignored));
    if result.duplicates > 0 {
        eprintln!(
            "  {} {}",
            style("Duplicates:").bold(),
            format_number(result.duplicates)
        );
    }
    if result.backpressure_events > 0 {
        eprintln!(
            "  {} {} queue-full events, {} expanded inline",
            style("Backpressure:").bold(),
            format_number(result.backpressure_events),
            format_number(result.inline_processed)
        );
    }
    eprintln!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if result.errors > 0 {
        eprintln!(
            "  {} {} ({} skipped)",
            style("Errors:").yellow().bold(),
            format_number(result.errors),
            format_number(result.skipped)
        );
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(100000), "100,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_progress_message_shows_pending() {
        let progress = WalkProgress {
            dirs: 1200,
            files: 34000,
            ignored: 7,
            queue_size: 12,
            in_flight: 1500,
            active_workers: 3,
            total_workers: 4,
            errors: 0,
            elapsed: Duration::from_secs(2),
        };

        let msg = progress_message(&progress);
        assert!(msg.contains("Dirs: 1,200"));
        assert!(msg.contains("Pending: 1,500"));
        assert!(msg.contains("Workers: 3/4"));
    }
}
