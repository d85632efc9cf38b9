//! Terminal output for treesync runs

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use treesync_types::{ErrorKind, EventSink, OutcomeEvent, SyncAction, SyncPhase, SyncStats};

/// Renders events as human readable lines while a spinner tracks progress
pub struct TerminalSink {
    spinner: ProgressBar,
    verbose: bool,
    processed: u64,
}

impl TerminalSink {
    /// Create a sink; the spinner is only drawn when `show_spinner` is set
    pub fn new(verbose: bool, show_spinner: bool) -> Self {
        Self {
            spinner: create_spinner(show_spinner),
            verbose,
            processed: 0,
        }
    }

    fn print(&self, line: String, to_stderr: bool) {
        self.spinner.suspend(|| {
            if to_stderr {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        });
    }
}

impl EventSink for TerminalSink {
    fn on_event(&mut self, event: &OutcomeEvent) {
        self.processed += 1;
        self.spinner.set_message(format!(
            "{} files processed, at {}",
            self.processed,
            event.path.display()
        ));

        if event.action == SyncAction::Skipped && !self.verbose {
            return;
        }
        self.print(event_line(event), event.is_error());
    }

    fn on_phase(&mut self, phase: SyncPhase) {
        let message = match phase {
            SyncPhase::Reconcile => "Reconciling source into destination...",
            SyncPhase::Prune => "Removing orphaned files...",
        };
        self.spinner.set_message(message);
    }

    fn on_complete(&mut self, _stats: &SyncStats) {
        self.spinner.finish_and_clear();
    }
}

/// One line describing `event`
pub fn event_line(event: &OutcomeEvent) -> String {
    let path = event.path.display();
    let planned = if event.dry_run {
        format!(" {}", style("(dry run)").dim())
    } else {
        String::new()
    };

    match event.action {
        SyncAction::CopiedNew => format!(
            "{} {} {}{}",
            style("+").green().bold(),
            style(path).cyan(),
            style(format_bytes(event.bytes)).dim(),
            planned
        ),
        SyncAction::Overwritten => format!(
            "{} {} {}{}",
            style("~").yellow().bold(),
            style(path).cyan(),
            style(format_bytes(event.bytes)).dim(),
            planned
        ),
        SyncAction::Deleted => format!("{} {}{}", style("-").red().bold(), style(path).cyan(), planned),
        SyncAction::Skipped => format!("{} {}", style("=").dim(), style(path).dim()),
        SyncAction::Error => {
            let label = match event.error_kind() {
                Some(ErrorKind::AccessDenied) => "ACCESS DENIED",
                _ => "ERROR",
            };
            let message = event
                .error
                .as_ref()
                .map(|error| error.message.as_str())
                .unwrap_or("unknown error");
            format!(
                "{} {} {}: {}",
                style("✗").red().bold(),
                style(label).red().bold(),
                path,
                message
            )
        }
    }
}

/// Spinner on stderr; hidden when `visible` is false
pub fn create_spinner(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print the end of run statistics block
pub fn print_sync_stats(stats: &SyncStats, dry_run: bool) {
    println!();
    let title = if dry_run {
        "Sync Statistics (dry run, nothing was changed):"
    } else {
        "Sync Statistics:"
    };
    println!("{}", style(title).bold().underlined());
    println!("  Files created: {}", style(stats.files_created).green());
    println!("  Files overwritten: {}", style(stats.files_overwritten).green());
    println!("  Files skipped: {}", style(stats.files_skipped).yellow());
    println!("  Files deleted: {}", style(stats.files_deleted).red());
    println!(
        "  Bytes copied: {}",
        style(format_bytes(stats.bytes_copied)).green()
    );
    if stats.digests_computed > 0 {
        println!("  Digests computed: {}", style(stats.digests_computed).cyan());
    }
    println!(
        "  Errors: {}",
        if stats.errors > 0 {
            style(stats.errors).red()
        } else {
            style(stats.errors).green()
        }
    );
    println!(
        "  Duration: {}",
        style(format_duration(stats.duration)).blue()
    );
    println!(
        "  Transfer rate: {}",
        style(format!("{:.2} MB/s", stats.transfer_rate() / 1024.0 / 1024.0)).blue()
    );
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
