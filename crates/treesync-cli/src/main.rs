//! treesync - one-way directory reconciliation
//!
//! Brings a destination directory in line with a source directory, copying only
//! files that are missing or stale and optionally removing files the source no
//! longer has.

mod display;
mod json_output;

use anyhow::{Context, Result};
use clap::Parser;
use console::{style, Term};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use treesync_config::{Config, ConfigLoader, LoggingConfig};
use treesync_engine::{SyncEngine, SyncOptions, SyncRequest};
use treesync_types::CompareMode;

use display::{print_sync_stats, TerminalSink};
use json_output::{JsonSink, SummaryJson};

/// treesync - one-way directory reconciliation
#[derive(Parser)]
#[command(
    name = "treesync",
    version = env!("CARGO_PKG_VERSION"),
    about = "One-way directory reconciliation",
    long_about = "treesync makes DESTINATION contain every regular file in SOURCE with the same\n\
                  content and modification time, copying only what is missing or stale.\n\
                  With --delete-missing it also removes files SOURCE no longer has."
)]
struct Cli {
    /// Source directory
    #[arg(required_unless_present = "generate_config")]
    source: Option<PathBuf>,

    /// Destination directory
    #[arg(required_unless_present = "generate_config")]
    destination: Option<PathBuf>,

    /// Delete destination files that have no source counterpart
    #[arg(short, long)]
    delete_missing: bool,

    /// Show what would be done without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Confirm files with matching size and mtime by comparing content digests
    #[arg(long)]
    verify: bool,

    /// Emit one JSON object per event and a summary on stdout
    #[arg(long)]
    json: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a default configuration file and exit
    #[arg(long, value_name = "FILE")]
    generate_config: Option<PathBuf>,

    /// Quiet mode - only errors and the summary
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - also list skipped files
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(path) = &cli.generate_config {
        ConfigLoader::generate_default_config(path)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        println!(
            "{} Wrote default configuration to {}",
            style("✓").green().bold(),
            style(path.display()).cyan()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli.config.as_ref())?;
    init_logging(&config.logging, cli.debug, cli.verbose, cli.quiet)?;

    info!("treesync v{} starting", env!("CARGO_PKG_VERSION"));

    let (Some(source), Some(destination)) = (cli.source.clone(), cli.destination.clone()) else {
        anyhow::bail!("SOURCE and DESTINATION are required");
    };

    let options = merge_options(&config, &cli);
    let request = SyncRequest::new(&source, &destination).with_options(options);
    let engine = SyncEngine::new();

    let report = if cli.json {
        let stdout = std::io::stdout();
        let mut sink = JsonSink::new(stdout.lock());
        let report = engine.run(request, &mut sink);
        sink.write_record(&SummaryJson::new(&source, &destination, &report));
        report
    } else {
        if !cli.quiet {
            println!(
                "{} Syncing {} into {}",
                style("⟲").blue().bold(),
                style(source.display()).cyan(),
                style(destination.display()).cyan()
            );
            if options.dry_run {
                println!(
                    "{} Dry run mode - no changes will be made",
                    style("ℹ").yellow()
                );
            }
        }

        let show_spinner = !cli.quiet && Term::stderr().features().is_attended();
        let mut sink = TerminalSink::new(cli.verbose, show_spinner);
        let report = engine.run(request, &mut sink);
        print_sync_stats(&report.stats, report.dry_run);
        report
    };

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default().context("Failed to load configuration")?,
    };
    Ok(config)
}

/// Flags can switch options on; they never switch off what the config enables
fn merge_options(config: &Config, cli: &Cli) -> SyncOptions {
    let mut options = SyncOptions::from(&config.sync);
    options.delete_missing |= cli.delete_missing;
    options.dry_run |= cli.dry_run;
    if cli.verify {
        options.compare_mode = CompareMode::Verify;
    }
    options
}

fn init_logging(logging: &LoggingConfig, debug: bool, verbose: bool, quiet: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    if !logging.colored_output {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(logging.colored_output)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["treesync", "-d", "--verify", "--dry-run", "src", "dst"]);
        assert!(cli.delete_missing);
        assert!(cli.verify);
        assert!(cli.dry_run);
        assert_eq!(cli.source, Some(PathBuf::from("src")));
        assert_eq!(cli.destination, Some(PathBuf::from("dst")));
    }

    #[test]
    fn test_paths_required_unless_generating_config() {
        assert!(Cli::try_parse_from(["treesync", "src"]).is_err());
        assert!(Cli::try_parse_from(["treesync", "--generate-config", "treesync.yaml"]).is_ok());
    }

    #[test]
    fn test_flags_only_switch_options_on() {
        let mut config = Config::default();
        config.sync.delete_missing = true;
        config.sync.compare_mode = CompareMode::Verify;

        let cli = Cli::parse_from(["treesync", "src", "dst"]);
        let options = merge_options(&config, &cli);
        assert!(options.delete_missing);
        assert_eq!(options.compare_mode, CompareMode::Verify);
        assert!(!options.dry_run);

        let cli = Cli::parse_from(["treesync", "--dry-run", "src", "dst"]);
        let options = merge_options(&Config::default(), &cli);
        assert!(options.dry_run);
        assert_eq!(options.compare_mode, CompareMode::Fast);
    }
}
