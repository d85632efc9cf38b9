//! Sync requests and their results

use std::path::PathBuf;

use treesync_config::SyncSettings;
use treesync_types::{CompareMode, RunId, SyncStats};
use uuid::Uuid;

/// Options controlling a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOptions {
    /// Remove destination files that have no source counterpart
    pub delete_missing: bool,
    /// How existing destination files are compared
    pub compare_mode: CompareMode,
    /// Report what would happen without touching the destination
    pub dry_run: bool,
}

impl SyncOptions {
    /// Options for a full mirror, pruning enabled
    pub fn mirror() -> Self {
        Self {
            delete_missing: true,
            ..Self::default()
        }
    }

    /// Use content digests to confirm files with matching metadata
    pub fn verify(mut self) -> Self {
        self.compare_mode = CompareMode::Verify;
        self
    }

    /// Set dry run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl From<&SyncSettings> for SyncOptions {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            delete_missing: settings.delete_missing,
            compare_mode: settings.compare_mode,
            dry_run: settings.dry_run,
        }
    }
}

/// One reconciliation of `destination` against `source`
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Source tree root
    pub source: PathBuf,
    /// Destination tree root
    pub destination: PathBuf,
    /// Run options
    pub options: SyncOptions,
    /// Identifier used to correlate log output
    pub request_id: RunId,
}

impl SyncRequest {
    /// Create a request with default options
    pub fn new<P1: Into<PathBuf>, P2: Into<PathBuf>>(source: P1, destination: P2) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            options: SyncOptions::default(),
            request_id: Uuid::new_v4(),
        }
    }

    /// Set the run options
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Identifier of the request that produced this report
    pub request_id: RunId,
    /// Counters for the run
    pub stats: SyncStats,
    /// Nothing was written
    pub dry_run: bool,
}

impl SyncReport {
    /// Check if every file was handled without error
    pub fn is_success(&self) -> bool {
        !self.stats.has_errors()
    }
}
