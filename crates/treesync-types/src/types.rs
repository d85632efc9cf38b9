//! Core data types for treesync
//!
//! Everything here is transient: entries, decisions and events are derived
//! fresh on every run and never persisted.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::{Error, ErrorKind};

/// Unique identifier for a sync run
pub type RunId = uuid::Uuid;

/// Phase of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SyncPhase {
    /// Walking the source tree and copying what differs
    Reconcile,
    /// Walking the destination tree and removing orphans
    Prune,
}

impl SyncPhase {
    /// Short, stable label for the phase
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reconcile => "reconcile",
            Self::Prune => "prune",
        }
    }
}

/// How a source file is compared against an existing destination file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CompareMode {
    /// Equal size and modification time means equal file
    #[default]
    Fast,
    /// Equal size and modification time is confirmed with a content digest
    Verify,
}

/// Verdict for one relative path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyncDecision {
    /// Destination is already equivalent
    Skip,
    /// No destination file exists
    CreateNew,
    /// A destination file exists but is not provably identical
    Overwrite,
    /// Destination file has no source counterpart
    Delete,
}

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SyncAction {
    /// File was copied to a destination path that had no file
    CopiedNew,
    /// Destination file was replaced
    Overwritten,
    /// Destination file was already up to date
    Skipped,
    /// Orphaned destination file was removed
    Deleted,
    /// The operation on this file failed
    Error,
}

impl SyncAction {
    /// Short, stable label for the action
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CopiedNew => "copied_new",
            Self::Overwritten => "overwritten",
            Self::Skipped => "skipped",
            Self::Deleted => "deleted",
            Self::Error => "error",
        }
    }
}

impl From<SyncDecision> for SyncAction {
    fn from(decision: SyncDecision) -> Self {
        match decision {
            SyncDecision::Skip => Self::Skipped,
            SyncDecision::CreateNew => Self::CopiedNew,
            SyncDecision::Overwrite => Self::Overwritten,
            SyncDecision::Delete => Self::Deleted,
        }
    }
}

/// A regular file found while walking a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the tree root, the join key between trees
    pub relative_path: PathBuf,
    /// Full path of the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time
    pub modified: SystemTime,
}

/// Metadata of a path looked up outside of a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// File size in bytes
    pub size: u64,
    /// Last modified time
    pub modified: SystemTime,
    /// Whether the path is a regular file
    pub is_file: bool,
}

impl FileStat {
    /// Whether size and modification time both match `entry` exactly
    pub fn matches(&self, entry: &FileEntry) -> bool {
        self.size == entry.size && self.modified == entry.modified
    }
}

/// Error details attached to a failed [`OutcomeEvent`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventError {
    /// Classification of the failure
    pub kind: ErrorKind,
    /// Human readable description
    pub message: String,
}

impl From<&Error> for EventError {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Record of what happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutcomeEvent {
    /// Phase that produced the event
    pub phase: SyncPhase,
    /// Path relative to the tree root
    pub path: PathBuf,
    /// Action taken
    pub action: SyncAction,
    /// Bytes written for copy actions
    pub bytes: u64,
    /// Failure details when `action` is [`SyncAction::Error`]
    pub error: Option<EventError>,
    /// The action was planned but not performed
    pub dry_run: bool,
}

impl OutcomeEvent {
    /// Create a successful event
    pub fn new(phase: SyncPhase, path: impl Into<PathBuf>, action: SyncAction) -> Self {
        Self {
            phase,
            path: path.into(),
            action,
            bytes: 0,
            error: None,
            dry_run: false,
        }
    }

    /// Create an error event
    pub fn failed(phase: SyncPhase, path: impl Into<PathBuf>, error: &Error) -> Self {
        Self {
            error: Some(EventError::from(error)),
            ..Self::new(phase, path, SyncAction::Error)
        }
    }

    /// Set the number of bytes written
    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.bytes = bytes;
        self
    }

    /// Mark the event as planned only
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check if the event reports a failure
    pub fn is_error(&self) -> bool {
        self.action == SyncAction::Error
    }

    /// Error kind of a failed event
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Counters for a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncStats {
    /// Files copied to a previously empty destination path
    pub files_created: u64,
    /// Destination files replaced
    pub files_overwritten: u64,
    /// Files already up to date
    pub files_skipped: u64,
    /// Orphaned destination files removed
    pub files_deleted: u64,
    /// Failed operations
    pub errors: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Content digests computed while comparing
    pub digests_computed: u64,
    /// Wall time of the run
    pub duration: Duration,
}

impl SyncStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one event
    pub fn record(&mut self, event: &OutcomeEvent) {
        match event.action {
            SyncAction::CopiedNew => self.files_created += 1,
            SyncAction::Overwritten => self.files_overwritten += 1,
            SyncAction::Skipped => self.files_skipped += 1,
            SyncAction::Deleted => self.files_deleted += 1,
            SyncAction::Error => self.errors += 1,
        }
        self.bytes_copied += event.bytes;
    }

    /// Files copied, new or overwritten
    pub fn files_copied(&self) -> u64 {
        self.files_created + self.files_overwritten
    }

    /// Check if any operation failed
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Calculate the overall transfer rate in bytes per second
    pub fn transfer_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_copied as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Merge statistics from another instance
    pub fn merge(&mut self, other: &SyncStats) {
        self.files_created += other.files_created;
        self.files_overwritten += other.files_overwritten;
        self.files_skipped += other.files_skipped;
        self.files_deleted += other.files_deleted;
        self.errors += other.errors;
        self.bytes_copied += other.bytes_copied;
        self.digests_computed += other.digests_computed;
        self.duration += other.duration;
    }
}
