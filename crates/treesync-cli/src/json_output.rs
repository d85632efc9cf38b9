//! JSON output structures for treesync CLI
//!
//! With `--json` every event is written as one JSON object per line, followed
//! by a single summary object.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::warn;
use treesync_engine::SyncReport;
use treesync_types::{ErrorKind, EventSink, OutcomeEvent, SyncAction, SyncPhase, SyncStats};

/// One processed file
#[derive(Debug, Serialize, Deserialize)]
pub struct EventJson {
    /// Record type, always "event"
    pub r#type: String,
    /// When the event was emitted
    pub timestamp: String,
    /// Phase that produced the event
    pub phase: SyncPhase,
    /// Path relative to the tree root
    pub path: String,
    /// Action taken
    pub action: SyncAction,
    /// Bytes written
    pub bytes: u64,
    /// The action was planned but not performed
    pub dry_run: bool,
    /// Classification of the failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Failure message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&OutcomeEvent> for EventJson {
    fn from(event: &OutcomeEvent) -> Self {
        Self {
            r#type: "event".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            phase: event.phase,
            path: event.path.display().to_string(),
            action: event.action,
            bytes: event.bytes,
            dry_run: event.dry_run,
            error_kind: event.error_kind(),
            error: event.error.as_ref().map(|error| error.message.clone()),
        }
    }
}

/// Final summary of a run
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryJson {
    /// Record type, always "summary"
    pub r#type: String,
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Run counters
    pub stats: SyncStatsJson,
    /// Overall result
    pub result: OperationResult,
}

/// Operation metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// treesync version
    pub version: String,
    /// Identifier of the run
    pub request_id: String,
    /// Timestamp when the summary was produced
    pub timestamp: String,
    /// Source path
    pub source_path: String,
    /// Destination path
    pub destination_path: String,
    /// Nothing was written
    pub dry_run: bool,
}

/// Run counters in JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncStatsJson {
    /// Files copied to new destination paths
    pub files_created: u64,
    /// Destination files replaced
    pub files_overwritten: u64,
    /// Files already up to date
    pub files_skipped: u64,
    /// Orphans removed
    pub files_deleted: u64,
    /// Failed operations
    pub errors: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Content digests computed
    pub digests_computed: u64,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Transfer rate in MB/s
    pub transfer_rate_mbps: f64,
}

impl From<&SyncStats> for SyncStatsJson {
    fn from(stats: &SyncStats) -> Self {
        Self {
            files_created: stats.files_created,
            files_overwritten: stats.files_overwritten,
            files_skipped: stats.files_skipped,
            files_deleted: stats.files_deleted,
            errors: stats.errors,
            bytes_copied: stats.bytes_copied,
            digests_computed: stats.digests_computed,
            duration_seconds: stats.duration.as_secs_f64(),
            transfer_rate_mbps: stats.transfer_rate() / 1024.0 / 1024.0,
        }
    }
}

/// Overall operation result
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResult {
    /// Whether every file was handled without error
    pub success: bool,
    /// Result message
    pub message: String,
}

impl SummaryJson {
    /// Build the summary for a finished run
    pub fn new(source: &Path, destination: &Path, report: &SyncReport) -> Self {
        let success = report.is_success();
        let message = if success {
            "Sync completed successfully".to_string()
        } else {
            format!("Sync completed with {} errors", report.stats.errors)
        };

        Self {
            r#type: "summary".to_string(),
            metadata: OperationMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                request_id: report.request_id.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                source_path: source.display().to_string(),
                destination_path: destination.display().to_string(),
                dry_run: report.dry_run,
            },
            stats: SyncStatsJson::from(&report.stats),
            result: OperationResult { success, message },
        }
    }
}

/// Writes each event as a JSON line
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    /// Create a sink writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write any serializable record as one line
    pub fn write_record<T: Serialize>(&mut self, record: &T) {
        let result = serde_json::to_writer(&mut self.writer, record)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            warn!("Failed to write JSON output: {}", e);
        }
    }
}

impl<W: Write> EventSink for JsonSink<W> {
    fn on_event(&mut self, event: &OutcomeEvent) {
        self.write_record(&EventJson::from(event));
    }

    fn on_complete(&mut self, _stats: &SyncStats) {
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush JSON output: {}", e);
        }
    }
}
