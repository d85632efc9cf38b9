//! Orphan pruning: remove destination files that have no source counterpart

use std::path::Path;

use tracing::debug;
use treesync_types::{EventSink, FileEntry, OutcomeEvent, SyncAction, SyncDecision, SyncPhase};

use crate::fs::FileSystem;
use crate::report::Reporter;
use crate::walker::WalkEntry;

const PHASE: SyncPhase = SyncPhase::Prune;

/// Walks the destination tree and deletes files missing from the source
pub struct OrphanPruner<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    dry_run: bool,
}

impl<'a, F: FileSystem + ?Sized> OrphanPruner<'a, F> {
    /// Create a pruner over `fs`
    pub fn new(fs: &'a F, dry_run: bool) -> Self {
        Self { fs, dry_run }
    }

    /// Remove orphans under `destination`. Files that still exist in
    /// `source` produce no event. A destination root that does not exist
    /// has nothing to prune.
    pub fn run<S: EventSink + ?Sized>(
        &self,
        source: &Path,
        destination: &Path,
        reporter: &mut Reporter<'_, S>,
    ) {
        if let Ok(None) = self.fs.stat(destination) {
            debug!("Destination {} does not exist, nothing to prune", destination.display());
            return;
        }

        for entry in self.fs.walk(destination) {
            match entry {
                WalkEntry::Directory(_) => {}
                WalkEntry::Error { path, error } => {
                    reporter.emit(OutcomeEvent::failed(PHASE, path, &error));
                }
                WalkEntry::File(file) => {
                    if let Some(event) = self.prune_file(&file, source) {
                        reporter.emit(event);
                    }
                }
            }
        }
    }

    fn prune_file(&self, file: &FileEntry, source: &Path) -> Option<OutcomeEvent> {
        let counterpart = source.join(&file.relative_path);
        let relative = file.relative_path.clone();

        match self.fs.stat(&counterpart) {
            Ok(Some(stat)) if stat.is_file => return None,
            Ok(_) => {}
            // Existence is uncertain, keep the file
            Err(e) => return Some(OutcomeEvent::failed(PHASE, relative, &e)),
        }

        let action = SyncAction::from(SyncDecision::Delete);
        if self.dry_run {
            return Some(OutcomeEvent::new(PHASE, relative, action).with_dry_run(true));
        }

        debug!("Removing orphan {}", file.path.display());
        Some(match self.fs.remove_file(&file.path) {
            Ok(()) => OutcomeEvent::new(PHASE, relative, action),
            Err(e) => OutcomeEvent::failed(PHASE, relative, &e),
        })
    }
}
