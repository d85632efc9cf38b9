//! Forward reconciliation: make every source file present and current in the destination

use std::path::Path;

use tracing::debug;
use treesync_types::{
    CompareMode, EventSink, FileEntry, OutcomeEvent, Result, SyncAction, SyncDecision, SyncPhase,
};

use crate::compare::Comparator;
use crate::fs::FileSystem;
use crate::report::Reporter;
use crate::walker::WalkEntry;

const PHASE: SyncPhase = SyncPhase::Reconcile;

/// Walks the source tree and copies whatever the destination lacks or has stale
pub struct ForwardReconciler<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    comparator: Comparator,
    dry_run: bool,
}

impl<'a, F: FileSystem + ?Sized> ForwardReconciler<'a, F> {
    /// Create a reconciler over `fs`
    pub fn new(fs: &'a F, compare_mode: CompareMode, dry_run: bool) -> Self {
        Self {
            fs,
            comparator: Comparator::new(compare_mode),
            dry_run,
        }
    }

    /// Reconcile `destination` against `source`, one event per file
    pub fn run<S: EventSink + ?Sized>(
        &mut self,
        source: &Path,
        destination: &Path,
        reporter: &mut Reporter<'_, S>,
    ) {
        let digests_before = self.comparator.digests_computed();

        for entry in self.fs.walk(source) {
            match entry {
                WalkEntry::Directory(_) => {}
                WalkEntry::Error { path, error } => {
                    reporter.emit(OutcomeEvent::failed(PHASE, path, &error));
                }
                WalkEntry::File(file) => {
                    let event = self.reconcile_file(&file, destination);
                    reporter.emit(event);
                }
            }
        }

        reporter.add_digests(self.comparator.digests_computed() - digests_before);
    }

    fn reconcile_file(&mut self, file: &FileEntry, destination: &Path) -> OutcomeEvent {
        let target = destination.join(&file.relative_path);
        let relative = file.relative_path.clone();

        let existing = match self.fs.stat(&target) {
            Ok(existing) => existing,
            Err(e) => return OutcomeEvent::failed(PHASE, relative, &e),
        };

        let decision = match self
            .comparator
            .decide(self.fs, file, &target, existing.as_ref())
        {
            Ok(decision) => decision,
            Err(e) => return OutcomeEvent::failed(PHASE, relative, &e),
        };

        match decision {
            SyncDecision::Skip => OutcomeEvent::new(PHASE, relative, SyncAction::Skipped),
            decision if self.dry_run => OutcomeEvent::new(PHASE, relative, decision.into())
                .with_bytes(file.size)
                .with_dry_run(true),
            decision => match self.copy(file, &target) {
                Ok(bytes) => OutcomeEvent::new(PHASE, relative, decision.into()).with_bytes(bytes),
                Err(e) => OutcomeEvent::failed(PHASE, relative, &e),
            },
        }
    }

    fn copy(&self, file: &FileEntry, target: &Path) -> Result<u64> {
        if let Some(parent) = target.parent() {
            self.fs.create_dir_all(parent)?;
        }
        debug!("Copying {} -> {}", file.path.display(), target.display());
        self.fs.copy_file(&file.path, target, file.modified)
    }
}
