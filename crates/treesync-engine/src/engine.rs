//! Sync engine orchestrating both phases

use std::path::Path;
use std::time::Instant;

use tracing::{info, info_span};
use treesync_types::{EventSink, SyncPhase, SyncStats};

use crate::forward::ForwardReconciler;
use crate::fs::{FileSystem, LocalFs};
use crate::prune::OrphanPruner;
use crate::report::Reporter;
use crate::request::{SyncOptions, SyncReport, SyncRequest};

/// Runs forward reconciliation, then optional pruning, over a filesystem
#[derive(Debug, Clone, Default)]
pub struct SyncEngine<F: FileSystem = LocalFs> {
    fs: F,
}

impl SyncEngine<LocalFs> {
    /// Create an engine over the local filesystem
    pub fn new() -> Self {
        Self { fs: LocalFs }
    }
}

impl<F: FileSystem> SyncEngine<F> {
    /// Create an engine over a custom filesystem
    pub fn with_filesystem(fs: F) -> Self {
        Self { fs }
    }

    /// Filesystem in use
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Execute `request`, streaming one event per processed file into `sink`.
    ///
    /// Individual failures never stop the run; they are reported as error
    /// events and counted in the returned report. Pruning starts only after
    /// the whole source tree has been reconciled.
    pub fn run<S: EventSink + ?Sized>(&self, request: SyncRequest, sink: &mut S) -> SyncReport {
        let span = info_span!("sync", request_id = %request.request_id);
        let _guard = span.enter();

        let SyncRequest {
            source,
            destination,
            options,
            request_id,
        } = request;

        info!(
            "Syncing {} -> {} (delete_missing={}, compare={:?}, dry_run={})",
            source.display(),
            destination.display(),
            options.delete_missing,
            options.compare_mode,
            options.dry_run
        );

        let start = Instant::now();
        let mut reporter = Reporter::new(&mut *sink);
        self.run_phases(&source, &destination, &options, &mut reporter);

        let mut stats = reporter.into_stats();
        stats.duration = start.elapsed();

        info!(
            "Sync finished: {} copied, {} skipped, {} deleted, {} errors in {:?}",
            stats.files_copied(),
            stats.files_skipped,
            stats.files_deleted,
            stats.errors,
            stats.duration
        );
        sink.on_complete(&stats);

        SyncReport {
            request_id,
            stats,
            dry_run: options.dry_run,
        }
    }

    /// Run only the forward reconciliation phase
    pub fn reconcile<S: EventSink + ?Sized>(&self, request: &SyncRequest, sink: &mut S) -> SyncStats {
        let mut reporter = Reporter::new(sink);
        reporter.phase(SyncPhase::Reconcile);
        ForwardReconciler::new(&self.fs, request.options.compare_mode, request.options.dry_run).run(
            &request.source,
            &request.destination,
            &mut reporter,
        );
        reporter.into_stats()
    }

    /// Run only the orphan pruning phase, regardless of `delete_missing`
    pub fn prune<S: EventSink + ?Sized>(&self, request: &SyncRequest, sink: &mut S) -> SyncStats {
        let mut reporter = Reporter::new(sink);
        reporter.phase(SyncPhase::Prune);
        OrphanPruner::new(&self.fs, request.options.dry_run).run(
            &request.source,
            &request.destination,
            &mut reporter,
        );
        reporter.into_stats()
    }

    fn run_phases<S: EventSink + ?Sized>(
        &self,
        source: &Path,
        destination: &Path,
        options: &SyncOptions,
        reporter: &mut Reporter<'_, S>,
    ) {
        reporter.phase(SyncPhase::Reconcile);
        ForwardReconciler::new(&self.fs, options.compare_mode, options.dry_run).run(
            source,
            destination,
            reporter,
        );

        if options.delete_missing {
            reporter.phase(SyncPhase::Prune);
            OrphanPruner::new(&self.fs, options.dry_run).run(source, destination, reporter);
        }
    }
}
