//! Event reporting shared by both phases

use tracing::{debug, warn};
use treesync_types::{EventSink, OutcomeEvent, SyncPhase, SyncStats};

/// Counts, logs and forwards outcome events to a sink
pub struct Reporter<'a, S: EventSink + ?Sized> {
    sink: &'a mut S,
    stats: SyncStats,
}

impl<'a, S: EventSink + ?Sized> Reporter<'a, S> {
    /// Wrap `sink`
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            stats: SyncStats::new(),
        }
    }

    /// Announce that `phase` is starting
    pub fn phase(&mut self, phase: SyncPhase) {
        debug!("Starting {} phase", phase.as_str());
        self.sink.on_phase(phase);
    }

    /// Record and forward one event
    pub fn emit(&mut self, event: OutcomeEvent) {
        match &event.error {
            Some(error) => warn!(
                phase = event.phase.as_str(),
                kind = error.kind.as_str(),
                "{}: {}",
                event.path.display(),
                error.message
            ),
            None => debug!(
                phase = event.phase.as_str(),
                action = event.action.as_str(),
                dry_run = event.dry_run,
                bytes = event.bytes,
                "{}",
                event.path.display()
            ),
        }

        self.stats.record(&event);
        self.sink.on_event(&event);
    }

    /// Add content digests to the counters
    pub fn add_digests(&mut self, count: u64) {
        self.stats.digests_computed += count;
    }

    /// Consume the reporter, returning its counters
    pub fn into_stats(self) -> SyncStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treesync_types::{Error, SyncAction};

    #[test]
    fn test_emit_forwards_and_counts() {
        let mut events: Vec<OutcomeEvent> = Vec::new();
        let mut reporter = Reporter::new(&mut events);

        reporter.emit(
            OutcomeEvent::new(SyncPhase::Reconcile, "a.txt", SyncAction::CopiedNew).with_bytes(7),
        );
        reporter.emit(OutcomeEvent::failed(
            SyncPhase::Prune,
            "b.txt",
            &Error::other("nope"),
        ));
        reporter.add_digests(2);
        let stats = reporter.into_stats();

        assert_eq!(stats.files_created, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.bytes_copied, 7);
        assert_eq!(stats.digests_computed, 2);
        assert_eq!(events.len(), 2);
        assert!(events[1].is_error());
    }
}
