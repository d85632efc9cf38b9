//! Core traits for treesync operations
//!
//! The engine reports everything it does through an [`EventSink`]. Presentation
//! layers (terminal output, JSON lines, test collectors) implement it.

use crate::{OutcomeEvent, SyncPhase, SyncStats};

/// Receiver of per-file outcome events
pub trait EventSink {
    /// Report the outcome for one file
    fn on_event(&mut self, event: &OutcomeEvent);

    /// Report that a phase is starting
    fn on_phase(&mut self, _phase: SyncPhase) {}

    /// Report completion of the run
    fn on_complete(&mut self, _stats: &SyncStats) {}
}

impl EventSink for Vec<OutcomeEvent> {
    fn on_event(&mut self, event: &OutcomeEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_event(&mut self, event: &OutcomeEvent) {
        (**self).on_event(event);
    }

    fn on_phase(&mut self, phase: SyncPhase) {
        (**self).on_phase(phase);
    }

    fn on_complete(&mut self, stats: &SyncStats) {
        (**self).on_complete(stats);
    }
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &OutcomeEvent) {}
}

/// Sink backed by a closure
pub struct FnSink<F>(pub F);

impl<F: FnMut(&OutcomeEvent)> EventSink for FnSink<F> {
    fn on_event(&mut self, event: &OutcomeEvent) {
        (self.0)(event);
    }
}
