// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks for the redraw tick.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Viewport`](crate::viewport::Viewport) calls at each stage of a tick. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. Each method performs a
//! single `Option` branch before dispatching.

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::viewport::TickReport;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the redraw tick is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Sprite frame advance over the whole tree.
    Update,
    /// Clearing the surface.
    Clear,
    /// Drawing the tree.
    Refresh,
}

impl PhaseKind {
    /// Returns a short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Clear => "clear",
            Self::Refresh => "refresh",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a redraw tick begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickEvent {
    /// Monotonic tick counter, starting at 0.
    pub frame_index: u64,
    /// The viewport's frame counter before this tick increments it.
    pub frame_counter: u32,
    /// Whether sprites advance on this tick.
    pub sprites_change: bool,
}

/// Marks the beginning or end of a tick phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Which phase.
    pub phase: PhaseKind,
}

/// Emitted when a layer or sprite advances one animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameAdvanceEvent<'a> {
    /// Slot index of the node.
    pub node: u32,
    /// Name of the running animation state.
    pub state: &'a str,
    /// Column index after the advance.
    pub col_index: usize,
    /// Forced advances still pending after this one.
    pub pending_movements: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the redraw tick.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a tick begins.
    fn on_tick_begin(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called at the beginning of a tick phase.
    fn on_phase_begin(&mut self, e: &PhaseEvent) {
        _ = e;
    }

    /// Called at the end of a tick phase.
    fn on_phase_end(&mut self, e: &PhaseEvent) {
        _ = e;
    }

    /// Called for every sprite frame advance.
    fn on_frame_advance(&mut self, e: &FrameAdvanceEvent<'_>) {
        _ = e;
    }

    /// Called with the report of a completed tick.
    fn on_tick_end(&mut self, report: &TickReport) {
        _ = report;
    }
}

/// Shared sinks, so a caller can keep a handle to a sink the viewport owns.
impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_tick_begin(&mut self, e: &TickEvent) {
        self.borrow_mut().on_tick_begin(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseEvent) {
        self.borrow_mut().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEvent) {
        self.borrow_mut().on_phase_end(e);
    }

    fn on_frame_advance(&mut self, e: &FrameAdvanceEvent<'_>) {
        self.borrow_mut().on_frame_advance(e);
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        self.borrow_mut().on_tick_end(report);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("active", &self.sink.is_some())
            .finish()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Emits a [`TickEvent`].
    #[inline]
    pub fn tick_begin(&mut self, e: &TickEvent) {
        if let Some(s) = &mut self.sink {
            s.on_tick_begin(e);
        }
    }

    /// Emits a phase-begin [`PhaseEvent`].
    #[inline]
    pub fn phase_begin(&mut self, frame_index: u64, phase: PhaseKind) {
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(&PhaseEvent { frame_index, phase });
        }
    }

    /// Emits a phase-end [`PhaseEvent`].
    #[inline]
    pub fn phase_end(&mut self, frame_index: u64, phase: PhaseKind) {
        if let Some(s) = &mut self.sink {
            s.on_phase_end(&PhaseEvent { frame_index, phase });
        }
    }

    /// Emits a [`FrameAdvanceEvent`].
    #[inline]
    pub fn frame_advance(&mut self, e: &FrameAdvanceEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_frame_advance(e);
        }
    }

    /// Emits the tick report.
    #[inline]
    pub fn tick_end(&mut self, report: &TickReport) {
        if let Some(s) = &mut self.sink {
            s.on_tick_end(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct Phases(Vec<(bool, PhaseKind)>);

    impl TraceSink for Phases {
        fn on_phase_begin(&mut self, e: &PhaseEvent) {
            self.0.push((true, e.phase));
        }

        fn on_phase_end(&mut self, e: &PhaseEvent) {
            self.0.push((false, e.phase));
        }
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let mut sink = Phases::default();
        let mut tracer = Tracer::new(&mut sink);
        tracer.phase_begin(0, PhaseKind::Update);
        tracer.phase_end(0, PhaseKind::Update);
        assert_eq!(
            sink.0,
            [(true, PhaseKind::Update), (false, PhaseKind::Update)]
        );
    }

    #[test]
    fn tracer_none_is_silent() {
        let mut tracer = Tracer::none();
        tracer.phase_begin(3, PhaseKind::Clear);
        tracer.frame_advance(&FrameAdvanceEvent {
            node: 0,
            state: "walk",
            col_index: 1,
            pending_movements: 0,
        });
    }

    #[test]
    fn shared_sink_forwards() {
        let shared = Rc::new(RefCell::new(Phases::default()));
        let mut handle = Rc::clone(&shared);
        let mut tracer = Tracer::new(&mut handle);
        tracer.phase_begin(1, PhaseKind::Refresh);
        assert_eq!(shared.borrow().0, [(true, PhaseKind::Refresh)]);
    }
}
