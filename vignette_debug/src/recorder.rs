// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event as a
//! [`RecordedEvent`]. [`RecorderSink::to_json`] exports the recording as a
//! JSON array of `{"event": ..., ...}` objects.

use serde::{Serialize, Serializer};
use vignette_core::trace::{FrameAdvanceEvent, PhaseEvent, PhaseKind, TickEvent, TraceSink};
use vignette_core::viewport::TickReport;

/// A recorded trace event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RecordedEvent {
    /// A tick began.
    TickBegin {
        /// Tick counter.
        frame_index: u64,
        /// Frame counter before the tick.
        frame_counter: u32,
        /// Whether the update pass runs.
        sprites_change: bool,
    },
    /// A phase began.
    PhaseBegin {
        /// Tick counter.
        frame_index: u64,
        /// Which phase.
        #[serde(serialize_with = "phase_name")]
        phase: PhaseKind,
    },
    /// A phase ended.
    PhaseEnd {
        /// Tick counter.
        frame_index: u64,
        /// Which phase.
        #[serde(serialize_with = "phase_name")]
        phase: PhaseKind,
    },
    /// A node advanced one animation frame.
    FrameAdvance {
        /// Slot index of the node.
        node: u32,
        /// Running state name.
        state: String,
        /// Column index after the advance.
        col_index: usize,
        /// Forced advances still pending.
        pending_movements: u32,
    },
    /// A tick completed.
    TickEnd {
        /// Tick counter.
        frame_index: u64,
        /// Frame counter after the tick.
        frame_counter: u32,
        /// Nodes that advanced.
        frames_advanced: usize,
        /// Nodes that drew.
        nodes_drawn: usize,
    },
}

fn phase_name<S: Serializer>(phase: &PhaseKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(phase.name())
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns the frame counter seen at the start of every recorded tick.
    #[must_use]
    pub fn frame_counters(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::TickBegin { frame_counter, .. } => Some(*frame_counter),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of recorded frame advances of `node`.
    #[must_use]
    pub fn advances_of(&self, node: u32) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, RecordedEvent::FrameAdvance { node: n, .. } if *n == node))
            .count()
    }

    /// Serializes the recording as a JSON array.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events)
    }
}

impl TraceSink for RecorderSink {
    fn on_tick_begin(&mut self, e: &TickEvent) {
        self.events.push(RecordedEvent::TickBegin {
            frame_index: e.frame_index,
            frame_counter: e.frame_counter,
            sprites_change: e.sprites_change,
        });
    }

    fn on_phase_begin(&mut self, e: &PhaseEvent) {
        self.events.push(RecordedEvent::PhaseBegin {
            frame_index: e.frame_index,
            phase: e.phase,
        });
    }

    fn on_phase_end(&mut self, e: &PhaseEvent) {
        self.events.push(RecordedEvent::PhaseEnd {
            frame_index: e.frame_index,
            phase: e.phase,
        });
    }

    fn on_frame_advance(&mut self, e: &FrameAdvanceEvent<'_>) {
        self.events.push(RecordedEvent::FrameAdvance {
            node: e.node,
            state: e.state.to_owned(),
            col_index: e.col_index,
            pending_movements: e.pending_movements,
        });
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        self.events.push(RecordedEvent::TickEnd {
            frame_index: report.frame_index,
            frame_counter: report.frame_counter,
            frames_advanced: report.frames_advanced,
            nodes_drawn: report.nodes_drawn,
        });
    }
}
