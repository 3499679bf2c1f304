// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output and scene dumps.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).
//! [`format_tree`] renders a scene subtree as indented text.

use std::fmt::Write as _;
use std::io::Write;

use vignette_core::node::{NodeId, Scene};
use vignette_core::trace::{FrameAdvanceEvent, PhaseEvent, TickEvent, TraceSink};
use vignette_core::viewport::TickReport;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick_begin(&mut self, e: &TickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} counter={} sprites={}",
            e.frame_index,
            e.frame_counter,
            if e.sprites_change { "change" } else { "hold" },
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}",
            e.frame_index,
            e.phase.name(),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}",
            e.frame_index,
            e.phase.name(),
        );
    }

    fn on_frame_advance(&mut self, e: &FrameAdvanceEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[advance] node={} state={} col={} pending={}",
            e.node, e.state, e.col_index, e.pending_movements,
        );
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        let _ = writeln!(
            self.writer,
            "[tick:end] frame={} counter={} advanced={} drawn={} geometry={} frames={}",
            report.frame_index,
            report.frame_counter,
            report.frames_advanced,
            report.nodes_drawn,
            report.changes.geometry.len(),
            report.changes.frames.len(),
        );
    }
}

/// Renders the subtree rooted at `root`, one node per line, children
/// indented by two spaces.
///
/// # Panics
///
/// Panics if `root` is stale.
#[must_use]
pub fn format_tree(scene: &Scene, root: NodeId) -> String {
    let mut out = String::new();
    write_node(scene, root, 0, &mut out);
    out
}

fn write_node(scene: &Scene, id: NodeId, depth: usize, out: &mut String) {
    let geometry = scene.geometry(id);
    let _ = write!(
        out,
        "{:indent$}{} #{} at ({}, {}) {}x{} {}",
        "",
        scene.kind(id).name(),
        id.index(),
        geometry.x,
        geometry.y,
        geometry.size.width,
        geometry.size.height,
        geometry.reference.as_str(),
        indent = depth * 2,
    );
    if geometry.rotation_degrees != 0.0 {
        let _ = write!(out, " rot={}", geometry.rotation_degrees);
    }
    if let Some(anim) = scene.animation(id) {
        if let Some(state) = anim.current_state() {
            let _ = write!(out, " state={state} col={}", anim.current_col_index());
        }
        if let Some(image) = anim.image() {
            let _ = write!(out, " image={}", image.0);
        }
    }
    if let Some(clock) = scene.frame_clock(id) {
        let _ = write!(
            out,
            " fps={} every={}",
            clock.fps(),
            clock.sprite_frames_in_same_value()
        );
    }
    if !scene.is_visible(id) {
        out.push_str(" hidden");
    }
    if scene.is_changed(id) {
        out.push_str(" dirty");
    }
    out.push('\n');
    for child in scene.children(id) {
        write_node(scene, child, depth + 1, out);
    }
}
