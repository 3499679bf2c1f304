// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for vignette diagnostics.
//!
//! This crate provides development and post-mortem tooling:
//!
//! - [`recording::RecordingSurface`]: a headless
//!   [`Surface`](vignette_core::surface::Surface) that keeps every command.
//! - [`recorder::RecorderSink`]: a
//!   [`TraceSink`](vignette_core::trace::TraceSink) that keeps every event.
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`pretty::format_tree`]: an indented dump of a scene tree.

pub mod pretty;
pub mod recorder;
pub mod recording;
