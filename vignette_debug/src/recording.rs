// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless surface that records commands.
//!
//! [`RecordingSurface`] implements [`Surface`] by appending every call to a
//! command list. Tests assert on the list directly; tools export it with
//! [`RecordingSurface::to_json`].

use kurbo::{Rect, Size};
use serde_json::{Value, json};
use vignette_core::surface::{DrawImage, Surface};

/// One recorded surface call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceCommand {
    /// A [`clear_region`](Surface::clear_region) call.
    Clear(Rect),
    /// A [`draw_image_region`](Surface::draw_image_region) call.
    Draw(DrawImage),
}

impl SurfaceCommand {
    /// Returns the command as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Clear(region) => json!({
                "op": "clear",
                "region": rect_json(*region),
            }),
            Self::Draw(draw) => json!({
                "op": "draw",
                "image": draw.image.0,
                "src": rect_json(draw.src),
                "dst": rect_json(draw.dst),
                "rotation": draw.rotation_degrees,
                "pivot": [draw.pivot.x, draw.pivot.y],
            }),
        }
    }
}

/// `[x, y, width, height]`, the order the 2D canvas API takes.
fn rect_json(rect: Rect) -> Value {
    json!([rect.x0, rect.y0, rect.width(), rect.height()])
}

/// A [`Surface`] that records commands instead of drawing.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: Size,
    commands: Vec<SurfaceCommand>,
}

impl RecordingSurface {
    /// Creates a surface of the given extent.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Returns every command recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Removes and returns the recorded commands.
    pub fn take_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Iterates over recorded draw commands.
    pub fn draws(&self) -> impl Iterator<Item = &DrawImage> {
        self.commands.iter().filter_map(|command| match command {
            SurfaceCommand::Draw(draw) => Some(draw),
            SurfaceCommand::Clear(_) => None,
        })
    }

    /// Returns the recorded commands as a JSON array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.commands.iter().map(SurfaceCommand::to_json).collect())
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear_region(&mut self, region: Rect) {
        self.commands.push(SurfaceCommand::Clear(region));
    }

    fn draw_image_region(&mut self, draw: &DrawImage) {
        self.commands.push(SurfaceCommand::Draw(*draw));
    }
}
