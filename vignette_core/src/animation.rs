// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sprite-sheet animation state machine.
//!
//! A sprite sheet is a grid of frames. A named [`AnimationCycle`] picks one
//! row and an ordered list of columns. [`SpriteAnimation`] tracks which cycle
//! is active, which column of it is showing, and how many forced frame
//! advances are still owed after a movement.
//!
//! The frame-advance rule is implemented by [`Animatable::advance`]: a
//! layer steps to its next column when it has an image and either its dirty
//! flag is set or it still has pending movements. Stepping clears the dirty
//! flag and consumes one pending movement.

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SceneError;
use crate::surface::{DrawImage, Drawable, ImageId, Placement, Surface};

/// One named animation cycle on the sprite sheet.
///
/// `row` selects `source_y = row * source_height`. `cols[i]` selects
/// `source_x = cols[i] * source_width` for the i-th frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationCycle {
    /// Sprite-sheet row shared by every frame of the cycle.
    pub row: u32,
    /// Sprite-sheet columns, in playback order.
    pub cols: Vec<u32>,
}

impl AnimationCycle {
    /// Creates a cycle from a row and its columns.
    #[must_use]
    pub fn new(row: u32, cols: impl Into<Vec<u32>>) -> Self {
        Self {
            row,
            cols: cols.into(),
        }
    }
}

/// Animation cycles keyed by state name.
pub type AnimationStates = BTreeMap<String, AnimationCycle>;

/// Parses a JSON animation descriptor: `{"name": {"row": 1, "cols": [0, 1]}}`.
///
/// # Errors
///
/// Returns [`SceneError::InvalidConfiguration`] if `value` does not match
/// the descriptor format.
pub fn states_from_json(value: &Value) -> Result<AnimationStates, SceneError> {
    AnimationStates::deserialize(value)
        .map_err(|err| SceneError::InvalidConfiguration(format!("option `states`: {err}")))
}

/// Something that advances its visual state once per update pass.
pub trait Animatable {
    /// Runs one frame-advance step.
    ///
    /// `changed` is the owning node's dirty flag. Implementations clear it
    /// when they consume it. Returns whether a frame advanced.
    ///
    /// # Errors
    ///
    /// Implementations report misconfiguration found while advancing.
    fn advance(&mut self, changed: &mut bool) -> Result<bool, SceneError>;
}

/// Sprite-sheet state carried by layer and sprite nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteAnimation {
    image: Option<ImageId>,
    source_x: f64,
    source_y: f64,
    source_width: f64,
    source_height: f64,
    states: AnimationStates,
    current_state: Option<String>,
    current_col_index: usize,
    animations_after_move: u32,
    pending_movements: u32,
}

impl Default for SpriteAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteAnimation {
    /// Creates an animation with no image, no states, and a 100×100 source
    /// rectangle at the sheet origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            image: None,
            source_x: 0.0,
            source_y: 0.0,
            source_width: 100.0,
            source_height: 100.0,
            states: AnimationStates::new(),
            current_state: None,
            current_col_index: 0,
            animations_after_move: 0,
            pending_movements: 0,
        }
    }

    // -- Getters --

    /// Returns the sprite-sheet image, if any.
    #[must_use]
    pub fn image(&self) -> Option<ImageId> {
        self.image
    }

    /// Returns the currently drawn source rectangle in sheet pixels.
    #[must_use]
    pub fn source_rect(&self) -> Rect {
        Rect::new(
            self.source_x,
            self.source_y,
            self.source_x + self.source_width,
            self.source_y + self.source_height,
        )
    }

    /// Returns the size of one sprite-sheet cell.
    #[must_use]
    pub fn source_size(&self) -> Size {
        Size::new(self.source_width, self.source_height)
    }

    /// Returns all configured cycles.
    #[must_use]
    pub fn states(&self) -> &AnimationStates {
        &self.states
    }

    /// Returns the active cycle's name, or `None` before one is set.
    #[must_use]
    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    /// Returns the index into the active cycle's `cols`.
    #[must_use]
    pub fn current_col_index(&self) -> usize {
        self.current_col_index
    }

    /// Returns how many forced advances each movement schedules.
    #[must_use]
    pub fn animations_after_move(&self) -> u32 {
        self.animations_after_move
    }

    /// Returns how many forced advances are still owed.
    #[must_use]
    pub fn pending_movements(&self) -> u32 {
        self.pending_movements
    }

    // -- Setters --

    /// Sets the sprite-sheet image. `None` stops the layer from animating
    /// and drawing.
    pub fn set_image(&mut self, image: Option<ImageId>) {
        self.image = image;
    }

    /// Overrides the source origin in sheet pixels. The next frame advance
    /// or state switch recomputes it.
    pub fn set_source_origin(&mut self, x: f64, y: f64) {
        self.source_x = x;
        self.source_y = y;
    }

    /// Sets the size of one sprite-sheet cell.
    pub fn set_source_size(&mut self, size: Size) {
        self.source_width = size.width;
        self.source_height = size.height;
    }

    /// Replaces every cycle. The active state name is kept even if the new
    /// set no longer contains it; the next advance then reports it.
    ///
    /// If the active cycle shrank past the column index, playback restarts
    /// at its first column.
    pub fn set_states(&mut self, states: AnimationStates) {
        self.states = states;
        self.clamp_col_index();
    }

    /// Adds or replaces one cycle. Same restart rule as
    /// [`set_states`](Self::set_states).
    pub fn insert_state(&mut self, name: impl Into<String>, cycle: AnimationCycle) {
        self.states.insert(name.into(), cycle);
        self.clamp_col_index();
    }

    /// Switches the active cycle and moves the source rectangle to its row.
    ///
    /// Switching to the already active state does nothing. The column index
    /// carries over so cycles of equal length continue seamlessly. It
    /// restarts at 0 when it would fall outside the new cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidState`] if `name` is not a configured
    /// state.
    pub fn set_current_state(&mut self, name: &str) -> Result<(), SceneError> {
        if self.current_state.as_deref() == Some(name) {
            return Ok(());
        }
        let cycle = self
            .states
            .get(name)
            .ok_or_else(|| SceneError::InvalidState(name.to_owned()))?;
        self.source_y = f64::from(cycle.row) * self.source_height;
        if self.current_col_index >= cycle.cols.len() {
            self.current_col_index = 0;
        }
        self.current_state = Some(name.to_owned());
        Ok(())
    }

    /// Sets how many forced advances each movement schedules.
    pub fn set_animations_after_move(&mut self, value: u32) {
        self.animations_after_move = value;
    }

    /// Restarts the active cycle if the column index fell outside it.
    fn clamp_col_index(&mut self) {
        let Some(cycle) = self
            .current_state
            .as_deref()
            .and_then(|name| self.states.get(name))
        else {
            return;
        };
        if self.current_col_index < cycle.cols.len() {
            return;
        }
        self.current_col_index = 0;
        if let Some(&col) = cycle.cols.first() {
            self.source_x = f64::from(col) * self.source_width;
        }
    }

    /// Schedules [`animations_after_move`](Self::animations_after_move)
    /// forced advances. Called on every movement command.
    pub(crate) fn schedule_movement(&mut self) {
        self.pending_movements = self.animations_after_move;
    }

    // -- JSON views --

    /// Returns the declared field named `key` as JSON.
    pub(crate) fn declared_value(&self, key: &str) -> Option<Value> {
        Some(match key {
            "image" => self.image.map_or(Value::Null, |id| Value::from(id.0)),
            "sourceX" => Value::from(self.source_x),
            "sourceY" => Value::from(self.source_y),
            "sourceWidth" => Value::from(self.source_width),
            "sourceHeight" => Value::from(self.source_height),
            "states" => serde_json::to_value(&self.states).unwrap_or(Value::Null),
            "currentState" => self
                .current_state
                .as_deref()
                .map_or(Value::Null, Value::from),
            "animationsAfterMove" => Value::from(self.animations_after_move),
            _ => return None,
        })
    }
}

impl Animatable for SpriteAnimation {
    fn advance(&mut self, changed: &mut bool) -> Result<bool, SceneError> {
        if self.image.is_none() || !(*changed || self.pending_movements > 0) {
            return Ok(false);
        }
        // Nothing to cycle through yet.
        let Some(name) = self.current_state.as_deref() else {
            return Ok(false);
        };
        let cycle = self
            .states
            .get(name)
            .ok_or_else(|| SceneError::InvalidState(name.to_owned()))?;
        if cycle.cols.is_empty() {
            return Err(SceneError::InvalidConfiguration(format!(
                "animation state `{name}` has no columns"
            )));
        }

        self.current_col_index += 1;
        if self.current_col_index >= cycle.cols.len() {
            self.current_col_index = 0;
        }
        self.source_x = f64::from(cycle.cols[self.current_col_index]) * self.source_width;
        *changed = false;
        self.pending_movements = self.pending_movements.saturating_sub(1);
        log::trace!(
            "advanced `{name}` to column index {}",
            self.current_col_index
        );
        Ok(true)
    }
}

impl Drawable for SpriteAnimation {
    fn draw(&self, placement: &Placement, surface: &mut dyn Surface) -> bool {
        let Some(image) = self.image else {
            return false;
        };
        surface.draw_image_region(&DrawImage {
            image,
            src: self.source_rect(),
            dst: placement.bounds,
            rotation_degrees: placement.rotation_degrees,
            pivot: placement.anchor,
        });
        true
    }
}
