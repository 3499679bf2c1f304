// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The two tree passes of a redraw tick.
//!
//! - **update** walks the subtree pre-order and asks every node to advance
//!   its animation. Only layers and sprites with an image, a current state,
//!   and either the dirty flag or a pending forced advance actually move.
//! - **refresh** walks the subtree pre-order and draws every visible node
//!   into the surface. An invisible node hides its whole subtree. Children
//!   are placed relative to their parent's reference point.
//!
//! Both walks keep an explicit stack, so tree depth is bounded by memory
//! rather than by the call stack.

use alloc::vec::Vec;

use kurbo::Point;

use super::id::{INVALID, NodeId};
use super::store::Scene;
use crate::animation::Animatable;
use crate::dirty;
use crate::error::SceneError;
use crate::surface::{Drawable, Surface};
use crate::trace::{FrameAdvanceEvent, Tracer};

impl Scene {
    /// Advances animations in the subtree rooted at `root` and returns how
    /// many nodes moved to a new frame.
    ///
    /// Invisible nodes still advance.
    ///
    /// # Errors
    ///
    /// Returns the first error any node reported. Every other node in the
    /// subtree is still visited and keeps its advance.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn update(&mut self, root: NodeId) -> Result<usize, SceneError> {
        self.update_traced(root, &mut Tracer::none())
    }

    /// Like [`update`](Self::update), reporting each advance to `tracer`.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn update_traced(
        &mut self,
        root: NodeId,
        tracer: &mut Tracer<'_>,
    ) -> Result<usize, SceneError> {
        let mut first_error = None;
        let advanced = self.update_collecting(root, tracer, &mut first_error);
        match first_error {
            Some(err) => Err(err),
            None => Ok(advanced),
        }
    }

    /// Runs the update pass over the whole subtree, storing the first error
    /// in `first_error` instead of stopping at it.
    pub(crate) fn update_collecting(
        &mut self,
        root: NodeId,
        tracer: &mut Tracer<'_>,
        first_error: &mut Option<SceneError>,
    ) -> usize {
        self.validate(root);
        let mut advanced = 0;
        let mut stack = alloc::vec![root.idx];
        while let Some(idx) = stack.pop() {
            let i = idx as usize;
            match self.kind[i].advance(&mut self.changed[i]) {
                Ok(true) => {
                    advanced += 1;
                    self.dirty.mark(idx, dirty::FRAME);
                    if let Some(anim) = self.kind[i].animation() {
                        tracer.frame_advance(&FrameAdvanceEvent {
                            node: idx,
                            state: anim.current_state().unwrap_or_default(),
                            col_index: anim.current_col_index(),
                            pending_movements: anim.pending_movements(),
                        });
                    }
                }
                Ok(false) => {}
                Err(err) => {
                    log::debug!("node {idx} failed to advance: {err}");
                    if first_error.is_none() {
                        *first_error = Some(err);
                    }
                }
            }
            self.push_children_reversed(idx, &mut stack);
        }
        advanced
    }

    /// Draws the subtree rooted at `root` into `surface` in paint order and
    /// returns how many nodes issued a draw command.
    ///
    /// Draws nothing if `root` or any of its ancestors is invisible.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn refresh(&self, root: NodeId, surface: &mut dyn Surface) -> usize {
        if !self.is_effectively_visible(root) {
            return 0;
        }
        let p = self.parent[root.idx as usize];
        let parent_anchor = if p == INVALID {
            Point::ORIGIN
        } else {
            self.anchor_of(p)
        };

        let mut drawn = 0;
        let mut stack = alloc::vec![(root.idx, parent_anchor)];
        let mut children = Vec::new();
        while let Some((idx, parent_anchor)) = stack.pop() {
            let i = idx as usize;
            if !self.visible[i] {
                continue;
            }
            let placement = self.geometry[i].place(parent_anchor);
            drawn += usize::from(self.kind[i].draw(&placement, surface));

            children.clear();
            self.push_children_reversed(idx, &mut children);
            stack.extend(children.iter().map(|&child| (child, placement.anchor)));
        }
        drawn
    }

    /// Pushes the children of `idx` so that popping yields paint order.
    fn push_children_reversed(&self, idx: u32, stack: &mut Vec<u32>) {
        let start = stack.len();
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            stack.push(child);
            child = self.next_sibling[child as usize];
        }
        stack[start..].reverse();
    }
}
