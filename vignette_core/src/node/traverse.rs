// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::Scene;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`Scene::children`].
#[derive(Debug)]
pub struct Children<'a> {
    scene: &'a Scene,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(scene: &'a Scene, first: u32) -> Self {
        Self {
            scene,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.next_sibling[idx as usize];
        Some(NodeId {
            idx,
            generation: self.scene.generation[idx as usize],
        })
    }
}

/// An iterator from a node's parent up to its root.
///
/// Created by [`Scene::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    scene: &'a Scene,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(scene: &'a Scene, start: u32) -> Self {
        Self {
            scene,
            current: scene.parent[start as usize],
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.parent[idx as usize];
        Some(NodeId {
            idx,
            generation: self.scene.generation[idx as usize],
        })
    }
}
