// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick change collection.
//!
//! Each dirty channel is drained once per tick:
//!
//! 1. **GEOMETRY** / **VISIBILITY**: Drain the affected set, which includes
//!    every descendant of a marked node.
//! 2. **FRAME**: Drain the locally marked nodes (frame advances and
//!    animation edits).
//! 3. **TOPOLOGY**: Drain and discard; the `topology_changed` flag and the
//!    lifecycle lists carry the structural information.
//!
//! [`SceneChanges`] uses raw slot indices (`u32`) rather than
//! [`NodeId`](super::NodeId) handles, matching what
//! [`NodeId::index`](super::NodeId::index) reports.

use alloc::vec::Vec;

use super::store::Scene;
use crate::dirty;

/// The set of changes collected by a single [`Scene::take_changes`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneChanges {
    /// Nodes whose position, extent, rotation, or inherited placement changed.
    pub geometry: Vec<u32>,
    /// Nodes whose own or inherited visibility was touched.
    pub visibility: Vec<u32>,
    /// Nodes whose animation frame advanced or whose animation was edited.
    pub frames: Vec<u32>,
    /// Nodes created since the last drain.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last drain.
    pub removed: Vec<u32>,
    /// Whether any parent/child relationship changed.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.visibility.clear();
        self.frames.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
            && self.visibility.is_empty()
            && self.frames.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl Scene {
    /// Drains every dirty channel and returns what changed since the last
    /// drain.
    pub fn take_changes(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a
    /// caller-provided buffer.
    pub fn take_changes_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        changes.topology_changed = self.topology_dirty;
        self.topology_dirty = false;

        changes.geometry = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();

        changes.visibility = self
            .dirty
            .drain(dirty::VISIBILITY)
            .affected()
            .deterministic()
            .run()
            .collect();

        changes.frames = self
            .dirty
            .drain(dirty::FRAME)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        // Slots freed since the last drain report only as `removed`.
        for list in [
            &mut changes.geometry,
            &mut changes.visibility,
            &mut changes.frames,
        ] {
            list.retain(|idx| !self.free_list.contains(idx));
        }

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Size;

    use super::*;

    #[test]
    fn first_drain_reports_creation() {
        let mut scene = Scene::new();
        let a = scene.create_group();
        let b = scene.create_group();
        let changes = scene.take_changes();
        assert!(changes.topology_changed);
        assert_eq!(changes.added, vec![a.index(), b.index()]);

        let changes = scene.take_changes();
        assert!(changes.is_empty());
    }

    #[test]
    fn geometry_propagates_to_descendants() {
        let mut scene = Scene::new();
        let root = scene.create_group();
        let child = scene.create_group();
        let grandchild = scene.create_group();
        scene.add_child(root, child).unwrap();
        scene.add_child(child, grandchild).unwrap();
        scene.take_changes();

        scene.set_x(root, 5.0);
        let changes = scene.take_changes();
        assert!(changes.geometry.contains(&root.index()));
        assert!(changes.geometry.contains(&child.index()));
        assert!(changes.geometry.contains(&grandchild.index()));
        assert!(!changes.topology_changed);
    }

    #[test]
    fn unchanged_position_is_not_reported() {
        let mut scene = Scene::new();
        let node = scene.create_group();
        scene.take_changes();
        scene.set_x(node, 0.0);
        assert!(scene.take_changes().geometry.is_empty());

        scene.set_size(node, Size::new(4.0, 4.0));
        assert_eq!(scene.take_changes().geometry, vec![node.index()]);
    }

    #[test]
    fn visibility_is_reported_even_when_unchanged() {
        let mut scene = Scene::new();
        let node = scene.create_group();
        scene.take_changes();
        scene.set_visible(node, true);
        assert_eq!(scene.take_changes().visibility, vec![node.index()]);
    }

    #[test]
    fn animation_edits_are_frame_changes() {
        let mut scene = Scene::new();
        let layer = scene.create_layer();
        scene.take_changes();
        if let Some(anim) = scene.animation_mut(layer) {
            anim.set_animations_after_move(2);
        }
        let changes = scene.take_changes();
        assert_eq!(changes.frames, vec![layer.index()]);
        assert!(changes.geometry.is_empty());
    }

    #[test]
    fn destroyed_nodes_are_reported_and_not_drained() {
        let mut scene = Scene::new();
        let root = scene.create_group();
        let child = scene.create_group();
        scene.add_child(root, child).unwrap();
        scene.take_changes();

        scene.set_x(child, 1.0);
        scene.destroy_node(child).unwrap();
        let changes = scene.take_changes();
        assert_eq!(changes.removed, vec![child.index()]);
        assert!(!changes.geometry.contains(&child.index()));
        assert!(changes.topology_changed);
    }

    #[test]
    fn take_changes_into_reuses_buffer() {
        let mut scene = Scene::new();
        scene.create_group();
        let mut changes = SceneChanges::default();
        scene.take_changes_into(&mut changes);
        assert_eq!(changes.added.len(), 1);
        scene.take_changes_into(&mut changes);
        assert!(changes.is_empty());
    }
}
