// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::vec::Vec;

use kurbo::{Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::animation::SpriteAnimation;
use crate::dirty;
use crate::entity::Extras;
use crate::error::SceneError;
use crate::viewport::FrameClock;

use super::id::{INVALID, NodeId};
use super::kind::{Geometry, NodeKind, Position, PositionReference};
use super::traverse::{Ancestors, Children};

/// Struct-of-arrays storage for a scene tree.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Every node has at most one parent, and children are kept in paint order:
/// lower indices are drawn first, so later siblings paint over earlier ones.
#[derive(Debug)]
pub struct Scene {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) geometry: Vec<Geometry>,
    pub(crate) visible: Vec<bool>,
    pub(crate) dynamic: Vec<bool>,
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) extras: Vec<Extras>,

    // -- Animation gate (set by geometry setters, cleared by frame advance) --
    pub(crate) changed: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) topology_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            geometry: Vec::new(),
            visible: Vec::new(),
            dynamic: Vec::new(),
            kind: Vec::new(),
            extras: Vec::new(),
            changed: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            topology_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a detached node of the given kind and returns its handle.
    ///
    /// The node starts visible at `(0, 0)` with a 100×100 extent, no
    /// rotation, a [`Center`](PositionReference::Center) reference, and no
    /// parent. Layers and sprites start dirty.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let changed = kind.starts_changed();
        let name = kind.name();
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.geometry[i] = Geometry::default();
            self.visible[i] = true;
            self.dynamic[i] = false;
            self.kind[i] = kind;
            self.extras[i] = Extras::new();
            self.changed[i] = changed;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.geometry.push(Geometry::default());
            self.visible.push(true);
            self.dynamic.push(false);
            self.kind.push(kind);
            self.extras.push(Extras::new());
            self.changed.push(changed);
            self.generation.push(0);
            idx
        };

        self.topology_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        log::trace!("created {name} node at slot {idx}");

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a plain grouping node.
    pub fn create_group(&mut self) -> NodeId {
        self.create_node(NodeKind::Group)
    }

    /// Creates an animated layer.
    pub fn create_layer(&mut self) -> NodeId {
        self.create_node(NodeKind::layer())
    }

    /// Creates a sprite.
    pub fn create_sprite(&mut self) -> NodeId {
        self.create_node(NodeKind::sprite())
    }

    /// Destroys a node together with its entire subtree, freeing their
    /// slots for reuse.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::RootNotDestroyable`] if `id` is a viewport root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.validate(id);
        if matches!(self.kind[id.idx as usize], NodeKind::Viewport(_)) {
            return Err(SceneError::RootNotDestroyable(id));
        }
        if self.parent[id.idx as usize] != INVALID {
            self.detach(id.idx);
        }

        let mut stack = alloc::vec![id.idx];
        while let Some(idx) = stack.pop() {
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            self.free_slot(idx);
        }
        self.topology_dirty = true;
        Ok(())
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Appends `child` as the last child of `parent`.
    ///
    /// If `child` already has a parent it is moved: a node is owned by
    /// exactly one parent.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::CycleDetected`] if `child` is `parent` or one of
    /// its ancestors, and [`SceneError::RootNotAttachable`] if `child` is a
    /// viewport root.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.attach(parent, child, None)
    }

    /// Inserts `child` among `parent`'s children at `position`, shifting
    /// later children. A `position` at or past the end appends.
    ///
    /// # Errors
    ///
    /// Same as [`add_child`](Self::add_child).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        position: usize,
    ) -> Result<(), SceneError> {
        self.attach(parent, child, Some(position))
    }

    /// Inserts `child` directly before `sibling` under `sibling`'s parent.
    ///
    /// # Errors
    ///
    /// Same as [`add_child`](Self::add_child).
    ///
    /// # Panics
    ///
    /// Panics if handles are stale or `sibling` has no parent.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) -> Result<(), SceneError> {
        self.validate(child);
        self.validate(sibling);
        assert!(
            self.parent[sibling.idx as usize] != INVALID,
            "sibling has no parent"
        );
        if child == sibling {
            return Ok(());
        }
        let p = self.parent[sibling.idx as usize];
        let parent = NodeId {
            idx: p,
            generation: self.generation[p as usize],
        };
        self.check_attachable(parent, child)?;

        if self.parent[child.idx as usize] != INVALID {
            self.detach(child.idx);
        }
        self.link(p, child.idx, sibling.idx);
        Ok(())
    }

    /// Detaches `child` from its parent. The node stays alive as a root and
    /// can be attached again.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] != INVALID,
            "node has no parent"
        );
        self.detach(child.idx);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(NodeId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a node, in paint
    /// order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Returns an iterator from the node's parent up to its root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, id.idx)
    }

    /// Returns the live nodes that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| NodeId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the node's kind and its variant state.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the local geometry.
    #[must_use]
    pub fn geometry(&self, id: NodeId) -> Geometry {
        self.validate(id);
        self.geometry[id.idx as usize]
    }

    /// Returns the horizontal position.
    #[must_use]
    pub fn x(&self, id: NodeId) -> f64 {
        self.geometry(id).x
    }

    /// Returns the vertical position.
    #[must_use]
    pub fn y(&self, id: NodeId) -> f64 {
        self.geometry(id).y
    }

    /// Returns the extent.
    #[must_use]
    pub fn size(&self, id: NodeId) -> Size {
        self.geometry(id).size
    }

    /// Returns the rotation in degrees.
    #[must_use]
    pub fn rotation(&self, id: NodeId) -> f64 {
        self.geometry(id).rotation_degrees
    }

    /// Returns which point of the bounding box `(x, y)` denotes.
    #[must_use]
    pub fn position_reference(&self, id: NodeId) -> PositionReference {
        self.geometry(id).reference
    }

    /// Returns a snapshot of the position and its reference.
    #[must_use]
    pub fn current_position(&self, id: NodeId) -> Position {
        let geometry = self.geometry(id);
        Position {
            x: geometry.x,
            y: geometry.y,
            reference: geometry.reference,
        }
    }

    /// Returns the node's own visibility, ignoring ancestors.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Returns whether the node and all of its ancestors are visible.
    #[must_use]
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        self.is_visible(id) && self.ancestors(id).all(|a| self.visible[a.idx as usize])
    }

    /// Returns whether the node is expected to change every frame.
    #[must_use]
    pub fn is_dynamic(&self, id: NodeId) -> bool {
        self.validate(id);
        self.dynamic[id.idx as usize]
    }

    /// Returns the node's dirty flag: whether geometry changed since the
    /// node's last frame advance.
    #[must_use]
    pub fn is_changed(&self, id: NodeId) -> bool {
        self.validate(id);
        self.changed[id.idx as usize]
    }

    /// Returns the reference point in the coordinate space of the node's
    /// root.
    #[must_use]
    pub fn world_anchor(&self, id: NodeId) -> Point {
        self.validate(id);
        self.anchor_of(id.idx)
    }

    /// Returns the animation state of a layer or sprite.
    #[must_use]
    pub fn animation(&self, id: NodeId) -> Option<&SpriteAnimation> {
        self.kind(id).animation()
    }

    /// Returns the frame clock of a viewport root.
    #[must_use]
    pub fn frame_clock(&self, id: NodeId) -> Option<&FrameClock> {
        self.kind(id).frame_clock()
    }

    /// Returns the node's user-defined properties.
    #[must_use]
    pub fn extras(&self, id: NodeId) -> &Extras {
        self.validate(id);
        &self.extras[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the horizontal position.
    ///
    /// Sets the dirty flag only if the value differs. On layers and sprites
    /// every call, changed or not, schedules
    /// [`animations_after_move`](SpriteAnimation::animations_after_move)
    /// forced frame advances.
    pub fn set_x(&mut self, id: NodeId, value: f64) {
        self.validate(id);
        let i = id.idx as usize;
        if self.geometry[i].x != value {
            self.geometry[i].x = value;
            self.changed[i] = true;
            self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
        }
        self.schedule_movement(i);
    }

    /// Sets the vertical position. Same dirty rules as [`set_x`](Self::set_x).
    pub fn set_y(&mut self, id: NodeId, value: f64) {
        self.validate(id);
        let i = id.idx as usize;
        if self.geometry[i].y != value {
            self.geometry[i].y = value;
            self.changed[i] = true;
            self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
        }
        self.schedule_movement(i);
    }

    /// Sets the node's own visibility.
    ///
    /// Always sets the dirty flag, even when the value is unchanged.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        let i = id.idx as usize;
        self.visible[i] = visible;
        self.changed[i] = true;
        self.dirty.mark_with(id.idx, dirty::VISIBILITY, &EagerPolicy);
    }

    /// Sets the extent.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        self.validate(id);
        self.geometry[id.idx as usize].size = size;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the width, keeping the height.
    pub fn set_width(&mut self, id: NodeId, width: f64) {
        let height = self.size(id).height;
        self.set_size(id, Size::new(width, height));
    }

    /// Sets the height, keeping the width.
    pub fn set_height(&mut self, id: NodeId, height: f64) {
        let width = self.size(id).width;
        self.set_size(id, Size::new(width, height));
    }

    /// Sets the rotation around the reference point, in degrees.
    pub fn set_rotation(&mut self, id: NodeId, degrees: f64) {
        self.validate(id);
        self.geometry[id.idx as usize].rotation_degrees = degrees;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets which point of the bounding box `(x, y)` denotes.
    pub fn set_position_reference(&mut self, id: NodeId, reference: PositionReference) {
        self.validate(id);
        self.geometry[id.idx as usize].reference = reference;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Marks the node as expected to change every frame.
    pub fn set_dynamic(&mut self, id: NodeId, dynamic: bool) {
        self.validate(id);
        self.dynamic[id.idx as usize] = dynamic;
    }

    /// Returns the animation state of a layer or sprite for mutation.
    ///
    /// Marks the FRAME channel dirty.
    pub fn animation_mut(&mut self, id: NodeId) -> Option<&mut SpriteAnimation> {
        self.validate(id);
        let anim = self.kind[id.idx as usize].animation_mut()?;
        self.dirty.mark(id.idx, dirty::FRAME);
        Some(anim)
    }

    /// Returns the frame clock of a viewport root for mutation.
    pub fn frame_clock_mut(&mut self, id: NodeId) -> Option<&mut FrameClock> {
        self.validate(id);
        self.kind[id.idx as usize].frame_clock_mut()
    }

    /// Returns the node's user-defined properties for mutation.
    pub fn extras_mut(&mut self, id: NodeId) -> &mut Extras {
        self.validate(id);
        &mut self.extras[id.idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Sums parent-relative offsets from the root down to `idx`.
    pub(crate) fn anchor_of(&self, idx: u32) -> Point {
        let mut anchor = self.geometry[idx as usize].offset();
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            anchor += self.geometry[p as usize].offset().to_vec2();
            p = self.parent[p as usize];
        }
        anchor
    }

    fn schedule_movement(&mut self, i: usize) {
        if let Some(anim) = self.kind[i].animation_mut() {
            anim.schedule_movement();
        }
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if matches!(self.kind[child.idx as usize], NodeKind::Viewport(_)) {
            return Err(SceneError::RootNotAttachable(child));
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            log::warn!("rejected attaching {child:?} under {parent:?}: cycle");
            return Err(SceneError::CycleDetected { parent, child });
        }
        Ok(())
    }

    fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        position: Option<usize>,
    ) -> Result<(), SceneError> {
        self.validate(parent);
        self.validate(child);
        self.check_attachable(parent, child)?;

        if self.parent[child.idx as usize] != INVALID {
            self.detach(child.idx);
        }
        let before = position
            .and_then(|pos| self.children(parent).nth(pos))
            .map_or(INVALID, |sibling| sibling.idx);
        self.link(parent.idx, child.idx, before);
        Ok(())
    }

    /// Links detached `c` under `p`, before `before` (or last if
    /// [`INVALID`]).
    fn link(&mut self, p: u32, c: u32, before: u32) {
        self.parent[c as usize] = p;
        if before == INVALID {
            self.prev_sibling[c as usize] = INVALID;
            self.next_sibling[c as usize] = INVALID;
            if self.first_child[p as usize] == INVALID {
                self.first_child[p as usize] = c;
            } else {
                // Walk to last child.
                let mut last = self.first_child[p as usize];
                while self.next_sibling[last as usize] != INVALID {
                    last = self.next_sibling[last as usize];
                }
                self.next_sibling[last as usize] = c;
                self.prev_sibling[c as usize] = last;
            }
        } else {
            let prev = self.prev_sibling[before as usize];
            self.next_sibling[c as usize] = before;
            self.prev_sibling[c as usize] = prev;
            if prev != INVALID {
                self.next_sibling[prev as usize] = c;
            } else {
                // `before` was the first child.
                self.first_child[p as usize] = c;
            }
            self.prev_sibling[before as usize] = c;
        }

        // Child depends on parent for inherited channels.
        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        let _ = self.dirty.add_dependency(c, p, dirty::VISIBILITY);

        self.mark_subtree_inherited_dirty(c);
        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Unlinks `idx` from its parent and drops its inherited dependencies.
    fn detach(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;

        self.dirty.remove_dependency(idx, p, dirty::GEOMETRY);
        self.dirty.remove_dependency(idx, p, dirty::VISIBILITY);

        self.mark_subtree_inherited_dirty(idx);
        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Frees one slot. Its links are left for the caller's subtree walk.
    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.dirty.remove_key(idx);
        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.kind[i] = NodeKind::Group;
        self.extras[i] = Extras::new();
        self.free_list.push(idx);
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        log::trace!("destroyed node at slot {idx}");
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::VISIBILITY, &EagerPolicy);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn kids(scene: &Scene, parent: NodeId) -> Vec<NodeId> {
        scene.children(parent).collect()
    }

    #[test]
    fn create_and_destroy() {
        let mut scene = Scene::new();
        let id = scene.create_group();
        assert!(scene.is_alive(id));
        scene.destroy_node(id).unwrap();
        assert!(!scene.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut scene = Scene::new();
        let id1 = scene.create_group();
        scene.destroy_node(id1).unwrap();
        let id2 = scene.create_sprite();
        // id2 reuses the same slot but has a different generation.
        assert!(!scene.is_alive(id1));
        assert!(scene.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
        assert!(scene.animation(id2).is_some());
    }

    #[test]
    fn add_child_appends() {
        let mut scene = Scene::new();
        let parent = scene.create_group();
        let a = scene.create_group();
        let b = scene.create_group();
        scene.add_child(parent, a).unwrap();
        scene.add_child(parent, b).unwrap();
        assert_eq!(kids(&scene, parent), vec![a, b]);
        assert_eq!(scene.parent(b), Some(parent));
    }

    #[test]
    fn insert_child_at_front_and_middle() {
        let mut scene = Scene::new();
        let parent = scene.create_group();
        let a = scene.create_group();
        let b = scene.create_group();
        let c = scene.create_group();
        scene.add_child(parent, a).unwrap();
        scene.insert_child(parent, b, 0).unwrap();
        assert_eq!(kids(&scene, parent), vec![b, a]);
        scene.insert_child(parent, c, 1).unwrap();
        assert_eq!(kids(&scene, parent), vec![b, c, a]);
    }

    #[test]
    fn insert_child_past_end_appends() {
        let mut scene = Scene::new();
        let parent = scene.create_group();
        let a = scene.create_group();
        let b = scene.create_group();
        scene.insert_child(parent, a, 5).unwrap();
        scene.insert_child(parent, b, 1).unwrap();
        assert_eq!(kids(&scene, parent), vec![a, b]);
    }

    #[test]
    fn insert_before_works() {
        let mut scene = Scene::new();
        let parent = scene.create_group();
        let a = scene.create_group();
        let b = scene.create_group();
        let c = scene.create_group();
        scene.add_child(parent, a).unwrap();
        scene.add_child(parent, c).unwrap();
        scene.insert_before(b, c).unwrap();
        assert_eq!(kids(&scene, parent), vec![a, b, c]);
    }

    #[test]
    fn attaching_moves_between_parents() {
        let mut scene = Scene::new();
        let p1 = scene.create_group();
        let p2 = scene.create_group();
        let child = scene.create_group();
        scene.add_child(p1, child).unwrap();
        scene.add_child(p2, child).unwrap();
        assert_eq!(scene.parent(child), Some(p2));
        assert_eq!(scene.child_count(p1), 0);
        assert_eq!(kids(&scene, p2), vec![child]);
    }

    #[test]
    fn self_attachment_is_a_cycle() {
        let mut scene = Scene::new();
        let node = scene.create_group();
        assert_eq!(
            scene.add_child(node, node),
            Err(SceneError::CycleDetected {
                parent: node,
                child: node
            })
        );
    }

    #[test]
    fn ancestor_attachment_is_a_cycle() {
        let mut scene = Scene::new();
        let root = scene.create_group();
        let mid = scene.create_group();
        let leaf = scene.create_group();
        scene.add_child(root, mid).unwrap();
        scene.add_child(mid, leaf).unwrap();

        let err = scene.insert_child(leaf, root, 0).unwrap_err();
        assert_eq!(
            err,
            SceneError::CycleDetected {
                parent: leaf,
                child: root
            }
        );
        // Topology untouched.
        assert_eq!(scene.parent(root), None);
        assert_eq!(kids(&scene, mid), vec![leaf]);
    }

    #[test]
    fn viewport_roots_are_not_attachable() {
        let mut scene = Scene::new();
        let group = scene.create_group();
        let root = scene.create_node(NodeKind::Viewport(FrameClock::default()));
        assert_eq!(
            scene.add_child(group, root),
            Err(SceneError::RootNotAttachable(root))
        );
    }

    #[test]
    fn remove_from_parent_keeps_node_alive() {
        let mut scene = Scene::new();
        let parent = scene.create_group();
        let child = scene.create_group();
        scene.add_child(parent, child).unwrap();
        scene.remove_from_parent(child);
        assert_eq!(scene.parent(child), None);
        assert!(scene.is_alive(child));
        assert!(scene.children(parent).next().is_none());
    }

    #[test]
    fn destroy_takes_the_subtree() {
        let mut scene = Scene::new();
        let root = scene.create_group();
        let mid = scene.create_group();
        let leaf = scene.create_sprite();
        let other = scene.create_group();
        scene.add_child(root, mid).unwrap();
        scene.add_child(mid, leaf).unwrap();
        scene.add_child(root, other).unwrap();

        scene.destroy_node(mid).unwrap();
        assert!(!scene.is_alive(mid));
        assert!(!scene.is_alive(leaf));
        assert!(scene.is_alive(other));
        assert_eq!(kids(&scene, root), vec![other]);
    }

    #[test]
    fn viewport_roots_are_not_destroyable() {
        let mut scene = Scene::new();
        let root = scene.create_node(NodeKind::Viewport(FrameClock::default()));
        let child = scene.create_sprite();
        scene.add_child(root, child).unwrap();
        assert_eq!(
            scene.destroy_node(root),
            Err(SceneError::RootNotDestroyable(root))
        );
        assert!(scene.is_alive(root));
        assert!(scene.is_alive(child));
        assert_eq!(kids(&scene, root), vec![child]);
    }

    #[test]
    fn roots_returns_parentless_nodes() {
        let mut scene = Scene::new();
        let a = scene.create_group();
        let b = scene.create_group();
        let c = scene.create_group();
        scene.add_child(a, c).unwrap();
        let roots = scene.roots();
        assert!(roots.contains(&a));
        assert!(roots.contains(&b));
        assert!(!roots.contains(&c));
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set_x() {
        let mut scene = Scene::new();
        let id = scene.create_group();
        scene.destroy_node(id).unwrap();
        scene.set_x(id, 1.0);
    }

    #[test]
    #[should_panic(expected = "node has no parent")]
    fn remove_root_from_parent_panics() {
        let mut scene = Scene::new();
        let id = scene.create_group();
        scene.remove_from_parent(id);
    }

    #[test]
    fn position_setters_mark_dirty_only_on_change() {
        let mut scene = Scene::new();
        let node = scene.create_group();
        assert!(!scene.is_changed(node));

        scene.set_x(node, 0.0);
        scene.set_y(node, 0.0);
        assert!(!scene.is_changed(node), "same value is a no-op");

        scene.set_x(node, 3.0);
        assert!(scene.is_changed(node));
        assert_eq!(scene.x(node), 3.0);
    }

    #[test]
    fn set_visible_always_marks_dirty() {
        let mut scene = Scene::new();
        let node = scene.create_group();
        assert!(scene.is_visible(node));
        scene.set_visible(node, true);
        assert!(scene.is_changed(node));
    }

    #[test]
    fn moving_a_layer_schedules_movements_even_without_change() {
        let mut scene = Scene::new();
        let layer = scene.create_layer();
        scene
            .animation_mut(layer)
            .unwrap()
            .set_animations_after_move(3);

        scene.set_y(layer, 0.0);
        assert_eq!(scene.animation(layer).unwrap().pending_movements(), 3);
    }

    #[test]
    fn layers_start_dirty_and_groups_do_not() {
        let mut scene = Scene::new();
        let layer = scene.create_layer();
        let group = scene.create_group();
        assert!(scene.is_changed(layer));
        assert!(!scene.is_changed(group));
    }

    #[test]
    fn effective_visibility_considers_ancestors() {
        let mut scene = Scene::new();
        let root = scene.create_group();
        let child = scene.create_group();
        scene.add_child(root, child).unwrap();
        scene.set_visible(root, false);
        assert!(scene.is_visible(child));
        assert!(!scene.is_effectively_visible(child));
    }

    #[test]
    fn current_position_snapshot() {
        let mut scene = Scene::new();
        let node = scene.create_group();
        scene.set_x(node, 4.0);
        scene.set_y(node, 9.0);
        scene.set_position_reference(node, PositionReference::LeftBottom);
        assert_eq!(
            scene.current_position(node),
            Position {
                x: 4.0,
                y: 9.0,
                reference: PositionReference::LeftBottom
            }
        );
        assert_eq!(scene.position_reference(node), PositionReference::LeftBottom);
    }

    #[test]
    fn world_anchor_accumulates_offsets() {
        let mut scene = Scene::new();
        let root = scene.create_group();
        let child = scene.create_group();
        scene.set_x(root, 10.0);
        scene.set_y(root, 20.0);
        scene.set_x(child, 1.0);
        scene.add_child(root, child).unwrap();
        assert_eq!(scene.world_anchor(child), Point::new(11.0, 20.0));
    }
}
