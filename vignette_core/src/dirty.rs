// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The scene records node changes on independent channels (via
//! [`understory_dirty`]) and drains them once per tick into
//! [`SceneChanges`](crate::node::SceneChanges). These channels are separate
//! from the per-node `changed` flag that gates sprite animation: the flag is
//! cleared by the animation step, the channels are cleared by
//! [`Scene::take_changes`](crate::node::Scene::take_changes).
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`GEOMETRY`] and [`VISIBILITY`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges from
//!   child to parent. A child's world placement and effective visibility
//!   are inherited, so marking a parent marks the whole subtree.
//!
//! - **Local-only**: [`FRAME`] is marked when a node's sprite source
//!   rectangle, image or animation configuration changes.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on create, destroy, attach and
//!   detach.

use understory_dirty::Channel;

/// Position, size, rotation or position reference changed.
pub const GEOMETRY: Channel = Channel::new(0);

/// Own visibility changed.
pub const VISIBILITY: Channel = Channel::new(1);

/// Sprite frame, image or animation configuration changed.
pub const FRAME: Channel = Channel::new(2);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(3);
