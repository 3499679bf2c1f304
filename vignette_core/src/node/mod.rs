// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! A *node* is an element of the scene tree. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. Sibling order is paint order.
//! - **Geometry** set by the caller: [`x`](Scene::set_x),
//!   [`y`](Scene::set_y), [`size`](Scene::set_size),
//!   [`rotation`](Scene::set_rotation), and a
//!   [`PositionReference`] naming which point of the box `(x, y)` denotes.
//!   Positions are relative to the parent's reference point.
//! - A **kind** ([`NodeKind`]) carrying variant state, such as the sprite
//!   animation of layers or the frame clock of a viewport root.
//! - **Extras**: user-defined properties set through option bags.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//!
//! # The dirty flag
//!
//! Every node carries a boolean dirty flag, read via
//! [`is_changed`](Scene::is_changed). Changing `x` or `y` to a different
//! value sets it, and so does every [`set_visible`](Scene::set_visible)
//! call. A layer's frame advance clears it. Nothing else touches it.
//!
//! # Change channels
//!
//! Independently of the dirty flag, mutations mark a change channel (see
//! [`dirty`](crate::dirty)) that [`take_changes`](Scene::take_changes)
//! drains into a [`SceneChanges`]:
//!
//! - **GEOMETRY** / **VISIBILITY**: propagate to all descendants, since
//!   placement and visibility are inherited.
//! - **FRAME**: local-only; the node's animation frame moved or its
//!   animation configuration was edited.
//! - **TOPOLOGY**: structural changes (attach, detach, create, destroy).

mod changes;
mod id;
mod kind;
mod node_mut;
mod pass;
mod store;
mod traverse;

pub use changes::SceneChanges;
pub use id::{INVALID, NodeId};
pub use kind::{Geometry, NodeKind, Position, PositionReference};
pub use node_mut::NodeMut;
pub use store::Scene;
pub use traverse::{Ancestors, Children};
