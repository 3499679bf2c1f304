// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode 2D scene graph for canvas-style drawing surfaces.
//!
//! `vignette_core` keeps a tree of positioned, sized, rotatable visual nodes
//! and drives it from a fixed-rate redraw loop. It is `no_std` compatible
//! (with `alloc`) and stores nodes in struct-of-arrays form behind
//! generational handles.
//!
//! # Architecture
//!
//! One redraw tick flows through the crate like this:
//!
//! ```text
//!   Timer (tick source)
//!       │
//!       ▼
//!   Viewport::redraw()
//!       │
//!       ├─► Scene::update()   (sprite frame advance, every N ticks)
//!       ├─► Surface::clear_region()
//!       ├─► Scene::refresh()  (pre-order draw into the Surface)
//!       └─► Scene::take_changes() ──► TickReport
//! ```
//!
//! **[`node`]**: Arena-backed scene tree with generational [`NodeId`]
//! handles. Geometry setters maintain the per-node dirty flag that gates
//! sprite animation.
//!
//! **[`animation`]**: The sprite-sheet state machine ([`SpriteAnimation`])
//! carried by layer and sprite nodes.
//!
//! **[`entity`]**: Option bags. Declared fields are assigned directly and
//! everything else lands in a per-node [`Extras`](entity::Extras) map.
//!
//! **[`viewport`]**: The redraw driver. Owns the surface, the scene and the
//! timer handle while running.
//!
//! **[`surface`]** / **[`timer`]**: The capabilities the core consumes from
//! a platform backend.
//!
//! **[`dirty`]**: Change channels drained into
//! [`SceneChanges`](node::SceneChanges) once per tick.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) hooks for tick
//! instrumentation.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//!
//! [`NodeId`]: node::NodeId
//! [`SpriteAnimation`]: animation::SpriteAnimation

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod dirty;
pub mod entity;
pub mod error;
pub mod node;
pub mod surface;
pub mod timer;
pub mod trace;
pub mod viewport;

pub use error::SceneError;
