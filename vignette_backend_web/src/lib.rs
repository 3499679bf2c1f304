// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for vignette.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`CanvasSurface`]: a [`Surface`] over a `<canvas>` 2D context
//! - [`IntervalTimer`]: a `setInterval` tick source
//!
//! A typical page creates a [`Viewport`] over the canvas and starts it:
//!
//! ```ignore
//! let surface = CanvasSurface::new(canvas).ok_or("no 2d context")?;
//! let mut viewport = Viewport::new(surface);
//! viewport.start(&mut IntervalTimer::new())?;
//! ```
//!
//! [`Surface`]: vignette_core::surface::Surface
//! [`Viewport`]: vignette_core::viewport::Viewport

#![no_std]

extern crate alloc;

mod canvas;
mod interval;

pub use canvas::CanvasSurface;
pub use interval::{IntervalHandle, IntervalTimer};
