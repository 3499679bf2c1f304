// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing-surface contract for platform integrations.
//!
//! The core never rasterizes. Backends implement [`Surface`] on top of a 2D
//! raster context (e.g. `CanvasRenderingContext2d`) and the
//! [`Viewport`](crate::viewport::Viewport) drives it once per tick: one
//! [`clear_region`](Surface::clear_region) followed by a
//! [`draw_image_region`](Surface::draw_image_region) per drawable node, in
//! paint order.

use core::fmt;

use kurbo::{Point, Rect, Size};

/// An opaque reference to an already-loaded sprite-sheet bitmap.
///
/// Images are loaded and owned by the backend. The core only passes the
/// handle back in [`DrawImage`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(pub u32);

impl fmt::Debug for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageId({})", self.0)
    }
}

/// A single "draw image region into region" command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawImage {
    /// The sprite sheet to sample from.
    pub image: ImageId,
    /// Source rectangle in sheet pixels.
    pub src: Rect,
    /// Destination rectangle in surface pixels.
    pub dst: Rect,
    /// Clockwise rotation in degrees, applied around [`pivot`](Self::pivot).
    pub rotation_degrees: f64,
    /// The node's reference point in surface pixels.
    pub pivot: Point,
}

/// A 2D raster target.
///
/// Implementations must apply commands in call order. Later draws paint over
/// earlier ones.
pub trait Surface {
    /// Returns the drawable extent in surface pixels.
    fn size(&self) -> Size;

    /// Clears `region` to transparent.
    fn clear_region(&mut self, region: Rect);

    /// Draws `draw.src` of `draw.image` into `draw.dst`.
    fn draw_image_region(&mut self, draw: &DrawImage);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn size(&self) -> Size {
        (**self).size()
    }

    fn clear_region(&mut self, region: Rect) {
        (**self).clear_region(region);
    }

    fn draw_image_region(&mut self, draw: &DrawImage) {
        (**self).draw_image_region(draw);
    }
}

/// Where a node lands on the surface for the current refresh pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// The node's reference point in surface pixels.
    pub anchor: Point,
    /// The node's bounding box in surface pixels.
    pub bounds: Rect,
    /// Rotation around [`anchor`](Self::anchor), in degrees.
    pub rotation_degrees: f64,
}

/// Something that can contribute pixels during a refresh pass.
pub trait Drawable {
    /// Draws into `surface` at `placement`. Returns whether anything was
    /// drawn.
    fn draw(&self, placement: &Placement, surface: &mut dyn Surface) -> bool;
}
