// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas 2D drawing surface.
//!
//! [`CanvasSurface`] draws sprite-sheet regions with `drawImage`. Images are
//! loaded by the page and registered here; the registry index becomes the
//! [`ImageId`] that layers reference.

use alloc::vec::Vec;

use kurbo::{Rect, Size};
use vignette_core::surface::{DrawImage, ImageId, Surface};
use wasm_bindgen::JsCast as _;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// A [`Surface`] over an `HtmlCanvasElement`'s 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    images: Vec<Option<HtmlImageElement>>,
}

impl core::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("canvas", &"HtmlCanvasElement")
            .field("images_len", &self.images.len())
            .finish_non_exhaustive()
    }
}

impl CanvasSurface {
    /// Creates a surface over `canvas`, or `None` if it has no 2D context.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            canvas,
            context,
            images: Vec::new(),
        })
    }

    /// Returns the canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Registers a loaded image and returns its handle.
    pub fn register_image(&mut self, image: HtmlImageElement) -> ImageId {
        // Reuse the first free slot.
        let slot = match self.images.iter().position(Option::is_none) {
            Some(slot) => {
                self.images[slot] = Some(image);
                slot
            }
            None => {
                self.images.push(Some(image));
                self.images.len() - 1
            }
        };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "image registries stay far below u32::MAX entries"
        )]
        let id = slot as u32;
        ImageId(id)
    }

    /// Removes a registered image. Layers still referencing it stop drawing.
    pub fn remove_image(&mut self, id: ImageId) -> Option<HtmlImageElement> {
        self.images.get_mut(id.0 as usize)?.take()
    }

    /// Returns the image registered under `id`.
    #[must_use]
    pub fn image(&self, id: ImageId) -> Option<&HtmlImageElement> {
        self.images.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn blit(&self, image: &HtmlImageElement, draw: &DrawImage) {
        let (src, dst) = (draw.src, draw.dst);
        let result = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                src.x0,
                src.y0,
                src.width(),
                src.height(),
                dst.x0,
                dst.y0,
                dst.width(),
                dst.height(),
            );
        if let Err(err) = result {
            log::warn!("drawImage failed for {:?}: {err:?}", draw.image);
        }
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn clear_region(&mut self, region: Rect) {
        self.context
            .clear_rect(region.x0, region.y0, region.width(), region.height());
    }

    fn draw_image_region(&mut self, draw: &DrawImage) {
        let Some(image) = self.image(draw.image) else {
            log::warn!("skipping draw of unregistered {:?}", draw.image);
            return;
        };
        if draw.rotation_degrees == 0.0 {
            self.blit(image, draw);
            return;
        }

        let pivot = draw.pivot;
        self.context.save();
        let rotated = self
            .context
            .translate(pivot.x, pivot.y)
            .and_then(|()| self.context.rotate(draw.rotation_degrees.to_radians()))
            .and_then(|()| self.context.translate(-pivot.x, -pivot.y));
        match rotated {
            Ok(()) => self.blit(image, draw),
            Err(err) => log::warn!("rotating {:?} failed: {err:?}", draw.image),
        }
        self.context.restore();
    }
}
