// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node variants and geometry.

use kurbo::{Point, Rect, Size};

use crate::animation::{Animatable, SpriteAnimation};
use crate::error::SceneError;
use crate::surface::{Drawable, Placement, Surface};
use crate::viewport::FrameClock;

/// Which point of a node's bounding box its `(x, y)` denotes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PositionReference {
    /// The center of the box.
    #[default]
    Center,
    /// The top-left corner.
    LeftTop,
    /// The bottom-left corner.
    LeftBottom,
}

impl PositionReference {
    /// Returns the option-bag spelling (`"center"`, `"left-top"`,
    /// `"left-bottom"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::LeftTop => "left-top",
            Self::LeftBottom => "left-bottom",
        }
    }

    /// Parses the option-bag spelling.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "center" => Some(Self::Center),
            "left-top" => Some(Self::LeftTop),
            "left-bottom" => Some(Self::LeftBottom),
            _ => None,
        }
    }

    /// Returns the bounding box of a `size` box whose reference point is
    /// `anchor`.
    #[must_use]
    pub fn bounds(self, anchor: Point, size: Size) -> Rect {
        let origin = match self {
            Self::Center => Point::new(anchor.x - size.width / 2.0, anchor.y - size.height / 2.0),
            Self::LeftTop => anchor,
            Self::LeftBottom => Point::new(anchor.x, anchor.y - size.height),
        };
        Rect::from_origin_size(origin, size)
    }
}

/// Snapshot returned by [`Scene::current_position`](super::Scene::current_position).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    /// Horizontal position relative to the parent's reference point.
    pub x: f64,
    /// Vertical position relative to the parent's reference point.
    pub y: f64,
    /// Which point of the bounding box `(x, y)` denotes.
    pub reference: PositionReference,
}

/// Local geometry of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// Horizontal position relative to the parent's reference point.
    pub x: f64,
    /// Vertical position relative to the parent's reference point.
    pub y: f64,
    /// Extent of the bounding box.
    pub size: Size,
    /// Clockwise rotation around the reference point, in degrees.
    pub rotation_degrees: f64,
    /// Which point of the bounding box `(x, y)` denotes.
    pub reference: PositionReference,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            size: Size::new(100.0, 100.0),
            rotation_degrees: 0.0,
            reference: PositionReference::Center,
        }
    }
}

impl Geometry {
    /// Returns the parent-relative reference point.
    #[must_use]
    pub fn offset(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns where this node lands when its parent's reference point is at
    /// `parent_anchor`.
    #[must_use]
    pub fn place(&self, parent_anchor: Point) -> Placement {
        let anchor = parent_anchor + self.offset().to_vec2();
        Placement {
            anchor,
            bounds: self.reference.bounds(anchor, self.size),
            rotation_degrees: self.rotation_degrees,
        }
    }
}

/// The tagged variant set of node behaviors.
///
/// Plain groups and viewport roots contribute no pixels of their own. Layers
/// and sprites carry a [`SpriteAnimation`] and draw the current frame.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// A plain visual node used for grouping.
    Group,
    /// An animated sprite-sheet layer.
    Layer(SpriteAnimation),
    /// A renderable animated leaf; same contract as [`Layer`](Self::Layer).
    Sprite(SpriteAnimation),
    /// The root of a [`Viewport`](crate::viewport::Viewport).
    Viewport(FrameClock),
}

impl NodeKind {
    /// Returns a fresh layer.
    #[must_use]
    pub fn layer() -> Self {
        Self::Layer(SpriteAnimation::new())
    }

    /// Returns a fresh sprite.
    #[must_use]
    pub fn sprite() -> Self {
        Self::Sprite(SpriteAnimation::new())
    }

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Layer(_) => "layer",
            Self::Sprite(_) => "sprite",
            Self::Viewport(_) => "viewport",
        }
    }

    /// Returns the animation state of layers and sprites.
    #[must_use]
    pub fn animation(&self) -> Option<&SpriteAnimation> {
        match self {
            Self::Layer(anim) | Self::Sprite(anim) => Some(anim),
            Self::Group | Self::Viewport(_) => None,
        }
    }

    /// Returns the animation state of layers and sprites for mutation.
    pub fn animation_mut(&mut self) -> Option<&mut SpriteAnimation> {
        match self {
            Self::Layer(anim) | Self::Sprite(anim) => Some(anim),
            Self::Group | Self::Viewport(_) => None,
        }
    }

    /// Returns the frame clock of viewport roots.
    #[must_use]
    pub fn frame_clock(&self) -> Option<&FrameClock> {
        match self {
            Self::Viewport(clock) => Some(clock),
            _ => None,
        }
    }

    /// Returns the frame clock of viewport roots for mutation.
    pub fn frame_clock_mut(&mut self) -> Option<&mut FrameClock> {
        match self {
            Self::Viewport(clock) => Some(clock),
            _ => None,
        }
    }

    /// Whether freshly created nodes of this kind start dirty.
    ///
    /// Animated kinds start dirty so their first update pass picks a frame.
    pub(crate) fn starts_changed(&self) -> bool {
        self.animation().is_some()
    }
}

impl Animatable for NodeKind {
    fn advance(&mut self, changed: &mut bool) -> Result<bool, SceneError> {
        match self {
            Self::Layer(anim) | Self::Sprite(anim) => anim.advance(changed),
            Self::Group | Self::Viewport(_) => Ok(false),
        }
    }
}

impl Drawable for NodeKind {
    fn draw(&self, placement: &Placement, surface: &mut dyn Surface) -> bool {
        match self {
            Self::Layer(anim) | Self::Sprite(anim) => anim.draw(placement, surface),
            Self::Group | Self::Viewport(_) => false,
        }
    }
}
