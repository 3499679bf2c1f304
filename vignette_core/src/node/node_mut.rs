// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Option-bag access to a single node.

use alloc::format;
use alloc::string::String;

use kurbo::Size;
use serde_json::{Map, Value};

use super::id::NodeId;
use super::kind::{NodeKind, PositionReference};
use super::store::Scene;
use crate::animation::states_from_json;
use crate::dirty;
use crate::entity::{Extensible, Extras, expect_bool, expect_f64, expect_str, expect_u32};
use crate::error::SceneError;
use crate::surface::ImageId;

/// A mutable view of one node that implements [`Extensible`].
///
/// Created by [`Scene::node_mut`].
#[derive(Debug)]
pub struct NodeMut<'a> {
    scene: &'a mut Scene,
    id: NodeId,
}

impl NodeMut<'_> {
    /// Returns the node's handle.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Extensible for NodeMut<'_> {
    fn declared_value(&self, key: &str) -> Option<Value> {
        self.scene.declared_value(self.id, key)
    }

    fn assign_declared(&mut self, key: &str, value: &Value) -> Result<bool, SceneError> {
        self.scene.assign_declared(self.id, key, value)
    }

    fn extras(&self) -> &Extras {
        &self.scene.extras[self.id.idx as usize]
    }

    fn extras_mut(&mut self) -> &mut Extras {
        &mut self.scene.extras[self.id.idx as usize]
    }
}

impl Scene {
    /// Returns an [`Extensible`] view of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn node_mut(&mut self, id: NodeId) -> NodeMut<'_> {
        self.validate(id);
        NodeMut { scene: self, id }
    }

    /// Applies an option bag to a node.
    ///
    /// Recognized keys for every node: `visible`, `x`, `y`, `width`,
    /// `height`, `rotation`, `isDynamic`, `positionReference`. Layers and
    /// sprites also accept `image`, `sourceX`, `sourceY`, `sourceWidth`,
    /// `sourceHeight`, `states`, `currentState`, `animationsAfterMove`.
    /// Viewport roots also accept `fps` and `spritesFramesInSameValue`.
    /// Anything else is stored in the node's [`Extras`].
    ///
    /// `currentState` is applied after every other key so it can name a
    /// state introduced by the same bag.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidConfiguration`] for a recognized key
    /// with a value of the wrong type, and [`SceneError::InvalidState`] for
    /// an unknown `currentState`.
    pub fn set_options(
        &mut self,
        id: NodeId,
        options: &Map<String, Value>,
    ) -> Result<(), SceneError> {
        self.node_mut(id).set_options(options)
    }

    /// Returns the declared property named `key`, else the extra stored
    /// under it.
    #[must_use]
    pub fn property_value(&self, id: NodeId, key: &str) -> Option<Value> {
        self.declared_value(id, key)
            .or_else(|| self.extras(id).get(key).cloned())
    }

    fn declared_value(&self, id: NodeId, key: &str) -> Option<Value> {
        self.validate(id);
        let i = id.idx as usize;
        let geometry = &self.geometry[i];
        Some(match key {
            "visible" => Value::from(self.visible[i]),
            "x" => Value::from(geometry.x),
            "y" => Value::from(geometry.y),
            "width" => Value::from(geometry.size.width),
            "height" => Value::from(geometry.size.height),
            "rotation" => Value::from(geometry.rotation_degrees),
            "isDynamic" => Value::from(self.dynamic[i]),
            "positionReference" => Value::from(geometry.reference.as_str()),
            _ => {
                return match &self.kind[i] {
                    NodeKind::Layer(anim) | NodeKind::Sprite(anim) => anim.declared_value(key),
                    NodeKind::Viewport(clock) => clock.declared_value(key),
                    NodeKind::Group => None,
                };
            }
        })
    }

    fn assign_declared(
        &mut self,
        id: NodeId,
        key: &str,
        value: &Value,
    ) -> Result<bool, SceneError> {
        match key {
            "visible" => self.set_visible(id, expect_bool(key, value)?),
            "x" => self.set_x(id, expect_f64(key, value)?),
            "y" => self.set_y(id, expect_f64(key, value)?),
            "width" => self.set_width(id, expect_f64(key, value)?),
            "height" => self.set_height(id, expect_f64(key, value)?),
            "rotation" => self.set_rotation(id, expect_f64(key, value)?),
            "isDynamic" => self.set_dynamic(id, expect_bool(key, value)?),
            "positionReference" => {
                let name = expect_str(key, value)?;
                let reference = PositionReference::parse(name).ok_or_else(|| {
                    SceneError::InvalidConfiguration(format!(
                        "unknown position reference `{name}`"
                    ))
                })?;
                self.set_position_reference(id, reference);
            }
            _ => return self.assign_kind_declared(id, key, value),
        }
        Ok(true)
    }

    fn assign_kind_declared(
        &mut self,
        id: NodeId,
        key: &str,
        value: &Value,
    ) -> Result<bool, SceneError> {
        match &mut self.kind[id.idx as usize] {
            NodeKind::Layer(anim) | NodeKind::Sprite(anim) => {
                match key {
                    "image" => {
                        let image = if value.is_null() {
                            None
                        } else {
                            Some(ImageId(expect_u32(key, value)?))
                        };
                        anim.set_image(image);
                    }
                    "sourceX" => {
                        let y = anim.source_rect().y0;
                        anim.set_source_origin(expect_f64(key, value)?, y);
                    }
                    "sourceY" => {
                        let x = anim.source_rect().x0;
                        anim.set_source_origin(x, expect_f64(key, value)?);
                    }
                    "sourceWidth" => {
                        let height = anim.source_size().height;
                        anim.set_source_size(Size::new(expect_f64(key, value)?, height));
                    }
                    "sourceHeight" => {
                        let width = anim.source_size().width;
                        anim.set_source_size(Size::new(width, expect_f64(key, value)?));
                    }
                    "states" => anim.set_states(states_from_json(value)?),
                    "currentState" => anim.set_current_state(expect_str(key, value)?)?,
                    "animationsAfterMove" => {
                        anim.set_animations_after_move(expect_u32(key, value)?);
                    }
                    _ => return Ok(false),
                }
                self.dirty.mark(id.idx, dirty::FRAME);
                Ok(true)
            }
            NodeKind::Viewport(clock) => clock.assign_declared(key, value),
            NodeKind::Group => Ok(false),
        }
    }
}
