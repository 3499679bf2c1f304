// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable scene faults.
//!
//! Handle misuse (a stale [`NodeId`]) is a contract violation and panics, like
//! indexing out of bounds. Everything a well-formed caller can still get
//! wrong is reported as a [`SceneError`].

use alloc::string::String;

use crate::node::NodeId;

/// Errors surfaced by scene, animation and viewport operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// An animation state name that is not present in the layer's states.
    #[error("unknown animation state `{0}`")]
    InvalidState(String),

    /// Configuration that cannot be applied, such as an empty animation cycle
    /// or an option value of the wrong type.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Attaching `child` under `parent` would make `child` its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// The node that would receive the child.
        parent: NodeId,
        /// The node being attached.
        child: NodeId,
    },

    /// Viewport roots own their scene and cannot become another node's child.
    #[error("viewport root {0:?} cannot be attached to another node")]
    RootNotAttachable(NodeId),

    /// Viewport roots live as long as their viewport and cannot be destroyed
    /// through the scene.
    #[error("viewport root {0:?} cannot be destroyed")]
    RootNotDestroyable(NodeId),

    /// The platform refused to schedule a repeating timer.
    #[error("timer unavailable: {0}")]
    TimerUnavailable(String),
}
