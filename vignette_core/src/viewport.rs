// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The redraw driver.
//!
//! A [`Viewport`] owns a [`Scene`], the scene's root node and a [`Surface`].
//! Each redraw tick:
//!
//! 1. If the frame counter is a multiple of
//!    [`sprite_frames_in_same_value`](FrameClock::sprite_frames_in_same_value),
//!    runs the update pass on every direct child of the root.
//! 2. Clears the root's region of the surface.
//! 3. Runs the refresh pass on every direct child, in paint order.
//! 4. Increments the frame counter, wrapping to 1 once it reaches
//!    [`fps`](FrameClock::fps).
//!
//! [`start`](Viewport::start) registers the tick with a [`Timer`] at
//! `1 / fps` second intervals. The timer callback only holds a weak
//! reference to the viewport's state, so dropping the viewport ends the
//! loop even if the timer outlives it.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};
use core::num::NonZeroU32;
use core::time::Duration;

use kurbo::Point;
use serde_json::Value;

use crate::entity::expect_u32;
use crate::error::SceneError;
use crate::node::{NodeId, NodeKind, PositionReference, Scene, SceneChanges};
use crate::surface::Surface;
use crate::timer::{Timer, TimerHandle};
use crate::trace::{PhaseKind, TickEvent, TraceSink, Tracer};

/// Default ticks per second.
pub const DEFAULT_FPS: NonZeroU32 = NonZeroU32::new(30).unwrap();

/// Default number of ticks each sprite frame stays on screen.
pub const DEFAULT_SPRITE_FRAMES_IN_SAME_VALUE: NonZeroU32 = NonZeroU32::new(30).unwrap();

/// Tick-rate state of a viewport root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameClock {
    fps: NonZeroU32,
    sprite_frames_in_same_value: NonZeroU32,
    frame_counter: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            sprite_frames_in_same_value: DEFAULT_SPRITE_FRAMES_IN_SAME_VALUE,
            frame_counter: 0,
        }
    }
}

impl FrameClock {
    /// Returns the tick rate.
    #[must_use]
    pub fn fps(&self) -> NonZeroU32 {
        self.fps
    }

    /// Sets the tick rate. A running timer keeps its interval until the
    /// next [`Viewport::start`].
    pub fn set_fps(&mut self, fps: NonZeroU32) {
        self.fps = fps;
    }

    /// Returns how many ticks each sprite frame stays on screen.
    #[must_use]
    pub fn sprite_frames_in_same_value(&self) -> NonZeroU32 {
        self.sprite_frames_in_same_value
    }

    /// Sets how many ticks each sprite frame stays on screen.
    pub fn set_sprite_frames_in_same_value(&mut self, ticks: NonZeroU32) {
        self.sprite_frames_in_same_value = ticks;
    }

    /// Returns the frame counter.
    #[must_use]
    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    /// Returns whether sprites advance on the current tick.
    #[must_use]
    pub fn sprites_change(&self) -> bool {
        self.frame_counter % self.sprite_frames_in_same_value.get() == 0
    }

    /// Returns the timer interval for the current tick rate.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.get()
    }

    /// Moves the counter to the next tick.
    pub(crate) fn advance(&mut self) {
        self.frame_counter += 1;
        if self.frame_counter >= self.fps.get() {
            self.frame_counter = 1;
        }
    }

    pub(crate) fn declared_value(&self, key: &str) -> Option<Value> {
        match key {
            "fps" => Some(Value::from(self.fps.get())),
            "spritesFramesInSameValue" => Some(Value::from(self.sprite_frames_in_same_value.get())),
            _ => None,
        }
    }

    pub(crate) fn assign_declared(&mut self, key: &str, value: &Value) -> Result<bool, SceneError> {
        match key {
            "fps" => self.fps = positive(key, value)?,
            "spritesFramesInSameValue" => self.sprite_frames_in_same_value = positive(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn positive(key: &str, value: &Value) -> Result<NonZeroU32, SceneError> {
    NonZeroU32::new(expect_u32(key, value)?).ok_or_else(|| {
        SceneError::InvalidConfiguration(format!("option `{key}` must be positive"))
    })
}

/// What one redraw tick did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Monotonic tick counter, starting at 0.
    pub frame_index: u64,
    /// The frame counter after this tick.
    pub frame_counter: u32,
    /// Whether the update pass ran.
    pub sprites_changed: bool,
    /// How many nodes moved to a new animation frame.
    pub frames_advanced: usize,
    /// How many nodes issued a draw command.
    pub nodes_drawn: usize,
    /// Scene changes since the previous tick.
    pub changes: SceneChanges,
}

/// State shared between a viewport and its timer callback.
struct Stage<S> {
    scene: Scene,
    root: NodeId,
    surface: S,
    sink: Option<Box<dyn TraceSink>>,
    frame_index: u64,
}

impl<S: Surface> Stage<S> {
    fn clock(&self) -> &FrameClock {
        match self.scene.kind(self.root) {
            NodeKind::Viewport(clock) => clock,
            _ => unreachable!("viewport root is always a viewport node"),
        }
    }

    fn clock_mut(&mut self) -> &mut FrameClock {
        match self.scene.frame_clock_mut(self.root) {
            Some(clock) => clock,
            None => unreachable!("viewport root is always a viewport node"),
        }
    }

    fn tick(&mut self) -> Result<TickReport, SceneError> {
        let frame_index = self.frame_index;
        let clock = self.clock();
        let frame_counter = clock.frame_counter();
        let sprites_change = clock.sprites_change();

        let Self {
            scene,
            root,
            surface,
            sink,
            ..
        } = self;
        let root = *root;
        let mut tracer = match sink {
            Some(sink) => Tracer::new(&mut **sink),
            None => Tracer::none(),
        };
        tracer.tick_begin(&TickEvent {
            frame_index,
            frame_counter,
            sprites_change,
        });

        let children: Vec<NodeId> = scene.children(root).collect();

        let mut frames_advanced = 0;
        let mut first_error = None;
        if sprites_change {
            tracer.phase_begin(frame_index, PhaseKind::Update);
            for &child in &children {
                frames_advanced +=
                    scene.update_collecting(child, &mut tracer, &mut first_error);
            }
            tracer.phase_end(frame_index, PhaseKind::Update);
        }

        tracer.phase_begin(frame_index, PhaseKind::Clear);
        let region = scene.geometry(root).place(Point::ORIGIN).bounds;
        surface.clear_region(region);
        tracer.phase_end(frame_index, PhaseKind::Clear);

        tracer.phase_begin(frame_index, PhaseKind::Refresh);
        let nodes_drawn = children
            .iter()
            .map(|&child| scene.refresh(child, surface))
            .sum();
        tracer.phase_end(frame_index, PhaseKind::Refresh);

        let changes = scene.take_changes();
        drop(tracer);

        self.clock_mut().advance();
        self.frame_index += 1;
        let report = TickReport {
            frame_index,
            frame_counter: self.clock().frame_counter(),
            sprites_changed: sprites_change,
            frames_advanced,
            nodes_drawn,
            changes,
        };
        if let Some(sink) = &mut self.sink {
            sink.on_tick_end(&report);
        }
        log::trace!(
            "tick {frame_index}: advanced {frames_advanced}, drew {nodes_drawn}"
        );
        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}

/// The root of a scene, bound to a drawing surface and driven by a timer.
pub struct Viewport<S: Surface + 'static> {
    stage: Rc<RefCell<Stage<S>>>,
    timer: Option<Box<dyn TimerHandle>>,
}

impl<S: Surface + 'static> Viewport<S> {
    /// Creates a viewport drawing into `surface`.
    ///
    /// The root sits at the origin with a
    /// [`LeftTop`](PositionReference::LeftTop) reference and the surface's
    /// size.
    pub fn new(surface: S) -> Self {
        let mut scene = Scene::new();
        let root = scene.create_node(NodeKind::Viewport(FrameClock::default()));
        scene.set_position_reference(root, PositionReference::LeftTop);
        scene.set_size(root, surface.size());
        Self {
            stage: Rc::new(RefCell::new(Stage {
                scene,
                root,
                surface,
                sink: None,
                frame_index: 0,
            })),
            timer: None,
        }
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.stage.borrow().root
    }

    /// Borrows the scene.
    ///
    /// # Panics
    ///
    /// Panics if the scene is mutably borrowed.
    #[must_use]
    pub fn scene(&self) -> Ref<'_, Scene> {
        Ref::map(self.stage.borrow(), |stage| &stage.scene)
    }

    /// Borrows the scene for mutation.
    ///
    /// Timer ticks that fire while the borrow is held are skipped.
    ///
    /// # Panics
    ///
    /// Panics if the scene is already borrowed.
    pub fn scene_mut(&self) -> RefMut<'_, Scene> {
        RefMut::map(self.stage.borrow_mut(), |stage| &mut stage.scene)
    }

    /// Borrows the surface.
    #[must_use]
    pub fn surface(&self) -> Ref<'_, S> {
        Ref::map(self.stage.borrow(), |stage| &stage.surface)
    }

    /// Borrows the surface for mutation.
    pub fn surface_mut(&self) -> RefMut<'_, S> {
        RefMut::map(self.stage.borrow_mut(), |stage| &mut stage.surface)
    }

    /// Appends `child` to the root.
    ///
    /// # Errors
    ///
    /// Same as [`Scene::add_child`].
    pub fn add_child(&self, child: NodeId) -> Result<(), SceneError> {
        let mut stage = self.stage.borrow_mut();
        let root = stage.root;
        stage.scene.add_child(root, child)
    }

    /// Returns the tick rate.
    #[must_use]
    pub fn fps(&self) -> NonZeroU32 {
        self.stage.borrow().clock().fps()
    }

    /// Sets the tick rate. Takes effect on the next [`start`](Self::start).
    pub fn set_fps(&self, fps: NonZeroU32) {
        self.stage.borrow_mut().clock_mut().set_fps(fps);
    }

    /// Returns how many ticks each sprite frame stays on screen.
    #[must_use]
    pub fn sprite_frames_in_same_value(&self) -> NonZeroU32 {
        self.stage.borrow().clock().sprite_frames_in_same_value()
    }

    /// Sets how many ticks each sprite frame stays on screen.
    pub fn set_sprite_frames_in_same_value(&self, ticks: NonZeroU32) {
        self.stage
            .borrow_mut()
            .clock_mut()
            .set_sprite_frames_in_same_value(ticks);
    }

    /// Returns the frame counter.
    #[must_use]
    pub fn frame_counter(&self) -> u32 {
        self.stage.borrow().clock().frame_counter()
    }

    /// Returns how many ticks completed.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.stage.borrow().frame_index
    }

    /// Installs or removes the trace sink.
    pub fn set_trace_sink(&self, sink: Option<Box<dyn TraceSink>>) {
        self.stage.borrow_mut().sink = sink;
    }

    /// Runs one tick synchronously.
    ///
    /// # Errors
    ///
    /// Returns the first animation error of the update pass. The tick still
    /// runs to completion: every other node advances, the surface is
    /// cleared and redrawn, and the frame counter moves on.
    ///
    /// # Panics
    ///
    /// Panics if the scene is borrowed.
    pub fn redraw(&self) -> Result<TickReport, SceneError> {
        self.stage.borrow_mut().tick()
    }

    /// Starts ticking at `1 / fps` second intervals.
    ///
    /// Starting a running viewport does nothing.
    ///
    /// # Errors
    ///
    /// Propagates the timer's scheduling error.
    pub fn start<T: Timer>(&mut self, timer: &mut T) -> Result<(), SceneError> {
        if self.timer.is_some() {
            log::debug!("viewport already running");
            return Ok(());
        }
        let interval = self.stage.borrow().clock().interval();
        let stage = Rc::downgrade(&self.stage);
        let handle = timer.schedule_repeating(
            interval,
            Box::new(move || {
                let Some(stage) = stage.upgrade() else {
                    return;
                };
                let Ok(mut guard) = stage.try_borrow_mut() else {
                    log::warn!("skipping tick: scene is borrowed");
                    return;
                };
                if let Err(err) = guard.tick() {
                    log::error!("redraw tick failed: {err}");
                }
            }),
        )?;
        self.timer = Some(Box::new(handle));
        log::debug!("viewport started at {interval:?} per tick");
        Ok(())
    }

    /// Stops ticking. Stopping a stopped viewport does nothing.
    pub fn stop(&mut self) {
        if let Some(mut handle) = self.timer.take() {
            handle.cancel();
            log::debug!("viewport stopped");
        }
    }

    /// Returns `true` while a timer is driving the viewport.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }
}

impl<S: Surface + 'static> Drop for Viewport<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S: Surface + 'static> core::fmt::Debug for Viewport<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("Viewport");
        s.field("running", &self.is_running());
        if let Ok(stage) = self.stage.try_borrow() {
            s.field("root", &stage.root)
                .field("frame_index", &stage.frame_index);
            if stage.scene.is_alive(stage.root)
                && let Some(clock) = stage.scene.frame_clock(stage.root)
            {
                s.field("clock", clock);
            }
        }
        s.finish_non_exhaustive()
    }
}
