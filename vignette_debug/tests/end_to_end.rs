// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport scenarios driven by a virtual timer and a recording surface.

use std::cell::RefCell;
use std::num::NonZeroU32;
use std::rc::Rc;

use kurbo::{Rect, Size};
use serde_json::json;
use vignette_core::node::NodeId;
use vignette_core::surface::ImageId;
use vignette_core::timer::ManualTimer;
use vignette_core::trace::PhaseKind;
use vignette_core::viewport::Viewport;
use vignette_debug::recorder::{RecordedEvent, RecorderSink};
use vignette_debug::recording::{RecordingSurface, SurfaceCommand};

fn options(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!("test options are objects"),
    }
}

fn viewport() -> Viewport<RecordingSurface> {
    Viewport::new(RecordingSurface::new(Size::new(640.0, 480.0)))
}

fn walking_sprite(viewport: &Viewport<RecordingSurface>, image: u32) -> NodeId {
    let sprite = viewport.scene_mut().create_sprite();
    viewport
        .scene_mut()
        .set_options(
            sprite,
            &options(json!({
                "image": image,
                "states": { "walk": { "row": 1, "cols": [0, 1, 2, 3] } },
                "currentState": "walk",
            })),
        )
        .unwrap();
    viewport.add_child(sprite).unwrap();
    sprite
}

fn recorder(viewport: &Viewport<RecordingSurface>) -> Rc<RefCell<RecorderSink>> {
    let sink = Rc::new(RefCell::new(RecorderSink::new()));
    viewport.set_trace_sink(Some(Box::new(Rc::clone(&sink))));
    sink
}

#[test]
fn eight_tick_walk_advances_four_times_and_wraps() {
    let mut viewport = viewport();
    viewport.set_sprite_frames_in_same_value(NonZeroU32::new(2).unwrap());
    let sprite = walking_sprite(&viewport, 1);
    viewport
        .scene_mut()
        .animation_mut(sprite)
        .unwrap()
        .set_animations_after_move(4);
    viewport.scene_mut().set_x(sprite, 10.0);
    let sink = recorder(&viewport);

    let mut timer = ManualTimer::new();
    viewport.start(&mut timer).unwrap();
    let interval = viewport.scene().frame_clock(viewport.root()).unwrap().interval();
    assert_eq!(timer.advance(interval * 8), 8);
    viewport.stop();

    assert_eq!(sink.borrow().advances_of(sprite.index()), 4);
    let anim_index = viewport
        .scene()
        .animation(sprite)
        .unwrap()
        .current_col_index();
    assert_eq!(anim_index, 0);
    assert_eq!(viewport.scene().animation(sprite).unwrap().pending_movements(), 0);

    // Advances happen on even frame counters only.
    let events = sink.borrow().events().to_vec();
    let mut counter = None;
    for event in &events {
        match event {
            RecordedEvent::TickBegin { frame_counter, .. } => counter = Some(*frame_counter),
            RecordedEvent::FrameAdvance { .. } => {
                assert_eq!(counter.map(|c| c % 2), Some(0));
            }
            _ => {}
        }
    }
}

#[test]
fn frame_counter_runs_zero_to_29_then_one_to_29() {
    let viewport = viewport();
    let sink = recorder(&viewport);
    for _ in 0..60 {
        viewport.redraw().unwrap();
    }
    let expected: Vec<u32> = (0..30).chain(1..30).chain(1..2).collect();
    assert_eq!(sink.borrow().frame_counters(), expected);
}

#[test]
fn source_rect_follows_row_and_column() {
    let viewport = viewport();
    let sprite = walking_sprite(&viewport, 1);
    viewport
        .scene_mut()
        .set_options(
            sprite,
            &options(json!({ "sourceWidth": 32, "sourceHeight": 32 })),
        )
        .unwrap();
    viewport.redraw().unwrap();

    let surface = viewport.surface();
    let draw = surface.draws().next().copied().unwrap();
    // Source height changed after the state was selected; the row offset
    // stays at the old height until the next switch.
    assert_eq!(draw.src, Rect::new(32.0, 100.0, 64.0, 132.0));
    assert_eq!(draw.image, ImageId(1));
    assert_eq!(draw.dst, Rect::new(-50.0, -50.0, 50.0, 50.0));
}

#[test]
fn double_start_keeps_one_timer() {
    let mut viewport = viewport();
    let mut timer = ManualTimer::new();
    viewport.start(&mut timer).unwrap();
    viewport.start(&mut timer).unwrap();
    assert_eq!(timer.active(), 1);

    let interval = viewport.scene().frame_clock(viewport.root()).unwrap().interval();
    assert_eq!(timer.advance(interval * 5), 5);
    assert_eq!(viewport.frame_index(), 5);
}

#[test]
fn no_ticks_after_stop() {
    let mut viewport = viewport();
    let mut timer = ManualTimer::new();
    viewport.start(&mut timer).unwrap();
    let interval = viewport.scene().frame_clock(viewport.root()).unwrap().interval();
    timer.advance(interval * 3);
    viewport.stop();
    let recorded = viewport.surface().commands().len();

    assert_eq!(timer.advance(interval * 10), 0);
    assert_eq!(viewport.surface().commands().len(), recorded);
    assert_eq!(viewport.frame_index(), 3);

    // Restarting resumes from the same counter.
    viewport.start(&mut timer).unwrap();
    timer.advance(interval);
    assert_eq!(viewport.frame_index(), 4);
}

#[test]
fn later_children_paint_over_earlier_ones() {
    let viewport = viewport();
    walking_sprite(&viewport, 1);
    walking_sprite(&viewport, 2);
    let inserted = walking_sprite(&viewport, 3);
    let root = viewport.root();
    viewport.scene_mut().insert_child(root, inserted, 0).unwrap();
    viewport.redraw().unwrap();

    let surface = viewport.surface();
    let commands = surface.commands();
    assert!(matches!(commands[0], SurfaceCommand::Clear(region) if region == Rect::new(0.0, 0.0, 640.0, 480.0)));
    let order: Vec<u32> = surface.draws().map(|d| d.image.0).collect();
    assert_eq!(order, [3, 1, 2]);
}

#[test]
fn hidden_subtree_is_not_drawn_but_still_animates() {
    let viewport = viewport();
    let parent = viewport.scene_mut().create_group();
    viewport.add_child(parent).unwrap();
    let sprite = walking_sprite(&viewport, 1);
    let root = viewport.root();
    let mut scene = viewport.scene_mut();
    scene.add_child(parent, sprite).unwrap();
    scene.set_visible(parent, false);
    assert_eq!(scene.parent(sprite), Some(parent));
    assert_ne!(scene.parent(sprite), Some(root));
    drop(scene);

    let report = viewport.redraw().unwrap();
    assert_eq!(report.nodes_drawn, 0);
    assert_eq!(report.frames_advanced, 1);
}

#[test]
fn phases_run_in_order() {
    let viewport = viewport();
    let sink = recorder(&viewport);
    viewport.redraw().unwrap();

    let phases: Vec<(bool, PhaseKind)> = sink
        .borrow()
        .events()
        .iter()
        .filter_map(|event| match event {
            RecordedEvent::PhaseBegin { phase, .. } => Some((true, *phase)),
            RecordedEvent::PhaseEnd { phase, .. } => Some((false, *phase)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        [
            (true, PhaseKind::Update),
            (false, PhaseKind::Update),
            (true, PhaseKind::Clear),
            (false, PhaseKind::Clear),
            (true, PhaseKind::Refresh),
            (false, PhaseKind::Refresh),
        ]
    );
    assert!(matches!(
        sink.borrow().events().last(),
        Some(RecordedEvent::TickEnd { frame_index: 0, frame_counter: 1, .. })
    ));
}

#[test]
fn recorded_draws_export_as_json() {
    let viewport = viewport();
    walking_sprite(&viewport, 9);
    viewport.redraw().unwrap();
    let json = viewport.surface().to_json();
    assert_eq!(json[0]["op"], "clear");
    assert_eq!(json[1]["op"], "draw");
    assert_eq!(json[1]["image"], 9);
}
