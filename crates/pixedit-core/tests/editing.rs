//! End-to-end editing sessions driven through the public `Canvas` API.

use pixedit_core::{
    Canvas, CanvasConfig, CanvasDocument, Color, GridPoint, LayerId, Pixel, PixelChange,
    PixelStore, ToolKind,
};

fn red() -> Color {
    "#FF0000".parse().unwrap()
}

fn draw_session(c: &mut Canvas) -> Vec<PixelStore> {
    let mut snapshots = vec![c.pixels().snapshot()];

    c.set_primary_color(red());
    c.pointer_down(1, 1, ToolKind::Pencil);
    c.pointer_move(6, 4);
    c.pointer_up();
    snapshots.push(c.pixels().snapshot());

    c.set_primary_color("#00FF00".parse().unwrap());
    c.set_brush_size(2);
    c.pointer_down(0, 7, ToolKind::Rectangle);
    c.pointer_move(7, 2);
    c.pointer_up();
    snapshots.push(c.pixels().snapshot());

    c.pointer_down(3, 5, ToolKind::Fill);
    snapshots.push(c.pixels().snapshot());

    c.pointer_down(2, 2, ToolKind::Eraser);
    c.pointer_move(2, 6);
    c.pointer_up();
    snapshots.push(c.pixels().snapshot());

    c.set_brush_size(1);
    c.set_primary_color(red());
    c.pointer_down(4, 4, ToolKind::CircleFill);
    c.pointer_move(6, 6);
    c.pointer_up();
    snapshots.push(c.pixels().snapshot());

    snapshots
}

#[test]
fn test_pencil_click_scenario() {
    let mut c = Canvas::new(8);
    c.set_primary_color(red());
    c.pointer_down(2, 2, ToolKind::Pencil);
    c.pointer_up();

    let state = c.history_state();
    assert_eq!(state.undo_stack.len(), 1);
    assert_eq!(
        state.undo_stack[0].pixels,
        vec![PixelChange {
            x: 2,
            y: 2,
            previous_color: Color::TRANSPARENT,
            new_color: red(),
            previous_layer: None,
            new_layer: Some(LayerId(0)),
        }]
    );
    assert_eq!(c.get(2, 2).to_string(), "#FF0000");

    let json = serde_json::to_value(&state.undo_stack[0]).unwrap();
    assert_eq!(json["tool"], "pencil");
    assert_eq!(json["pixels"][0]["previousColor"], "transparent");
    assert_eq!(json["pixels"][0]["newColor"], "#FF0000");
}

#[test]
fn test_filled_rectangle_scenario() {
    let mut c = Canvas::new(8);
    c.set_primary_color("#00FF00".parse().unwrap());
    c.pointer_down(1, 1, ToolKind::RectangleFill);
    c.pointer_move(3, 3);
    c.pointer_up();

    for y in 1..=2 {
        for x in 1..=2 {
            assert_eq!(c.get(x, y).to_string(), "#00FF00");
        }
    }
    assert!(c.get(3, 3).is_transparent());
}

#[test]
fn test_copy_escape_paste_scenario() {
    let mut c = Canvas::new(10);
    c.set_primary_color(Color::WHITE);
    c.pointer_down(0, 0, ToolKind::Pencil);
    c.pointer_up();

    c.pointer_down(0, 0, ToolKind::Select);
    c.pointer_move(1, 1);
    c.pointer_up();
    assert!(c.copy());
    c.escape_selection();
    assert!(c.paste());

    assert_eq!(c.get(4, 4), Color::WHITE);
    let sel = c.selection().unwrap();
    assert_eq!(sel.start_pos, GridPoint::new(4, 4));
    assert_eq!(sel.current_pos, GridPoint::new(4, 4));
}

#[test]
fn test_undo_walks_back_through_every_gesture() {
    let mut c = Canvas::new(8);
    let snapshots = draw_session(&mut c);
    let ops = c.history().undo_len();
    assert_eq!(ops, snapshots.len() - 1);

    for expected in snapshots.iter().rev().skip(1) {
        assert!(c.undo());
        assert_eq!(c.pixels(), expected);
    }
    assert!(!c.undo());

    for expected in snapshots.iter().skip(1) {
        assert!(c.redo());
        assert_eq!(c.pixels(), expected);
    }
    assert!(!c.redo());
}

#[test]
fn test_replay_is_an_exact_inverse() {
    let mut c = Canvas::new(8);
    draw_session(&mut c);

    let mut doc = CanvasDocument::new(8);
    for op in c.history_state().undo_stack {
        let before = doc.pixels.snapshot();
        op.apply(&mut doc, false);
        let after = doc.pixels.snapshot();
        op.apply(&mut doc, true);
        assert_eq!(doc.pixels, before, "{} did not round-trip", op.label());
        op.apply(&mut doc, false);
        assert_eq!(doc.pixels, after);
    }
    assert_eq!(&doc.pixels, c.pixels());
}

#[test]
fn test_no_entry_is_a_noop_change() {
    let mut c = Canvas::new(8);
    draw_session(&mut c);
    // Paint over existing red with red.
    c.set_primary_color(red());
    c.pointer_down(0, 0, ToolKind::Line);
    c.pointer_move(7, 7);
    c.pointer_up();

    for op in c.history_state().undo_stack {
        assert!(op.pixels.iter().all(|p| p.previous_color != p.new_color));
    }
}

#[test]
fn test_new_operation_invalidates_redo() {
    let mut c = Canvas::new(8);
    draw_session(&mut c);
    assert!(c.undo());
    assert!(c.undo());
    assert!(c.can_redo());

    c.pointer_down(7, 0, ToolKind::Pencil);
    c.pointer_up();
    assert!(!c.can_redo());
    assert_eq!(c.history_state().redo_stack.len(), 0);
}

#[test]
fn test_history_is_bounded() {
    let config = CanvasConfig {
        size: 16,
        max_history: 5,
        ..CanvasConfig::default()
    };
    let mut c = Canvas::from_config(&config).unwrap();
    for i in 0..8 {
        c.pointer_down(i, 0, ToolKind::Pencil);
        c.pointer_up();
    }
    assert_eq!(c.history_state().undo_stack.len(), 5);

    while c.undo() {}
    // The three oldest dots can no longer be undone.
    assert_eq!(c.pixels().len(), 3);
    for i in 0..3 {
        assert_eq!(c.get(i, 0), Color::BLACK);
    }
}

#[test]
fn test_erasing_leaves_no_transparent_entries() {
    let mut c = Canvas::new(8);
    draw_session(&mut c);
    c.pointer_down(0, 0, ToolKind::Select);
    c.pointer_move(7, 7);
    c.pointer_up();
    assert!(c.cut());

    assert!(c.pixels().is_empty());
    assert!(c.get(3, 3).is_transparent());
}

#[test]
fn test_lasso_selects_inside_path() {
    let mut c = Canvas::new(8);
    c.pointer_down(0, 0, ToolKind::RectangleFill);
    c.pointer_move(8, 8);
    c.pointer_up();
    assert_eq!(c.pixels().len(), 64);

    c.pointer_down(1, 1, ToolKind::Lasso);
    c.pointer_move(6, 1);
    c.pointer_move(1, 6);
    c.pointer_up();
    assert!(c.cut());

    // The triangle and its edges are gone, the far corner is untouched.
    assert!(c.get(2, 2).is_transparent());
    assert!(c.get(1, 6).is_transparent());
    assert_eq!(c.get(6, 6), Color::BLACK);
    assert_eq!(c.get(0, 0), Color::BLACK);
}

#[test]
fn test_drawing_requires_layer() {
    let config = CanvasConfig::from_json(r#"{"size": 8, "activeLayer": null}"#).unwrap();
    let mut c = Canvas::from_config(&config).unwrap();
    c.pointer_down(2, 2, ToolKind::Pencil);
    c.pointer_up();
    assert!(c.pixels().is_empty());

    c.set_active_layer(Some(LayerId(3)));
    c.pointer_down(2, 2, ToolKind::Pencil);
    c.pointer_up();
    assert_eq!(c.pixels().pixel(2, 2).map(|p| p.layer_id), Some(LayerId(3)));
}

#[test]
fn test_undo_restores_overdrawn_layers() {
    let mut c = Canvas::new(8);
    c.set_active_layer(Some(LayerId(1)));
    c.set_primary_color(red());
    c.pointer_down(0, 3, ToolKind::Line);
    c.pointer_move(7, 3);
    c.pointer_up();
    let before = c.pixels().snapshot();

    c.set_active_layer(Some(LayerId(0)));
    c.set_primary_color(Color::WHITE);
    c.pointer_down(3, 0, ToolKind::Line);
    c.pointer_move(3, 7);
    c.pointer_up();
    c.pointer_down(5, 3, ToolKind::Fill);
    let after = c.pixels().snapshot();
    assert_eq!(c.pixels().pixel(3, 3), Some(&Pixel::new(Color::WHITE, LayerId(0))));

    assert!(c.undo());
    assert!(c.undo());
    assert_eq!(c.pixels(), &before);
    assert_eq!(c.pixels().pixel(3, 3), Some(&Pixel::new(red(), LayerId(1))));

    assert!(c.redo());
    assert!(c.redo());
    assert_eq!(c.pixels(), &after);
}

#[test]
fn test_history_json_carries_layers() {
    let mut c = Canvas::new(8);
    c.set_active_layer(Some(LayerId(2)));
    c.pointer_down(1, 1, ToolKind::Pencil);
    c.pointer_up();
    c.set_active_layer(Some(LayerId(0)));
    c.set_primary_color(red());
    c.pointer_down(1, 1, ToolKind::Pencil);
    c.pointer_up();

    let state = c.history_state();
    let json = serde_json::to_value(&state.undo_stack[1]).unwrap();
    assert_eq!(json["pixels"][0]["previousLayer"], 2);
    assert_eq!(json["pixels"][0]["newLayer"], 0);
}

#[test]
fn test_far_off_canvas_drags() {
    let mut c = Canvas::new(8);
    c.pointer_down(0, 0, ToolKind::CircleFill);
    c.pointer_move(70_000, 70_000);
    c.pointer_up();
    assert!(c.pixels().iter().all(|(p, _)| p.in_bounds(8)));

    c.pointer_down(0, 0, ToolKind::RectangleFill);
    c.pointer_move(i32::MAX, i32::MAX);
    c.pointer_up();
    assert_eq!(c.pixels().len(), 64);

    c.pointer_down(i32::MIN, 3, ToolKind::Circle);
    c.pointer_move(i32::MAX, -4);
    c.pointer_up();
    assert!(c.pixels().len() <= 64);
    assert!(c.undo());
}
