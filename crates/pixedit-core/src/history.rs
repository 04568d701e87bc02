//! Undo/redo history of stroke operations.
//!
//! Each user gesture becomes one [`StrokeOperation`]: a minimal pixel diff
//! plus whatever selection or clipboard payload the operation kind needs to
//! replay itself in either direction.

use crate::canvas::CanvasDocument;
use crate::raster::ShapeKind;
use crate::selection::{Selection, SelectionBounds, SelectionContent, content_entries};
use crate::store::{LayerId, PixelChange};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of undo entries to keep.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// What an operation did, with the payload its replay needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "kebab-case")]
pub enum OperationKind {
    Pencil,
    Eraser,
    Fill,
    Shape {
        shape: ShapeKind,
    },
    /// A selection was made or its content recaptured.
    Select {
        selection: Selection,
    },
    Copy {
        bounds: SelectionBounds,
        #[serde(with = "content_entries")]
        content: SelectionContent,
    },
    /// `selection` is the selection as it was before the cut.
    Cut {
        selection: Selection,
    },
    /// `selection` wraps the pasted pixels.
    Paste {
        selection: Selection,
    },
    /// Bulk replacement from an external template.
    Template,
    MoveSelection {
        before: Selection,
        after: Selection,
    },
}

impl OperationKind {
    /// Short human-readable label for a history viewer.
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Pencil => "Pencil",
            OperationKind::Eraser => "Eraser",
            OperationKind::Fill => "Fill",
            OperationKind::Shape { shape } => match shape {
                ShapeKind::Rectangle => "Rectangle",
                ShapeKind::RectangleFill => "Filled Rectangle",
                ShapeKind::Circle => "Circle",
                ShapeKind::CircleFill => "Filled Circle",
                ShapeKind::Line => "Line",
            },
            OperationKind::Select { .. } => "Select",
            OperationKind::Copy { .. } => "Copy",
            OperationKind::Cut { .. } => "Cut",
            OperationKind::Paste { .. } => "Paste",
            OperationKind::Template => "Template",
            OperationKind::MoveSelection { .. } => "Move Selection",
        }
    }
}

/// One undoable history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeOperation {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: OperationKind,
    pub layer_id: LayerId,
    pub pixels: Vec<PixelChange>,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl StrokeOperation {
    /// Stamp a new operation. Entries that do not change a color are dropped.
    pub fn new(kind: OperationKind, layer_id: LayerId, mut pixels: Vec<PixelChange>) -> Self {
        pixels.retain(PixelChange::is_effective);
        Self {
            id: Uuid::new_v4(),
            kind,
            layer_id,
            pixels,
            timestamp: now_millis(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// Replay the operation onto a document, backwards when `reverse` is set.
    pub fn apply(&self, doc: &mut CanvasDocument, reverse: bool) {
        match &self.kind {
            OperationKind::Select { selection } => {
                doc.selection = if reverse { None } else { Some(selection.clone()) };
            }
            OperationKind::Copy { .. } => {
                if reverse {
                    doc.clipboard = None;
                }
            }
            OperationKind::Cut { selection } => {
                self.apply_pixels(doc, reverse);
                // After a cut the region is empty, so only the bounds come back on redo.
                doc.selection = Some(if reverse {
                    selection.clone()
                } else {
                    selection.without_content()
                });
            }
            OperationKind::Paste { selection } => {
                self.apply_pixels(doc, reverse);
                doc.selection = if reverse { None } else { Some(selection.clone()) };
            }
            OperationKind::MoveSelection { before, after } => {
                self.apply_pixels(doc, reverse);
                doc.selection = Some(if reverse { before.clone() } else { after.clone() });
            }
            OperationKind::Pencil
            | OperationKind::Eraser
            | OperationKind::Fill
            | OperationKind::Shape { .. }
            | OperationKind::Template => self.apply_pixels(doc, reverse),
        }
    }

    /// Entries without a recorded layer fall back to the operation's layer.
    fn apply_pixels(&self, doc: &mut CanvasDocument, reverse: bool) {
        for change in &self.pixels {
            let (color, layer) = if reverse {
                (change.previous_color, change.previous_layer)
            } else {
                (change.new_color, change.new_layer)
            };
            let layer = layer.unwrap_or(self.layer_id);
            doc.pixels.set(change.x, change.y, color, layer);
        }
    }
}

/// Snapshot of both stacks for a history UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    pub undo_stack: Vec<StrokeOperation>,
    pub redo_stack: Vec<StrokeOperation>,
    pub max_history_size: usize,
}

/// Bounded undo stack with a redo stack that is cleared on every push.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<StrokeOperation>,
    redo_stack: VecDeque<StrokeOperation>,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_size,
        }
    }

    /// Record a new operation. Redo is invalidated and the oldest entries are
    /// dropped past `max_size`.
    pub fn push(&mut self, op: StrokeOperation) {
        self.redo_stack.clear();
        self.undo_stack.push_back(op);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Move the newest operation onto the redo stack and return it for replay.
    pub fn undo(&mut self) -> Option<&StrokeOperation> {
        let op = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(op);
        self.redo_stack.back()
    }

    /// Move the newest undone operation back and return it for replay.
    pub fn redo(&mut self) -> Option<&StrokeOperation> {
        let op = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(op);
        self.undo_stack.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Labels of the undo stack, most recent first.
    pub fn undo_labels(&self) -> Vec<&'static str> {
        self.undo_stack.iter().rev().map(StrokeOperation::label).collect()
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            undo_stack: self.undo_stack.iter().cloned().collect(),
            redo_stack: self.redo_stack.iter().cloned().collect(),
            max_history_size: self.max_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::store::{GridPoint, Pixel, PixelStore};

    const RED: Color = Color::rgb(255, 0, 0);
    const L: LayerId = LayerId(0);

    fn change(x: i32, prev: Color, new: Color) -> PixelChange {
        PixelChange {
            x,
            y: 0,
            previous_color: prev,
            new_color: new,
            previous_layer: None,
            new_layer: None,
        }
    }

    fn pencil(n: i32) -> StrokeOperation {
        StrokeOperation::new(
            OperationKind::Pencil,
            L,
            vec![change(n, Color::TRANSPARENT, RED)],
        )
    }

    #[test]
    fn test_new_drops_ineffective_entries() {
        let op = StrokeOperation::new(
            OperationKind::Pencil,
            L,
            vec![change(0, RED, RED), change(1, Color::TRANSPARENT, RED)],
        );
        assert_eq!(op.pixels.len(), 1);
        assert_eq!(op.pixels[0].x, 1);
    }

    #[test]
    fn test_undo_redo_moves_between_stacks() {
        let mut history = History::new(10);
        history.push(pencil(0));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert!(history.undo().is_some());
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert!(history.redo().is_some());
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(10);
        history.push(pencil(0));
        history.undo();
        assert!(history.can_redo());
        history.push(pencil(1));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_inert() {
        let mut history = History::new(10);
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_size_bound_drops_oldest() {
        let mut history = History::new(3);
        for n in 0..5 {
            history.push(pencil(n));
        }
        assert_eq!(history.undo_len(), 3);
        let xs: Vec<i32> = history.state().undo_stack.iter().map(|op| op.pixels[0].x).collect();
        assert_eq!(xs, vec![2, 3, 4]);
    }

    #[test]
    fn test_apply_round_trip_restores_store() {
        let mut doc = CanvasDocument::new(8);
        doc.pixels.set(1, 0, Color::WHITE, L);
        let before = doc.pixels.snapshot();

        let op = StrokeOperation::new(
            OperationKind::Fill,
            L,
            vec![change(0, Color::TRANSPARENT, RED), change(1, Color::WHITE, Color::TRANSPARENT)],
        );
        op.apply(&mut doc, false);
        assert_eq!(doc.pixels.get(0, 0), RED);
        assert_eq!(doc.pixels.get(1, 0), Color::TRANSPARENT);

        op.apply(&mut doc, true);
        assert_eq!(doc.pixels, before);
    }

    #[test]
    fn test_apply_restores_recorded_layers() {
        let mut doc = CanvasDocument::new(8);
        doc.pixels.set(0, 0, Color::WHITE, LayerId(1));
        let before = doc.pixels.snapshot();
        let mut after = before.snapshot();
        after.set(0, 0, RED, LayerId(0));
        after.set(1, 0, RED, LayerId(0));

        let op = StrokeOperation::new(
            OperationKind::Pencil,
            LayerId(0),
            PixelStore::diff(&before, &after),
        );
        op.apply(&mut doc, false);
        assert_eq!(doc.pixels, after);
        op.apply(&mut doc, true);
        assert_eq!(doc.pixels.pixel(0, 0), Some(&Pixel::new(Color::WHITE, LayerId(1))));
        assert_eq!(doc.pixels, before);
    }

    #[test]
    fn test_select_and_copy_replay() {
        let mut doc = CanvasDocument::new(8);
        let sel = Selection::from_bounds(
            SelectionBounds::from_corners(GridPoint::new(0, 0), GridPoint::new(1, 1)),
            SelectionContent::new(),
        );
        let select = StrokeOperation::new(
            OperationKind::Select {
                selection: sel.clone(),
            },
            L,
            vec![],
        );
        select.apply(&mut doc, false);
        assert_eq!(doc.selection.as_ref(), Some(&sel));
        select.apply(&mut doc, true);
        assert!(doc.selection.is_none());

        doc.clipboard = Some(crate::clipboard::Clipboard::from_selection(
            &sel,
            8,
            crate::clipboard::ClipboardOperation::Copy,
        ));
        let copy = StrokeOperation::new(
            OperationKind::Copy {
                bounds: sel.capture_bounds(8),
                content: SelectionContent::new(),
            },
            L,
            vec![],
        );
        copy.apply(&mut doc, false);
        assert!(doc.clipboard.is_some());
        copy.apply(&mut doc, true);
        assert!(doc.clipboard.is_none());
    }

    #[test]
    fn test_cut_replay_restores_content_on_undo() {
        let mut doc = CanvasDocument::new(8);
        let mut content = SelectionContent::new();
        content.insert(GridPoint::new(0, 0), Pixel::new(RED, L));
        let sel = Selection::from_bounds(
            SelectionBounds::from_corners(GridPoint::new(2, 0), GridPoint::new(2, 0)),
            content,
        );
        let cut = StrokeOperation::new(
            OperationKind::Cut { selection: sel.clone() },
            L,
            vec![change(2, RED, Color::TRANSPARENT)],
        );

        cut.apply(&mut doc, true);
        assert_eq!(doc.pixels.get(2, 0), RED);
        assert_eq!(doc.selection.as_ref(), Some(&sel));

        cut.apply(&mut doc, false);
        assert_eq!(doc.pixels.get(2, 0), Color::TRANSPARENT);
        assert!(doc.selection.as_ref().is_some_and(|s| s.content.is_empty()));
    }

    #[test]
    fn test_operation_json_is_tagged() {
        let op = StrokeOperation::new(
            OperationKind::Shape {
                shape: ShapeKind::RectangleFill,
            },
            L,
            vec![change(0, Color::TRANSPARENT, RED)],
        );
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["tool"], "shape");
        assert_eq!(value["shape"], "rectangle-fill");
        assert_eq!(value["pixels"][0]["previousColor"], "transparent");
        assert_eq!(value["pixels"][0]["newColor"], "#FF0000");

        let back: StrokeOperation = serde_json::from_value(value).unwrap();
        assert_eq!(back, op);
    }
}
