//! Canvas document and the per-gesture interaction state machine.

use crate::clipboard::{Clipboard, ClipboardOperation, remove_selected};
use crate::color::Color;
use crate::config::{CanvasConfig, ConfigError};
use crate::history::{History, HistoryState, OperationKind, StrokeOperation};
use crate::raster::{flood_fill, magic_wand, stamp};
use crate::selection::{
    Selection, SelectionBounds, SelectionContent, SelectionShape, translate_selection,
};
use crate::store::{GridPoint, LayerId, Pixel, PixelChange, PixelStore};
use crate::tools::{Gesture, ToolKind, ToolManager};

/// The mutable state that history operations replay onto.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasDocument {
    /// Side length of the square canvas.
    pub size: u32,
    pub pixels: PixelStore,
    pub selection: Option<Selection>,
    pub clipboard: Option<Clipboard>,
}

impl CanvasDocument {
    /// Create an empty document.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            pixels: PixelStore::new(),
            selection: None,
            clipboard: None,
        }
    }

    /// Canvas size as a signed cell count.
    pub fn extent(&self) -> i32 {
        i32::try_from(self.size).unwrap_or(i32::MAX)
    }
}

/// Notifications for the UI, drained after each command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEvent {
    HistoryChanged,
    SelectionChanged,
    ClipboardChanged,
    /// The eyedropper changed the primary color.
    ColorPicked(Color),
}

/// Runtime canvas state: document, history, tools and pending events.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Tool manager.
    pub tool_manager: ToolManager,
    /// Layer new pixels land on. Drawing is a no-op without one.
    pub active_layer: Option<LayerId>,
    history: History,
    events: Vec<CanvasEvent>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::with_config(&CanvasConfig::default())
    }
}

impl Canvas {
    /// Create an empty canvas of the given size with default settings.
    pub fn new(size: u32) -> Self {
        Self::with_config(&CanvasConfig {
            size,
            ..CanvasConfig::default()
        })
    }

    /// Create a canvas from an already validated config.
    pub fn with_config(config: &CanvasConfig) -> Self {
        let mut tool_manager = ToolManager::new();
        tool_manager.brush_size = config.brush_size;
        tool_manager.primary_color = config.primary_color.normalized();
        Self {
            document: CanvasDocument::new(config.size),
            tool_manager,
            active_layer: config.active_layer,
            history: History::new(config.max_history),
            events: Vec::new(),
        }
    }

    /// Validate a config and create a canvas from it.
    pub fn from_config(config: &CanvasConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    pub fn size(&self) -> i32 {
        self.document.extent()
    }

    // --- read-only views for the renderer and history UI ---

    pub fn pixels(&self) -> &PixelStore {
        &self.document.pixels
    }

    pub fn get(&self, x: i32, y: i32) -> Color {
        self.document.pixels.get(x, y)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.document.selection.as_ref()
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.document.clipboard.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Cells of the shape currently being dragged.
    pub fn preview_cells(&self) -> Vec<GridPoint> {
        self.tool_manager.preview_cells(self.size())
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    // --- settings ---

    pub fn primary_color(&self) -> Color {
        self.tool_manager.primary_color
    }

    pub fn set_primary_color(&mut self, color: Color) {
        self.tool_manager.primary_color = color.normalized();
    }

    pub fn set_brush_size(&mut self, size: u8) {
        self.tool_manager.brush_size = size;
    }

    pub fn set_active_layer(&mut self, layer: Option<LayerId>) {
        self.active_layer = layer;
    }

    /// Change the canvas size. Prior coordinates become meaningless, so the
    /// history is cleared, the selection dropped and off-canvas pixels removed.
    pub fn set_size(&mut self, size: u32) {
        if size == 0 || size > i32::MAX as u32 || size == self.document.size {
            return;
        }
        self.tool_manager.cancel();
        self.document.size = size;
        let extent = self.size();
        self.document.pixels.retain(|p, _| p.in_bounds(extent));
        self.document.selection = None;
        self.history.clear();
        log::debug!("Canvas resized to {size}x{size}; history cleared");
        self.events.push(CanvasEvent::HistoryChanged);
        self.events.push(CanvasEvent::SelectionChanged);
    }

    // --- pointer gestures ---

    /// Begin a gesture with `tool` at grid cell `(x, y)`.
    pub fn pointer_down(&mut self, x: i32, y: i32, tool: ToolKind) {
        self.finish_gesture();
        let size = self.size();
        let point = GridPoint::new(x, y);
        self.tool_manager.set_tool(tool);

        if !tool.draws() {
            self.begin_non_drawing(tool, point, size);
            return;
        }
        let Some(layer) = self.active_layer else {
            log::debug!("No active layer; ignoring {tool:?}");
            return;
        };

        if let Some(shape) = tool.shape() {
            let before = self.document.pixels.snapshot();
            self.tool_manager.begin(
                tool,
                Gesture::Shape {
                    shape,
                    start: point,
                    current: point,
                },
                before,
            );
            return;
        }

        match tool {
            ToolKind::Pencil | ToolKind::Eraser => {
                let before = self.document.pixels.snapshot();
                let color = self.tool_manager.paint_color(tool);
                let cells = stamp(&self.tool_manager.brush(), point, size);
                self.paint(&cells, color, layer);
                self.tool_manager
                    .begin(tool, Gesture::Freehand { last: point }, before);
            }
            ToolKind::Fill => {
                let color = self.tool_manager.primary_color;
                let changes = flood_fill(&mut self.document.pixels, point, color, layer, size);
                self.commit_changes(OperationKind::Fill, changes, true);
            }
            _ => {}
        }
    }

    /// Tools that never write pixels on pointer-down.
    fn begin_non_drawing(&mut self, tool: ToolKind, point: GridPoint, size: i32) {
        let layer = self.active_layer;
        match tool {
            ToolKind::Select | ToolKind::Lasso => {
                let shape = if tool == ToolKind::Lasso {
                    SelectionShape::Lasso { path: Vec::new() }
                } else {
                    SelectionShape::Rectangle
                };
                self.document.selection = Some(Selection::begin(point, size, shape));
                self.events.push(CanvasEvent::SelectionChanged);
                let before = self.document.pixels.snapshot();
                self.tool_manager.begin(tool, Gesture::Select, before);
            }
            ToolKind::MagicWand => {
                let region = magic_wand(&self.document.pixels, point, size);
                let selection = Selection::from_region(&region).map(|mut sel| {
                    sel.capture(&self.document.pixels, layer, size);
                    sel
                });
                self.document.selection = selection.clone();
                self.events.push(CanvasEvent::SelectionChanged);
                if let Some(selection) = selection {
                    self.push(OperationKind::Select { selection }, Vec::new());
                }
            }
            ToolKind::Eyedropper => {
                if !point.in_bounds(size) {
                    return;
                }
                let color = self.document.pixels.get_at(point);
                if !color.is_transparent() {
                    self.tool_manager.primary_color = color;
                    self.events.push(CanvasEvent::ColorPicked(color));
                }
            }
            ToolKind::MoveSelection => {
                let under_pointer = self
                    .document
                    .selection
                    .as_ref()
                    .is_some_and(|sel| sel.capture_bounds(size).contains(point));
                if under_pointer {
                    let before = self.document.pixels.snapshot();
                    self.tool_manager.begin(
                        tool,
                        Gesture::Move {
                            origin: point,
                            current: point,
                        },
                        before,
                    );
                }
            }
            _ => {}
        }
    }

    /// Continue the active gesture at grid cell `(x, y)`.
    pub fn pointer_move(&mut self, x: i32, y: i32) {
        let size = self.size();
        let point = GridPoint::new(x, y);

        let Some(gesture) = self.tool_manager.gesture_mut() else {
            return;
        };
        match gesture {
            Gesture::Freehand { .. } => {}
            Gesture::Shape { current, .. } | Gesture::Move { current, .. } => {
                *current = point;
                return;
            }
            Gesture::Select => {
                if let Some(sel) = self.document.selection.as_mut() {
                    sel.drag_to(point, size);
                    self.events.push(CanvasEvent::SelectionChanged);
                }
                return;
            }
        }

        let Some(layer) = self.active_layer else { return };
        let tool = self.tool_manager.current_tool;
        let cells = self.tool_manager.advance_stroke(point, size);
        if !cells.is_empty() {
            log::trace!("{tool:?} stroke to ({x}, {y}): {} cells", cells.len());
            let color = self.tool_manager.paint_color(tool);
            self.paint(&cells, color, layer);
        }
    }

    /// End the active gesture and commit it to history.
    pub fn pointer_up(&mut self) {
        let Some((tool, gesture, before)) = self.tool_manager.end() else {
            return;
        };
        let size = self.size();

        let (kind, sync) = match gesture {
            Gesture::Freehand { .. } => {
                let kind = if tool == ToolKind::Eraser {
                    OperationKind::Eraser
                } else {
                    OperationKind::Pencil
                };
                (kind, true)
            }
            Gesture::Shape {
                shape,
                start,
                current,
            } => {
                let Some(layer) = self.active_layer else { return };
                let cells = self.tool_manager.shape_cells(shape, start, current, size);
                let color = self.tool_manager.primary_color;
                self.paint(&cells, color, layer);
                (OperationKind::Shape { shape }, true)
            }
            Gesture::Select => {
                self.finish_selection();
                return;
            }
            Gesture::Move { origin, current } => {
                let Some(mut selection) = self.document.selection.take() else {
                    return;
                };
                let prior = selection.clone();
                let (dx, dy) = (current.x - origin.x, current.y - origin.y);
                let moved =
                    translate_selection(&mut self.document.pixels, &mut selection, dx, dy, size);
                self.document.selection = Some(selection.clone());
                if !moved {
                    return;
                }
                self.events.push(CanvasEvent::SelectionChanged);
                (
                    OperationKind::MoveSelection {
                        before: prior,
                        after: selection,
                    },
                    false,
                )
            }
        };

        let changes = PixelStore::diff(&before, &self.document.pixels);
        self.commit_changes(kind, changes, sync);
    }

    /// Leaving the drawing surface ends the gesture like a pointer-up.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    fn finish_gesture(&mut self) {
        if self.tool_manager.is_active() {
            self.pointer_up();
        }
    }

    fn finish_selection(&mut self) {
        let size = self.size();
        let layer = self.active_layer;
        let Some(sel) = self.document.selection.as_mut() else {
            return;
        };
        sel.finish(size);
        sel.capture(&self.document.pixels, layer, size);
        let selection = sel.clone();
        self.events.push(CanvasEvent::SelectionChanged);
        self.push(OperationKind::Select { selection }, Vec::new());
    }

    // --- selection & clipboard commands ---

    /// Copy the selection's content into the clipboard.
    pub fn copy(&mut self) -> bool {
        self.finish_gesture();
        let size = self.size();
        let Some(sel) = self.document.selection.as_ref() else {
            return false;
        };
        let clipboard = Clipboard::from_selection(sel, size, ClipboardOperation::Copy);
        let kind = OperationKind::Copy {
            bounds: clipboard.bounds,
            content: clipboard.pixels.clone(),
        };
        log::debug!("Copied {} pixels", clipboard.pixels.len());
        self.document.clipboard = Some(clipboard);
        self.events.push(CanvasEvent::ClipboardChanged);
        self.push(kind, Vec::new());
        true
    }

    /// Copy the selection into the clipboard, then remove its pixels.
    pub fn cut(&mut self) -> bool {
        self.finish_gesture();
        let size = self.size();
        let Some(selection) = self.document.selection.take() else {
            return false;
        };
        let before = self.document.pixels.snapshot();
        self.document.clipboard = Some(Clipboard::from_selection(
            &selection,
            size,
            ClipboardOperation::Cut,
        ));
        remove_selected(&mut self.document.pixels, &selection, size);
        let changes = PixelStore::diff(&before, &self.document.pixels);
        log::debug!("Cut {} pixels", changes.len());
        self.events.push(CanvasEvent::ClipboardChanged);
        self.events.push(CanvasEvent::SelectionChanged);
        self.push(OperationKind::Cut { selection }, changes);
        true
    }

    /// Paste the clipboard centered on the canvas and select the result.
    pub fn paste(&mut self) -> bool {
        self.finish_gesture();
        let size = self.size();
        let Some(layer) = self.active_layer else {
            return false;
        };
        let Some(clipboard) = self.document.clipboard.as_ref().filter(|c| !c.is_empty()) else {
            return false;
        };
        let before = self.document.pixels.snapshot();
        let Some(selection) = clipboard.paste_into(&mut self.document.pixels, layer, size) else {
            return false;
        };
        self.document.selection = Some(selection.clone());
        let changes = PixelStore::diff(&before, &self.document.pixels);
        self.events.push(CanvasEvent::SelectionChanged);
        self.push(OperationKind::Paste { selection }, changes);
        true
    }

    /// Drop the active selection. Not recorded in history.
    pub fn escape_selection(&mut self) {
        self.finish_gesture();
        if self.document.selection.take().is_some() {
            self.events.push(CanvasEvent::SelectionChanged);
        }
    }

    /// Select the whole canvas.
    pub fn select_all(&mut self) {
        self.finish_gesture();
        let size = self.size();
        let bounds = SelectionBounds::from_corners(
            GridPoint::new(0, 0),
            GridPoint::new(size - 1, size - 1),
        );
        let mut selection = Selection::from_bounds(bounds, SelectionContent::new());
        selection.capture(&self.document.pixels, self.active_layer, size);
        self.document.selection = Some(selection.clone());
        self.events.push(CanvasEvent::SelectionChanged);
        self.push(OperationKind::Select { selection }, Vec::new());
    }

    /// Erase the selected pixels without touching the clipboard.
    pub fn delete_selection(&mut self) -> bool {
        self.finish_gesture();
        let size = self.size();
        let Some(selection) = self.document.selection.as_ref() else {
            return false;
        };
        let before = self.document.pixels.snapshot();
        remove_selected(&mut self.document.pixels, selection, size);
        let changes = PixelStore::diff(&before, &self.document.pixels);
        self.commit_changes(OperationKind::Eraser, changes, true)
    }

    // --- history ---

    /// Undo the most recent operation. Returns false if there was none.
    pub fn undo(&mut self) -> bool {
        self.finish_gesture();
        let Some(op) = self.history.undo() else {
            return false;
        };
        log::debug!("Undo {} ({} pixels)", op.label(), op.pixels.len());
        op.apply(&mut self.document, true);
        self.events.push(CanvasEvent::HistoryChanged);
        true
    }

    /// Redo the most recently undone operation. Returns false if there was none.
    pub fn redo(&mut self) -> bool {
        self.finish_gesture();
        let Some(op) = self.history.redo() else {
            return false;
        };
        log::debug!("Redo {} ({} pixels)", op.label(), op.pixels.len());
        op.apply(&mut self.document, false);
        self.events.push(CanvasEvent::HistoryChanged);
        true
    }

    /// Replace every pixel with an externally loaded template.
    ///
    /// Off-canvas template pixels are ignored. Records one `Template` entry
    /// when anything changed.
    pub fn apply_template(&mut self, pixels: impl IntoIterator<Item = (GridPoint, Pixel)>) -> bool {
        self.finish_gesture();
        let size = self.size();
        let before = self.document.pixels.snapshot();
        let template: PixelStore = pixels
            .into_iter()
            .filter(|(p, _)| p.in_bounds(size))
            .collect();
        // Cells whose color survives the template keep their layer.
        self.document
            .pixels
            .retain(|p, _| template.pixel(p.x, p.y).is_some());
        for (p, pixel) in template.iter() {
            self.document.pixels.set_at(p, pixel.color, pixel.layer_id);
        }
        let changes = PixelStore::diff(&before, &self.document.pixels);
        self.commit_changes(OperationKind::Template, changes, true)
    }

    // --- internals ---

    fn paint(&mut self, cells: &[GridPoint], color: Color, layer: LayerId) {
        for &p in cells {
            self.document.pixels.set_at(p, color, layer);
        }
    }

    fn push(&mut self, kind: OperationKind, changes: Vec<PixelChange>) {
        let op = StrokeOperation::new(kind, self.active_layer.unwrap_or_default(), changes);
        log::debug!("Committed {} ({} pixels)", op.label(), op.pixels.len());
        self.history.push(op);
        self.events.push(CanvasEvent::HistoryChanged);
    }

    /// Push one operation for a non-empty diff. With `sync`, a selection that
    /// overlaps the changed cells gets its content recaptured as a follow-up
    /// `Select` entry.
    fn commit_changes(
        &mut self,
        kind: OperationKind,
        changes: Vec<PixelChange>,
        sync: bool,
    ) -> bool {
        if changes.is_empty() {
            return false;
        }
        let size = self.size();
        let overlaps = sync
            && self.document.selection.as_ref().is_some_and(|sel| {
                let mask = sel.mask(size);
                changes.iter().any(|c| mask.contains(c.point()))
            });

        self.push(kind, changes);

        if overlaps {
            let layer = self.active_layer;
            if let Some(sel) = self.document.selection.as_mut() {
                sel.capture(&self.document.pixels, layer, size);
                let selection = sel.clone();
                self.push(OperationKind::Select { selection }, Vec::new());
            }
        }
        true
    }
}
