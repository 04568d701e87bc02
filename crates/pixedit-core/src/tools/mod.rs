//! Tool system for the pixel canvas.

use crate::color::Color;
use crate::raster::{BrushPattern, ClipWindow, ShapeKind, interpolate_stroke, stamp};
use crate::store::{GridPoint, PixelStore};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
    Fill,
    Eyedropper,
    Rectangle,
    RectangleFill,
    Circle,
    CircleFill,
    Line,
    Select,
    Lasso,
    MagicWand,
    MoveSelection,
}

impl ToolKind {
    /// Pencil and eraser paint live while the pointer moves.
    pub fn is_freehand(self) -> bool {
        matches!(self, ToolKind::Pencil | ToolKind::Eraser)
    }

    /// The shape this tool rasterizes on pointer-up, if any.
    pub fn shape(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::RectangleFill => Some(ShapeKind::RectangleFill),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::CircleFill => Some(ShapeKind::CircleFill),
            ToolKind::Line => Some(ShapeKind::Line),
            _ => None,
        }
    }

    /// Tools that write pixels and therefore need an active layer.
    pub fn draws(self) -> bool {
        self.is_freehand() || self.shape().is_some() || self == ToolKind::Fill
    }
}

/// What an in-progress gesture is accumulating.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Pencil/eraser: the store is mutated live; `last` is the previous sample.
    Freehand { last: GridPoint },
    /// Shape preview between the drag corners; nothing is written until the end.
    Shape {
        shape: ShapeKind,
        start: GridPoint,
        current: GridPoint,
    },
    /// Rectangle or lasso drag; the selection itself lives on the document.
    Select,
    /// Selection translate drag.
    Move { origin: GridPoint, current: GridPoint },
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Pointer is down.
    Active {
        tool: ToolKind,
        gesture: Gesture,
        /// Store as it was on pointer-down, diffed against on pointer-up.
        before: PixelStore,
    },
}

/// Manages the current tool, brush and color, and the gesture in progress.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Tool used by the most recent pointer-down.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Brush thickness (1..=4).
    pub brush_size: u8,
    /// Color painted by the pencil, shapes and fill.
    pub primary_color: Color,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            brush_size: 1,
            primary_color: Color::BLACK,
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Any gesture in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    pub fn brush(&self) -> BrushPattern {
        BrushPattern::for_thickness(self.brush_size)
    }

    /// Color written by `tool`.
    pub fn paint_color(&self, tool: ToolKind) -> Color {
        match tool {
            ToolKind::Eraser => Color::TRANSPARENT,
            _ => self.primary_color,
        }
    }

    /// Begin a tool interaction.
    pub fn begin(&mut self, tool: ToolKind, gesture: Gesture, before: PixelStore) {
        self.current_tool = tool;
        self.state = ToolState::Active {
            tool,
            gesture,
            before,
        };
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        match &self.state {
            ToolState::Active { gesture, .. } => Some(gesture),
            ToolState::Idle => None,
        }
    }

    pub fn gesture_mut(&mut self) -> Option<&mut Gesture> {
        match &mut self.state {
            ToolState::Active { gesture, .. } => Some(gesture),
            ToolState::Idle => None,
        }
    }

    /// End the current interaction, handing back the tool, gesture and
    /// pointer-down snapshot.
    pub fn end(&mut self) -> Option<(ToolKind, Gesture, PixelStore)> {
        match std::mem::take(&mut self.state) {
            ToolState::Active {
                tool,
                gesture,
                before,
            } => Some((tool, gesture, before)),
            ToolState::Idle => None,
        }
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }

    /// Cells a freehand stroke covers when moving to `to`, advancing `last`.
    pub fn advance_stroke(&mut self, to: GridPoint, size: i32) -> Vec<GridPoint> {
        let brush = self.brush();
        match self.gesture_mut() {
            Some(Gesture::Freehand { last }) => {
                let cells = interpolate_stroke(&brush, *last, to, size);
                *last = to;
                cells
            }
            _ => Vec::new(),
        }
    }

    /// Cells a shape tool would write for a drag from `start` to `end`.
    ///
    /// Outlines are rasterized a brush-width past the canvas so stamps
    /// centered just off the edge still reach it.
    pub fn shape_cells(
        &self,
        shape: ShapeKind,
        start: GridPoint,
        end: GridPoint,
        size: i32,
    ) -> Vec<GridPoint> {
        let canvas = ClipWindow::canvas(size);
        if !shape.uses_brush() {
            return shape.rasterize(start, end, canvas);
        }
        let brush = self.brush();
        let reach = i32::try_from(brush.size()).unwrap_or(i32::MAX);
        let outline = shape.rasterize(start, end, canvas.grown(reach));
        let mut cells: Vec<GridPoint> = outline
            .into_iter()
            .flat_map(|p| stamp(&brush, p, size))
            .collect();
        cells.sort_unstable();
        cells.dedup();
        cells
    }

    /// Preview cells of the shape being dragged, for the renderer.
    pub fn preview_cells(&self, size: i32) -> Vec<GridPoint> {
        match self.gesture() {
            Some(Gesture::Shape {
                shape,
                start,
                current,
            }) => self.shape_cells(*shape, *start, *current, size),
            _ => Vec::new(),
        }
    }

    /// Current translate offset of a move-selection drag.
    pub fn move_offset(&self) -> Option<(i32, i32)> {
        match self.gesture() {
            Some(Gesture::Move { origin, current }) => {
                Some((current.x - origin.x, current.y - origin.y))
            }
            _ => None,
        }
    }
}
