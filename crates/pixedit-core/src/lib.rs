//! PixEdit Core Library
//!
//! Platform-agnostic pixel-art editing engine: a sparse pixel store, grid
//! rasterization, selections, an in-engine clipboard and bounded undo/redo.

pub mod canvas;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod history;
pub mod raster;
pub mod selection;
pub mod store;
pub mod tools;

pub use canvas::{Canvas, CanvasDocument, CanvasEvent};
pub use clipboard::{Clipboard, ClipboardOperation};
pub use color::{Color, ParseColorError};
pub use config::{CanvasConfig, ConfigError};
pub use history::{DEFAULT_MAX_HISTORY, History, HistoryState, OperationKind, StrokeOperation};
pub use raster::{BrushPattern, ClipWindow, ShapeKind};
pub use selection::{Selection, SelectionBounds, SelectionMask, SelectionShape};
pub use store::{GridPoint, LayerId, Pixel, PixelChange, PixelStore};
pub use tools::{ToolKind, ToolManager};
