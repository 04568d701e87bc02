//! Headless replay of PixEdit command scripts.
//!
//! A script is a JSON document with an optional canvas config and a list of
//! commands. Running it drives a [`Canvas`] exactly as an interactive UI would
//! and produces a [`ReplayReport`] describing the final state.

use pixedit_core::{Canvas, CanvasConfig, Color, ConfigError, LayerId, Selection, ToolKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid canvas config: {0}")]
    Config(#[from] ConfigError),
}

pub type ReplayResult<T> = Result<T, ReplayError>;

/// One UI-level command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    PointerDown { x: i32, y: i32, tool: ToolKind },
    PointerMove { x: i32, y: i32 },
    PointerUp,
    PointerLeave,
    Copy,
    Cut,
    Paste,
    Escape,
    SelectAll,
    Delete,
    Undo,
    Redo,
    SetColor { color: Color },
    SetBrushSize { size: u8 },
    SetLayer { layer: Option<LayerId> },
    Resize { size: u32 },
}

/// A replayable editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: CanvasConfig,
    pub commands: Vec<Command>,
}

/// One non-transparent cell of the final canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelEntry {
    pub x: i32,
    pub y: i32,
    pub color: Color,
    pub layer_id: LayerId,
}

/// Final canvas state after a replay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub size: u32,
    /// Sorted by row, then column.
    pub pixels: Vec<PixelEntry>,
    pub selection: Option<Selection>,
    /// Undo stack labels, most recent first.
    pub undo: Vec<String>,
    pub redo_depth: usize,
    pub primary_color: Color,
}

impl ReplayReport {
    fn from_canvas(canvas: &Canvas) -> Self {
        Self {
            size: canvas.document.size,
            pixels: canvas
                .pixels()
                .sorted_entries()
                .into_iter()
                .map(|(p, px)| PixelEntry {
                    x: p.x,
                    y: p.y,
                    color: px.color,
                    layer_id: px.layer_id,
                })
                .collect(),
            selection: canvas.selection().cloned(),
            undo: canvas
                .history()
                .undo_labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
            redo_depth: canvas.history().redo_len(),
            primary_color: canvas.primary_color(),
        }
    }
}

/// Parse a script from JSON.
pub fn parse_script(json: &str) -> ReplayResult<Script> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a script file.
pub fn load_script(path: impl AsRef<Path>) -> ReplayResult<Script> {
    let json = fs::read_to_string(path)?;
    parse_script(&json)
}

/// Apply a single command.
pub fn apply_command(canvas: &mut Canvas, command: &Command) {
    match *command {
        Command::PointerDown { x, y, tool } => canvas.pointer_down(x, y, tool),
        Command::PointerMove { x, y } => canvas.pointer_move(x, y),
        Command::PointerUp => canvas.pointer_up(),
        Command::PointerLeave => canvas.pointer_leave(),
        Command::Copy => {
            canvas.copy();
        }
        Command::Cut => {
            canvas.cut();
        }
        Command::Paste => {
            canvas.paste();
        }
        Command::Escape => canvas.escape_selection(),
        Command::SelectAll => canvas.select_all(),
        Command::Delete => {
            canvas.delete_selection();
        }
        Command::Undo => {
            canvas.undo();
        }
        Command::Redo => {
            canvas.redo();
        }
        Command::SetColor { color } => canvas.set_primary_color(color),
        Command::SetBrushSize { size } => canvas.set_brush_size(size),
        Command::SetLayer { layer } => canvas.set_active_layer(layer),
        Command::Resize { size } => canvas.set_size(size),
    }
}

/// Run every command of a script on a fresh canvas.
pub fn run_script(script: &Script) -> ReplayResult<ReplayReport> {
    let mut canvas = Canvas::from_config(&script.config)?;
    log::info!(
        "Replaying {} commands on a {}x{} canvas",
        script.commands.len(),
        script.config.size,
        script.config.size
    );
    for (index, command) in script.commands.iter().enumerate() {
        log::debug!("#{index}: {command:?}");
        apply_command(&mut canvas, command);
        for event in canvas.drain_events() {
            log::trace!("#{index}: {event:?}");
        }
    }
    // A script that ends mid-gesture still commits it.
    canvas.pointer_leave();
    Ok(ReplayReport::from_canvas(&canvas))
}
