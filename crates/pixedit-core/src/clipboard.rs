//! In-engine clipboard for copy, cut and paste.

use crate::selection::{Selection, SelectionBounds, SelectionContent, content_entries};
use crate::store::{GridPoint, LayerId, Pixel, PixelStore};
use serde::{Deserialize, Serialize};

/// Which command populated the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardOperation {
    Copy,
    Cut,
}

/// Pixels copied out of a selection, keyed relative to `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    #[serde(with = "content_entries")]
    pub pixels: SelectionContent,
    pub bounds: SelectionBounds,
    pub operation: ClipboardOperation,
}

impl Clipboard {
    /// Capture a selection's content and clamped bounds.
    pub fn from_selection(selection: &Selection, size: i32, operation: ClipboardOperation) -> Self {
        Self {
            pixels: selection.content.clone(),
            bounds: selection.capture_bounds(size),
            operation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.values().all(|p| p.color.is_transparent())
    }

    /// Top-left corner that centers the clipboard box on the canvas.
    pub fn placement(&self, size: i32) -> GridPoint {
        let center = size / 2;
        GridPoint::new(
            center - self.bounds.width() / 2,
            center - self.bounds.height() / 2,
        )
    }

    /// Write the clipboard pixels centered on the canvas, onto `layer`.
    ///
    /// Transparent and off-canvas cells are skipped. Returns a new selection
    /// wrapping the cells actually written, or `None` if nothing landed on the
    /// canvas. The clipboard itself is left untouched.
    pub fn paste_into(
        &self,
        store: &mut PixelStore,
        layer: LayerId,
        size: i32,
    ) -> Option<Selection> {
        let origin = self.placement(size);
        let mut written = Vec::new();
        for (rel, pixel) in &self.pixels {
            if pixel.color.is_transparent() {
                continue;
            }
            let abs = rel.offset(origin.x, origin.y);
            if !abs.in_bounds(size) {
                continue;
            }
            store.set_at(abs, pixel.color, layer);
            written.push((abs, Pixel::new(pixel.color, layer)));
        }

        let bounds = SelectionBounds::enclosing(written.iter().map(|(p, _)| *p))?;
        let at = bounds.origin();
        let content = written
            .into_iter()
            .map(|(p, px)| (GridPoint::new(p.x - at.x, p.y - at.y), px))
            .collect();
        Some(Selection::from_bounds(bounds, content))
    }
}

/// Remove every selected pixel from the store.
pub fn remove_selected(store: &mut PixelStore, selection: &Selection, size: i32) {
    for (p, _) in selection.absolute_pixels(size) {
        store.remove(p.x, p.y);
    }
}
