//! Sparse pixel storage.
//!
//! The store maps integer grid coordinates to a colored pixel. A coordinate
//! that is absent from the map is transparent, and a transparent color is
//! never stored: writing one deletes the key. Bounds are the caller's concern.

use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of the layer a pixel was drawn on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(pub u32);

/// An integer cell coordinate on the canvas grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether the point lies in `[0, size) x [0, size)`.
    pub fn in_bounds(self, size: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < size && self.y < size
    }

    /// Clamp both axes into `[0, size - 1]`.
    pub fn clamped(self, size: i32) -> Self {
        let max = (size - 1).max(0);
        Self::new(self.x.clamp(0, max), self.y.clamp(0, max))
    }
}

impl From<(i32, i32)> for GridPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// A materialized (non-transparent) pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pixel {
    pub color: Color,
    pub layer_id: LayerId,
}

impl Pixel {
    pub fn new(color: Color, layer_id: LayerId) -> Self {
        Self { color, layer_id }
    }
}

/// One entry of a diff: the effective color of a cell before and after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelChange {
    pub x: i32,
    pub y: i32,
    pub previous_color: Color,
    pub new_color: Color,
    /// Layer of the pixel before the edit; `None` when the cell was transparent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_layer: Option<LayerId>,
    /// Layer of the pixel after the edit; `None` when the cell became transparent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_layer: Option<LayerId>,
}

impl PixelChange {
    /// The change between two materialized states of the cell at `point`.
    pub fn between(point: GridPoint, before: Option<&Pixel>, after: Option<&Pixel>) -> Self {
        Self {
            x: point.x,
            y: point.y,
            previous_color: before.map_or(Color::TRANSPARENT, |p| p.color),
            new_color: after.map_or(Color::TRANSPARENT, |p| p.color),
            previous_layer: before.map(|p| p.layer_id),
            new_layer: after.map(|p| p.layer_id),
        }
    }

    pub fn point(&self) -> GridPoint {
        GridPoint::new(self.x, self.y)
    }

    /// Whether this entry records an actual change.
    pub fn is_effective(&self) -> bool {
        self.previous_color.normalized() != self.new_color.normalized()
    }
}

/// Pack two signed 32-bit coordinates into one map key.
#[inline]
fn pack(x: i32, y: i32) -> u64 {
    ((x as u32 as u64) << 32) | (y as u32 as u64)
}

#[inline]
fn unpack(key: u64) -> GridPoint {
    GridPoint::new((key >> 32) as u32 as i32, key as u32 as i32)
}

/// Sparse coordinate -> pixel map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelStore {
    pixels: HashMap<u64, Pixel>,
}

impl PixelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective color at a coordinate (transparent when absent).
    pub fn get(&self, x: i32, y: i32) -> Color {
        self.pixels
            .get(&pack(x, y))
            .map(|p| p.color)
            .unwrap_or(Color::TRANSPARENT)
    }

    pub fn get_at(&self, point: GridPoint) -> Color {
        self.get(point.x, point.y)
    }

    /// The stored pixel, if one is materialized at this coordinate.
    pub fn pixel(&self, x: i32, y: i32) -> Option<&Pixel> {
        self.pixels.get(&pack(x, y))
    }

    /// Write a color. A transparent color deletes the key.
    ///
    /// Repainting a cell with the color it already has is a no-op, so the
    /// pixel keeps its original layer.
    pub fn set(&mut self, x: i32, y: i32, color: Color, layer_id: LayerId) {
        let key = pack(x, y);
        if color.is_transparent() {
            self.pixels.remove(&key);
            return;
        }
        match self.pixels.get_mut(&key) {
            Some(pixel) if pixel.color == color => {}
            Some(pixel) => *pixel = Pixel::new(color, layer_id),
            None => {
                self.pixels.insert(key, Pixel::new(color, layer_id));
            }
        }
    }

    pub fn set_at(&mut self, point: GridPoint, color: Color, layer_id: LayerId) {
        self.set(point.x, point.y, color, layer_id);
    }

    pub(crate) fn remove(&mut self, x: i32, y: i32) -> Option<Pixel> {
        self.pixels.remove(&pack(x, y))
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    /// Iterate over every materialized pixel in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPoint, &Pixel)> + '_ {
        self.pixels.iter().map(|(&key, pixel)| (unpack(key), pixel))
    }

    /// Materialized pixels sorted by coordinate, for deterministic consumers.
    pub fn sorted_entries(&self) -> Vec<(GridPoint, Pixel)> {
        let mut entries: Vec<_> = self.iter().map(|(p, px)| (p, *px)).collect();
        entries.sort_by_key(|(p, _)| (p.y, p.x));
        entries
    }

    /// Keep only the pixels for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(GridPoint, &Pixel) -> bool) {
        self.pixels.retain(|&key, pixel| keep(unpack(key), pixel));
    }

    /// Full-value copy used as the before/after reference of a gesture.
    pub fn snapshot(&self) -> PixelStore {
        self.clone()
    }

    /// Minimal list of cells whose effective color differs between two states,
    /// sorted row-major. Each entry carries the layers on both sides.
    pub fn diff(before: &PixelStore, after: &PixelStore) -> Vec<PixelChange> {
        let mut changes = Vec::new();
        for (&key, old) in &before.pixels {
            let new = after.pixels.get(&key);
            if new.map(|p| p.color) != Some(old.color) {
                changes.push(PixelChange::between(unpack(key), Some(old), new));
            }
        }
        for (&key, new) in &after.pixels {
            if !before.pixels.contains_key(&key) {
                changes.push(PixelChange::between(unpack(key), None, Some(new)));
            }
        }
        changes.sort_by_key(|c| (c.y, c.x));
        changes
    }
}

impl FromIterator<(GridPoint, Pixel)> for PixelStore {
    fn from_iter<I: IntoIterator<Item = (GridPoint, Pixel)>>(iter: I) -> Self {
        let mut store = PixelStore::new();
        for (point, pixel) in iter {
            store.set_at(point, pixel.color, pixel.layer_id);
        }
        store
    }
}
