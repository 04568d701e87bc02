//! Flood fill and contiguous-region (magic wand) search.

use crate::color::Color;
use crate::store::{GridPoint, LayerId, Pixel, PixelChange, PixelStore};
use std::collections::HashSet;

const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Walk the 4-connected region of cells whose effective color equals the
/// seed's color, calling `visit` once per member cell.
fn walk_region(store: &PixelStore, seed: GridPoint, size: i32, mut visit: impl FnMut(GridPoint)) {
    if !seed.in_bounds(size) {
        return;
    }
    let target = store.get_at(seed);
    let mut seen = HashSet::new();
    let mut stack = vec![seed];

    while let Some(p) = stack.pop() {
        if !p.in_bounds(size) || !seen.insert(p) {
            continue;
        }
        if store.get_at(p) != target {
            continue;
        }
        visit(p);
        for (dx, dy) in NEIGHBORS {
            stack.push(p.offset(dx, dy));
        }
    }
}

/// Replace the contiguous region under `seed` with `replacement`.
///
/// Filling with transparent erases the region. Returns one diff entry per
/// changed cell; the result is empty when the region already has the
/// replacement color.
pub fn flood_fill(
    store: &mut PixelStore,
    seed: GridPoint,
    replacement: Color,
    layer_id: LayerId,
    size: i32,
) -> Vec<PixelChange> {
    let replacement = replacement.normalized();
    if !seed.in_bounds(size) {
        return Vec::new();
    }
    let target = store.get_at(seed);
    if target == replacement {
        return Vec::new();
    }

    let mut region = Vec::new();
    walk_region(store, seed, size, |p| region.push(p));

    let mut changes = Vec::with_capacity(region.len());
    for p in region {
        let before = store.pixel(p.x, p.y).copied();
        store.set_at(p, replacement, layer_id);
        changes.push(PixelChange::between(p, before.as_ref(), store.pixel(p.x, p.y)));
    }
    changes.sort_by_key(|c| (c.y, c.x));
    changes
}

/// Materialized pixels of the contiguous same-color region under `seed`.
///
/// Read-only. Transparent cells never belong to a region, so clicking on an
/// empty cell yields nothing.
pub fn magic_wand(store: &PixelStore, seed: GridPoint, size: i32) -> Vec<(GridPoint, Pixel)> {
    if store.get_at(seed).is_transparent() {
        return Vec::new();
    }
    let mut region = Vec::new();
    walk_region(store, seed, size, |p| {
        if let Some(pixel) = store.pixel(p.x, p.y) {
            region.push((p, *pixel));
        }
    });
    region.sort_by_key(|(p, _)| (p.y, p.x));
    region
}
