//! Brush stamps and freehand stroke interpolation.

use super::shapes::{ClipWindow, line};
use crate::store::GridPoint;
use std::collections::BTreeSet;

const T: bool = true;
const F: bool = false;

static STAMP_1: &[&[bool]] = &[&[T]];
static STAMP_2: &[&[bool]] = &[&[T, T], &[T, T]];
static STAMP_3: &[&[bool]] = &[&[T, T, T], &[T, T, T], &[T, T, T]];
static STAMP_4: &[&[bool]] = &[
    &[F, T, T, F],
    &[T, T, T, T],
    &[T, T, T, T],
    &[F, T, T, F],
];

/// A fixed boolean stamp with the cell that lands on the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushPattern {
    rows: &'static [&'static [bool]],
    center_x: i32,
    center_y: i32,
}

impl BrushPattern {
    /// Pattern for a brush thickness. Anything outside 1..=4 falls back to 1.
    pub fn for_thickness(thickness: u8) -> Self {
        let (rows, center) = match thickness {
            2 => (STAMP_2, 0),
            3 => (STAMP_3, 1),
            4 => (STAMP_4, 1),
            _ => (STAMP_1, 0),
        };
        Self {
            rows,
            center_x: center,
            center_y: center,
        }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Call `visit` once per set cell of the stamp centered on `(cx, cy)`.
    /// Cells past the `i32` range are skipped.
    pub fn apply(&self, cx: i32, cy: i32, mut visit: impl FnMut(i32, i32)) {
        for (dy, row) in self.rows.iter().enumerate() {
            for (dx, &on) in row.iter().enumerate() {
                if !on {
                    continue;
                }
                let x = i64::from(cx) + dx as i64 - i64::from(self.center_x);
                let y = i64::from(cy) + dy as i64 - i64::from(self.center_y);
                if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
                    visit(x, y);
                }
            }
        }
    }
}

/// In-bounds cells covered by one stamp at `at`.
pub fn stamp(pattern: &BrushPattern, at: GridPoint, size: i32) -> Vec<GridPoint> {
    let mut cells = BTreeSet::new();
    pattern.apply(at.x, at.y, |x, y| {
        let p = GridPoint::new(x, y);
        if p.in_bounds(size) {
            cells.insert(p);
        }
    });
    cells.into_iter().collect()
}

/// Cells covered by stamping along the Bresenham segment `from -> to`.
///
/// Each cell appears once no matter how many stamps overlap it. A zero-length
/// move yields nothing: the starting cell was already stamped by the previous
/// event.
pub fn interpolate_stroke(
    pattern: &BrushPattern,
    from: GridPoint,
    to: GridPoint,
    size: i32,
) -> Vec<GridPoint> {
    if from == to {
        return Vec::new();
    }

    let reach = i32::try_from(pattern.size()).unwrap_or(i32::MAX);
    let mut cells = BTreeSet::new();
    for p in line(from, to, ClipWindow::canvas(size).grown(reach)) {
        pattern.apply(p.x, p.y, |x, y| {
            let cell = GridPoint::new(x, y);
            if cell.in_bounds(size) {
                cells.insert(cell);
            }
        });
    }
    cells.into_iter().collect()
}
