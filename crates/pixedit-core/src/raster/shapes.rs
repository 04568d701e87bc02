//! Line, rectangle and circle rasterization.

use crate::store::GridPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Circles at or below this radius get their cardinal points widened.
const SMALL_CIRCLE_RADIUS: i64 = 4;

/// Half-open cell window that rasterizers clip their output to.
///
/// Shapes are enumerated only over their intersection with the window, so a
/// drag that ends far off the canvas costs no more than one on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipWindow {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl ClipWindow {
    /// `[0, size) x [0, size)`.
    pub fn canvas(size: i32) -> Self {
        let size = size.max(0);
        Self {
            min_x: 0,
            min_y: 0,
            max_x: size,
            max_y: size,
        }
    }

    /// The window widened by `margin` cells on every side.
    pub fn grown(self, margin: i32) -> Self {
        Self {
            min_x: self.min_x.saturating_sub(margin),
            min_y: self.min_y.saturating_sub(margin),
            max_x: self.max_x.saturating_add(margin),
            max_y: self.max_y.saturating_add(margin),
        }
    }

    pub fn contains(&self, p: GridPoint) -> bool {
        p.x >= self.min_x && p.x < self.max_x && p.y >= self.min_y && p.y < self.max_y
    }

    fn contains_wide(&self, x: i64, y: i64) -> bool {
        x >= i64::from(self.min_x)
            && x < i64::from(self.max_x)
            && y >= i64::from(self.min_y)
            && y < i64::from(self.max_y)
    }
}

/// Shapes committed on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    RectangleFill,
    Circle,
    CircleFill,
    Line,
}

impl ShapeKind {
    /// Cells of the shape spanned by a drag from `start` to `end` that fall
    /// inside `clip`.
    pub fn rasterize(self, start: GridPoint, end: GridPoint, clip: ClipWindow) -> Vec<GridPoint> {
        match self {
            ShapeKind::Rectangle => rectangle_border(start, end, clip),
            ShapeKind::RectangleFill => rectangle_fill(start, end, clip),
            ShapeKind::Circle => circle_border(start, end, clip),
            ShapeKind::CircleFill => circle_fill(start, end, clip),
            ShapeKind::Line => line(start, end, clip),
        }
    }

    /// Outlines are drawn with the brush; fills are painted cell by cell.
    pub fn uses_brush(self) -> bool {
        matches!(self, ShapeKind::Rectangle | ShapeKind::Circle | ShapeKind::Line)
    }
}

/// Bresenham line from `from` to `to`, both endpoints included, keeping the
/// cells inside `clip`.
pub fn line(from: GridPoint, to: GridPoint, clip: ClipWindow) -> Vec<GridPoint> {
    let mut points = Vec::new();

    let (mut x0, mut y0) = (i64::from(from.x), i64::from(from.y));
    let (x1, y1) = (i64::from(to.x), i64::from(to.y));

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if clip.contains_wide(x0, y0) {
            // Both coordinates sit inside an i32 window.
            points.push(GridPoint::new(x0 as i32, y0 as i32));
        } else if !points.is_empty() {
            // A segment crosses a convex window at most once.
            break;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }

    points
}

fn span(a: GridPoint, b: GridPoint) -> (i32, i32, i32, i32) {
    (a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Every cell of `[min_x, max_x) x [min_y, max_y)` inside `clip`.
pub fn rectangle_fill(a: GridPoint, b: GridPoint, clip: ClipWindow) -> Vec<GridPoint> {
    let (min_x, min_y, max_x, max_y) = span(a, b);
    let (x0, x1) = (min_x.max(clip.min_x), max_x.min(clip.max_x));
    let (y0, y1) = (min_y.max(clip.min_y), max_y.min(clip.max_y));
    let mut points = Vec::new();
    for y in y0..y1 {
        for x in x0..x1 {
            points.push(GridPoint::new(x, y));
        }
    }
    points
}

/// Outline of the half-open rectangle; the far edges sit at `max - 1`.
pub fn rectangle_border(a: GridPoint, b: GridPoint, clip: ClipWindow) -> Vec<GridPoint> {
    let (min_x, min_y, max_x, max_y) = span(a, b);
    if min_x == max_x || min_y == max_y {
        return Vec::new();
    }
    let (far_x, far_y) = (max_x - 1, max_y - 1);
    let (x0, x1) = (min_x.max(clip.min_x), far_x.min(clip.max_x.saturating_sub(1)));
    let (y0, y1) = (min_y.max(clip.min_y), far_y.min(clip.max_y.saturating_sub(1)));

    let mut points = BTreeSet::new();
    for x in x0..=x1 {
        for y in [min_y, far_y] {
            let p = GridPoint::new(x, y);
            if clip.contains(p) {
                points.insert(p);
            }
        }
    }
    for y in y0..=y1 {
        for x in [min_x, far_x] {
            let p = GridPoint::new(x, y);
            if clip.contains(p) {
                points.insert(p);
            }
        }
    }
    points.into_iter().collect()
}

/// Center and radius of the circle spanned by a drag.
///
/// The center is the floored midpoint of the bounding box, the radius the
/// floored distance from the center to the far corner.
pub fn circle_geometry(a: GridPoint, b: GridPoint) -> (GridPoint, i64) {
    let (min_x, min_y, max_x, max_y) = span(a, b);
    let cx = (i64::from(min_x) + i64::from(max_x)).div_euclid(2);
    let cy = (i64::from(min_y) + i64::from(max_y)).div_euclid(2);
    let dx = i128::from(i64::from(max_x) - cx);
    let dy = i128::from(i64::from(max_y) - cy);
    let radius = (dx * dx + dy * dy).isqrt() as i64;
    // The midpoint of two i32 values is itself an i32.
    (GridPoint::new(cx as i32, cy as i32), radius)
}

/// Offsets `d` in `0..=r` with `center + d` or `center - d` inside `[lo, hi)`.
fn offset_range(center: i64, lo: i32, hi: i32, r: i64) -> impl Iterator<Item = i64> {
    let (lo, hi) = (i64::from(lo), i64::from(hi));
    let plus = (lo - center).max(0)..(hi - center).min(r + 1);
    let minus = (center - hi + 1).max(0)..(center - lo + 1).min(r + 1);
    plus.chain(minus)
}

/// Every cell with `dx^2 + dy^2 <= r^2` inside `clip`, filled row by row.
pub fn circle_fill(a: GridPoint, b: GridPoint, clip: ClipWindow) -> Vec<GridPoint> {
    let (center, r) = circle_geometry(a, b);
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    let r2 = i128::from(r) * i128::from(r);
    let y0 = (cy - r).max(i64::from(clip.min_y));
    let y1 = (cy + r + 1).min(i64::from(clip.max_y));

    let mut points = Vec::new();
    for y in y0..y1 {
        let dy = i128::from(y - cy);
        let half = (r2 - dy * dy).isqrt() as i64;
        let x0 = (cx - half).max(i64::from(clip.min_x));
        let x1 = (cx + half + 1).min(i64::from(clip.max_x));
        for x in x0..x1 {
            // Clipped to the i32 window above.
            points.push(GridPoint::new(x as i32, y as i32));
        }
    }
    points
}

/// The midpoint-circle `x` for row offset `y`: the largest `x` whose
/// midpoint `x - 1/2` still lies inside radius `r`. `None` past the octant.
fn octant_x(r: i64, y: i64) -> Option<i64> {
    let t = 4 * (i128::from(r) * i128::from(r) - i128::from(y) * i128::from(y));
    if t <= 0 {
        return None;
    }
    let x = ((t - 1).isqrt() as i64 + 1) / 2;
    (x >= y).then_some(x)
}

/// Midpoint-circle outline across all eight octants, inside `clip`.
pub fn circle_border(a: GridPoint, b: GridPoint, clip: ClipWindow) -> Vec<GridPoint> {
    let (c, r) = circle_geometry(a, b);
    if r == 0 {
        return if clip.contains(c) { vec![c] } else { Vec::new() };
    }
    let (cx, cy) = (i64::from(c.x), i64::from(c.y));
    let mut points = BTreeSet::new();
    let mut put = |x: i64, y: i64| {
        if clip.contains_wide(x, y) {
            points.insert(GridPoint::new(x as i32, y as i32));
        }
    };

    // Octants whose rows sweep `y`: (+-x, +-y) around the center.
    for y in offset_range(cy, clip.min_y, clip.max_y, r) {
        let Some(x) = octant_x(r, y) else { continue };
        for (px, py) in [(x, y), (-x, y), (x, -y), (-x, -y)] {
            put(cx + px, cy + py);
        }
    }
    // Octants whose columns sweep `y`: (+-y, +-x).
    for y in offset_range(cx, clip.min_x, clip.max_x, r) {
        let Some(x) = octant_x(r, y) else { continue };
        for (px, py) in [(y, x), (-y, x), (y, -x), (-y, -x)] {
            put(cx + px, cy + py);
        }
    }

    // Octant symmetry leaves N/E/S/W single-cell tips on small circles.
    if r <= SMALL_CIRCLE_RADIUS {
        for side in [-1, 1] {
            put(cx - 1, cy + side * r);
            put(cx + 1, cy + side * r);
            put(cx + side * r, cy - 1);
            put(cx + side * r, cy + 1);
        }
    }

    points.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: ClipWindow = ClipWindow {
        min_x: i32::MIN,
        min_y: i32::MIN,
        max_x: i32::MAX,
        max_y: i32::MAX,
    };

    fn p(x: i32, y: i32) -> GridPoint {
        GridPoint::new(x, y)
    }

    #[test]
    fn test_line_endpoints_and_length() {
        let pts = line(p(0, 0), p(3, 3), ALL);
        assert_eq!(pts, vec![p(0, 0), p(1, 1), p(2, 2), p(3, 3)]);

        let pts = line(p(5, 1), p(0, 1), ALL);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts.first(), Some(&p(5, 1)));
        assert_eq!(pts.last(), Some(&p(0, 1)));
    }

    #[test]
    fn test_line_steep() {
        let pts = line(p(0, 0), p(1, 5), ALL);
        assert_eq!(pts.len(), 6);
        for w in pts.windows(2) {
            assert!((w[1].x - w[0].x).abs() <= 1);
            assert_eq!(w[1].y - w[0].y, 1);
        }
    }

    #[test]
    fn test_line_is_clipped() {
        let pts = line(p(-3, 2), p(200_000, 2), ClipWindow::canvas(8));
        assert_eq!(pts, (0..8).map(|x| p(x, 2)).collect::<Vec<_>>());
    }

    #[test]
    fn test_rectangle_fill_is_half_open() {
        let pts = rectangle_fill(p(1, 1), p(3, 3), ALL);
        assert_eq!(pts, vec![p(1, 1), p(2, 1), p(1, 2), p(2, 2)]);
        assert!(rectangle_fill(p(2, 2), p(2, 5), ALL).is_empty());
    }

    #[test]
    fn test_rectangle_border_order_independent() {
        let a = rectangle_border(p(0, 0), p(4, 4), ALL);
        let b = rectangle_border(p(4, 4), p(0, 0), ALL);
        assert_eq!(a, b);
        // 4x4 outline
        assert_eq!(a.len(), 12);
        assert!(a.contains(&p(3, 3)));
        assert!(!a.contains(&p(4, 4)));
        assert!(!a.contains(&p(1, 1)));
    }

    #[test]
    fn test_far_rectangles_only_enumerate_the_window() {
        let clip = ClipWindow::canvas(8);
        assert_eq!(rectangle_fill(p(0, 0), p(i32::MAX, i32::MAX), clip).len(), 64);

        // Only the top edge crosses the window.
        let border = rectangle_border(p(i32::MIN, 2), p(i32::MAX, 6_000_000), clip);
        assert_eq!(border, (0..8).map(|x| p(x, 2)).collect::<Vec<_>>());
        assert_eq!(rectangle_border(p(0, 0), p(70_000, 70_000), clip).len(), 15);
    }

    #[test]
    fn test_circle_geometry() {
        let (c, r) = circle_geometry(p(0, 0), p(10, 0));
        assert_eq!((c, r), (p(5, 0), 5));

        let (c, r) = circle_geometry(p(0, 0), p(4, 4));
        assert_eq!((c, r), (p(2, 2), 2));

        let (c, r) = circle_geometry(p(i32::MIN, i32::MIN), p(i32::MAX, i32::MAX));
        assert_eq!(c, p(-1, -1));
        assert_eq!(r, 3_037_000_499);
    }

    #[test]
    fn test_circle_fill_contains_center_and_axes() {
        let pts = circle_fill(p(0, 0), p(6, 0), ALL);
        let c = p(3, 0);
        assert!(pts.contains(&c));
        assert!(pts.contains(&p(6, 0)));
        assert!(pts.contains(&p(3, 3)));
        assert!(!pts.contains(&p(6, 3)));
        for q in &pts {
            let (dx, dy) = (q.x - c.x, q.y - c.y);
            assert!(dx * dx + dy * dy <= 9);
        }
        assert_eq!(pts.len(), 29);
    }

    #[test]
    fn test_far_circle_fill_is_clipped() {
        // The whole 8x8 canvas sits deep inside the circle.
        let pts = circle_fill(p(-100, -100), p(70_000, 70_000), ClipWindow::canvas(8));
        assert_eq!(pts.len(), 64);
        let (min, max) = (p(i32::MIN, i32::MIN), p(i32::MAX, i32::MAX));
        let pts = circle_fill(min, max, ClipWindow::canvas(4));
        assert_eq!(pts.len(), 16);
    }

    #[test]
    fn test_small_circle_cardinals_are_widened() {
        let pts = circle_border(p(0, 0), p(2, 0), ALL);
        let c = p(1, 0);
        // radius 1: full ring around the center
        assert_eq!(pts.len(), 8);
        assert!(!pts.contains(&c));
        assert!(pts.contains(&c.offset(1, 1)));
    }

    #[test]
    fn test_large_circle_is_symmetric() {
        let pts = circle_border(p(0, 0), p(20, 0), ALL);
        let (c, r) = circle_geometry(p(0, 0), p(20, 0));
        let r = r as i32;
        assert!(pts.contains(&c.offset(r, 0)));
        assert!(pts.contains(&c.offset(0, -r)));
        for q in &pts {
            let (dx, dy) = (q.x - c.x, q.y - c.y);
            assert!(pts.contains(&c.offset(-dx, dy)));
            assert!(pts.contains(&c.offset(dx, -dy)));
            assert!(pts.contains(&c.offset(dy, dx)));
            let d2 = dx * dx + dy * dy;
            assert!(d2 <= (r + 1) * (r + 1) && d2 >= (r - 1) * (r - 1));
        }
    }

    #[test]
    fn test_clipped_circle_border_matches_unclipped() {
        let clip = ClipWindow {
            min_x: 14,
            min_y: -4,
            max_x: 20,
            max_y: 6,
        };
        let full = circle_border(p(-4, -7), p(16, 9), ALL);
        let clipped = circle_border(p(-4, -7), p(16, 9), clip);
        let expected: Vec<GridPoint> = full.into_iter().filter(|q| clip.contains(*q)).collect();
        assert_eq!(expected.len(), 10);
        assert_eq!(clipped, expected);
    }

    #[test]
    fn test_far_circle_border_is_clipped() {
        let clip = ClipWindow::canvas(8);
        // Radius 50000 around (50000, 0): only the west tip reaches the canvas.
        let pts = circle_border(p(0, 0), p(100_000, 0), clip);
        assert_eq!(pts, (0..8).map(|y| p(0, y)).collect::<Vec<_>>());

        let pts = circle_border(p(1000, 1000), p(101_000, 101_000), clip);
        assert!(pts.is_empty());
    }

    #[test]
    fn test_zero_radius_circle() {
        assert_eq!(circle_border(p(3, 3), p(3, 3), ALL), vec![p(3, 3)]);
    }
}
