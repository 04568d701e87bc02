//! Grid rasterization: brush stamping, shape outlines and fills, flood fill.
//!
//! Everything here produces cell coordinates or pixel diffs. Canvas bounds are
//! passed in explicitly since the pixel store itself is unbounded.

mod brush;
mod fill;
mod shapes;

pub use brush::{BrushPattern, interpolate_stroke, stamp};
pub use fill::{flood_fill, magic_wand};
pub use shapes::{
    ClipWindow, ShapeKind, circle_border, circle_fill, circle_geometry, line, rectangle_border,
    rectangle_fill,
};
