//! Selection model: bounds, content capture and translation.

use crate::raster::{ClipWindow, line};
use crate::store::{GridPoint, LayerId, Pixel, PixelStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Selection-relative pixel payload (origin at the selection's top-left).
pub type SelectionContent = BTreeMap<GridPoint, Pixel>;

/// Inclusive cell bounds of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionBounds {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl SelectionBounds {
    /// Bounds spanning two corners in any order.
    pub fn from_corners(a: GridPoint, b: GridPoint) -> Self {
        Self {
            start_x: a.x.min(b.x),
            start_y: a.y.min(b.y),
            end_x: a.x.max(b.x),
            end_y: a.y.max(b.y),
        }
    }

    pub fn origin(&self) -> GridPoint {
        GridPoint::new(self.start_x, self.start_y)
    }

    pub fn width(&self) -> i32 {
        self.end_x - self.start_x + 1
    }

    pub fn height(&self) -> i32 {
        self.end_y - self.start_y + 1
    }

    pub fn contains(&self, p: GridPoint) -> bool {
        p.x >= self.start_x && p.x <= self.end_x && p.y >= self.start_y && p.y <= self.end_y
    }

    /// Clamp each edge into `[0, size - 1]`.
    pub fn clamped(&self, size: i32) -> Self {
        let max = (size - 1).max(0);
        Self {
            start_x: self.start_x.clamp(0, max),
            start_y: self.start_y.clamp(0, max),
            end_x: self.end_x.clamp(0, max),
            end_y: self.end_y.clamp(0, max),
        }
    }

    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (self.start_y..=self.end_y)
            .flat_map(move |y| (self.start_x..=self.end_x).map(move |x| GridPoint::new(x, y)))
    }

    /// Smallest bounds covering every point, or `None` for an empty set.
    pub fn enclosing(points: impl IntoIterator<Item = GridPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_corners(first, first), |b, p| Self {
            start_x: b.start_x.min(p.x),
            start_y: b.start_y.min(p.y),
            end_x: b.end_x.max(p.x),
            end_y: b.end_y.max(p.y),
        }))
    }
}

/// How membership inside the bounds is decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SelectionShape {
    /// Every cell inside the bounds.
    Rectangle,
    /// Cells inside (or on) a closed freehand polygon, in absolute coordinates.
    Lasso { path: Vec<GridPoint> },
    /// An explicit set of cells, relative to the bounds origin (magic wand).
    Region { cells: BTreeSet<GridPoint> },
}

/// Membership of a selection, resolved once over its clamped bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMask {
    /// Every cell of the bounds.
    Rectangle(SelectionBounds),
    /// Exactly these absolute cells.
    Cells(HashSet<GridPoint>),
}

impl SelectionMask {
    pub fn contains(&self, p: GridPoint) -> bool {
        match self {
            SelectionMask::Rectangle(bounds) => bounds.contains(p),
            SelectionMask::Cells(cells) => cells.contains(&p),
        }
    }

    /// Member cells, sorted by row, then column.
    pub fn cells(&self) -> Vec<GridPoint> {
        let mut cells: Vec<GridPoint> = match self {
            SelectionMask::Rectangle(bounds) => bounds.points().collect(),
            SelectionMask::Cells(cells) => cells.iter().copied().collect(),
        };
        cells.sort_unstable_by_key(|p| (p.y, p.x));
        cells
    }
}

/// An active selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Anchor corner, clamped to the canvas.
    pub start_pos: GridPoint,
    /// Opposite corner, clamped to the canvas.
    pub current_pos: GridPoint,
    /// Unclamped cursor while the selection is being dragged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_current_pos: Option<GridPoint>,
    pub shape: SelectionShape,
    #[serde(with = "content_entries")]
    pub content: SelectionContent,
}

impl Selection {
    /// Start a drag selection at the raw pointer position.
    pub fn begin(raw: GridPoint, size: i32, shape: SelectionShape) -> Self {
        let start = raw.clamped(size);
        let shape = match shape {
            SelectionShape::Lasso { .. } => SelectionShape::Lasso { path: vec![raw] },
            other => other,
        };
        Self {
            start_pos: start,
            current_pos: start,
            raw_current_pos: Some(raw),
            shape,
            content: SelectionContent::new(),
        }
    }

    /// A finished rectangular selection over `bounds`.
    pub fn from_bounds(bounds: SelectionBounds, content: SelectionContent) -> Self {
        Self {
            start_pos: bounds.origin(),
            current_pos: GridPoint::new(bounds.end_x, bounds.end_y),
            raw_current_pos: None,
            shape: SelectionShape::Rectangle,
            content,
        }
    }

    /// A finished selection of exactly the given absolute pixels.
    pub fn from_region(pixels: &[(GridPoint, Pixel)]) -> Option<Self> {
        let bounds = SelectionBounds::enclosing(pixels.iter().map(|(p, _)| *p))?;
        let origin = bounds.origin();
        let rel = |p: GridPoint| GridPoint::new(p.x - origin.x, p.y - origin.y);
        Some(Self {
            start_pos: origin,
            current_pos: GridPoint::new(bounds.end_x, bounds.end_y),
            raw_current_pos: None,
            shape: SelectionShape::Region {
                cells: pixels.iter().map(|(p, _)| rel(*p)).collect(),
            },
            content: pixels.iter().map(|(p, px)| (rel(*p), *px)).collect(),
        })
    }

    /// Extend the drag to a new raw pointer position.
    pub fn drag_to(&mut self, raw: GridPoint, size: i32) {
        self.current_pos = raw.clamped(size);
        self.raw_current_pos = Some(raw);
        if let SelectionShape::Lasso { path } = &mut self.shape {
            if path.last() != Some(&raw) {
                path.push(raw);
            }
        }
    }

    /// End the drag: the clamped corner becomes authoritative.
    ///
    /// A lasso path is pulled onto the canvas and its bounding box replaces
    /// the drag corners.
    pub fn finish(&mut self, size: i32) {
        if let Some(raw) = self.raw_current_pos.take() {
            self.current_pos = raw.clamped(size);
        }
        if let SelectionShape::Lasso { path } = &mut self.shape {
            for p in path.iter_mut() {
                *p = p.clamped(size);
            }
            if let Some(b) = SelectionBounds::enclosing(path.iter().copied()) {
                self.start_pos = b.origin();
                self.current_pos = GridPoint::new(b.end_x, b.end_y);
            }
        }
    }

    /// Unclamped bounds for on-screen tracking while dragging.
    pub fn live_bounds(&self) -> SelectionBounds {
        let corners = SelectionBounds::from_corners(
            self.start_pos,
            self.raw_current_pos.unwrap_or(self.current_pos),
        );
        match &self.shape {
            SelectionShape::Lasso { path } => {
                SelectionBounds::enclosing(path.iter().copied()).unwrap_or(corners)
            }
            _ => corners,
        }
    }

    /// Bounds clamped to the canvas, used for content capture.
    pub fn capture_bounds(&self, size: i32) -> SelectionBounds {
        self.live_bounds().clamped(size)
    }

    /// Resolve membership over the clamped bounds.
    pub fn mask(&self, size: i32) -> SelectionMask {
        let bounds = self.capture_bounds(size);
        match &self.shape {
            SelectionShape::Rectangle => SelectionMask::Rectangle(bounds),
            SelectionShape::Lasso { path } => SelectionMask::Cells(lasso_cells(path, bounds)),
            SelectionShape::Region { cells } => {
                let origin = bounds.origin();
                SelectionMask::Cells(
                    cells
                        .iter()
                        .map(|rel| rel.offset(origin.x, origin.y))
                        .filter(|&p| bounds.contains(p))
                        .collect(),
                )
            }
        }
    }

    /// Rebuild `content` from the store: every member pixel on `layer`,
    /// re-keyed relative to the clamped bounds origin.
    pub fn capture(&mut self, store: &PixelStore, layer: Option<LayerId>, size: i32) {
        self.content.clear();
        let Some(layer) = layer else { return };
        let origin = self.capture_bounds(size).origin();
        for p in self.mask(size).cells() {
            if let Some(pixel) = store.pixel(p.x, p.y).filter(|px| px.layer_id == layer) {
                self.content
                    .insert(GridPoint::new(p.x - origin.x, p.y - origin.y), *pixel);
            }
        }
    }

    /// `content` translated back to absolute canvas coordinates.
    pub fn absolute_pixels(&self, size: i32) -> Vec<(GridPoint, Pixel)> {
        let origin = self.capture_bounds(size).origin();
        self.content
            .iter()
            .map(|(rel, px)| (rel.offset(origin.x, origin.y), *px))
            .collect()
    }

    /// A copy of this selection with its content dropped.
    pub fn without_content(&self) -> Self {
        Self {
            content: SelectionContent::new(),
            ..self.clone()
        }
    }

    fn shift(&mut self, dx: i32, dy: i32) {
        self.start_pos = self.start_pos.offset(dx, dy);
        self.current_pos = self.current_pos.offset(dx, dy);
        if let SelectionShape::Lasso { path } = &mut self.shape {
            for p in path.iter_mut() {
                *p = p.offset(dx, dy);
            }
        }
    }

    /// Normalize so `start_pos` is the top-left corner.
    fn normalize_corners(&mut self) {
        let b = SelectionBounds::from_corners(self.start_pos, self.current_pos);
        self.start_pos = b.origin();
        self.current_pos = GridPoint::new(b.end_x, b.end_y);
    }
}

/// Move the selection's pixels by a drag delta.
///
/// The new top-left is clamped into the canvas. Member pixels are removed from
/// the old location and `content` is written at the new one, skipping cells
/// that fall off the canvas (those are dropped from `content` too). Returns
/// false, touching nothing, when the clamped offset is zero.
pub fn translate_selection(
    store: &mut PixelStore,
    selection: &mut Selection,
    dx: i32,
    dy: i32,
    size: i32,
) -> bool {
    let bounds = selection.capture_bounds(size);
    let max = (size - 1).max(0);
    let new_x = (bounds.start_x + dx).clamp(0, max);
    let new_y = (bounds.start_y + dy).clamp(0, max);
    let (ox, oy) = (new_x - bounds.start_x, new_y - bounds.start_y);
    if ox == 0 && oy == 0 {
        return false;
    }

    let members = selection.mask(size).cells();

    selection.normalize_corners();
    // Anchor the corners on the clamped bounds so the shift below lands on `new_x, new_y`.
    let (cx, cy) = (
        bounds.start_x - selection.start_pos.x,
        bounds.start_y - selection.start_pos.y,
    );
    selection.shift(cx + ox, cy + oy);

    let origin = GridPoint::new(new_x, new_y);
    selection
        .content
        .retain(|rel, _| rel.offset(origin.x, origin.y).in_bounds(size));
    let landed: HashSet<GridPoint> = selection
        .content
        .keys()
        .map(|rel| rel.offset(origin.x, origin.y))
        .collect();
    // Vacate only cells nothing lands on, so a cell that keeps its color
    // also keeps its layer.
    for p in members.into_iter().filter(|p| !landed.contains(p)) {
        store.remove(p.x, p.y);
    }
    for (rel, pixel) in &selection.content {
        store.set_at(rel.offset(origin.x, origin.y), pixel.color, pixel.layer_id);
    }
    true
}

/// Cells of a closed lasso path inside `bounds`: every cell the path crosses
/// plus every cell whose center passes the even-odd test.
///
/// Edges are rasterized once, then each row is filled from its sorted
/// crossings, so the cost is the path length plus the bounds area.
fn lasso_cells(path: &[GridPoint], bounds: SelectionBounds) -> HashSet<GridPoint> {
    let clip = ClipWindow {
        min_x: bounds.start_x,
        min_y: bounds.start_y,
        max_x: bounds.end_x.saturating_add(1),
        max_y: bounds.end_y.saturating_add(1),
    };
    let mut cells = HashSet::new();
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        return cells;
    };
    let closing = [last, first];
    for edge in path.windows(2).chain(std::iter::once(&closing[..])) {
        cells.extend(line(edge[0], edge[1], clip));
    }
    if path.len() < 3 {
        return cells;
    }

    let center = |p: GridPoint| (f64::from(p.x) + 0.5, f64::from(p.y) + 0.5);
    let mut crossings = Vec::new();
    for y in bounds.start_y..=bounds.end_y {
        let py = f64::from(y) + 0.5;
        crossings.clear();
        for (i, &a) in path.iter().enumerate() {
            let b = path[(i + 1) % path.len()];
            let ((xa, ya), (xb, yb)) = (center(a), center(b));
            if (ya > py) != (yb > py) {
                crossings.push((xb - xa) * (py - ya) / (yb - ya) + xa);
            }
        }
        crossings.sort_by(f64::total_cmp);
        // A center is inside when an odd number of crossings lie to its right.
        for pair in crossings.chunks_exact(2) {
            let from = (pair[0] - 0.5).ceil().max(f64::from(bounds.start_x));
            let to = (pair[1] - 0.5).ceil().min(f64::from(bounds.end_x) + 1.0);
            // Both ends are clamped into the i32 bounds.
            for x in from as i32..to as i32 {
                cells.insert(GridPoint::new(x, y));
            }
        }
    }
    cells
}

/// Serialize `SelectionContent` as a list of `{x, y, color, layerId}` entries,
/// since JSON object keys must be strings.
pub mod content_entries {
    use super::SelectionContent;
    use crate::color::Color;
    use crate::store::{GridPoint, LayerId, Pixel};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Entry {
        x: i32,
        y: i32,
        color: Color,
        layer_id: LayerId,
    }

    pub fn serialize<S: Serializer>(
        content: &SelectionContent,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(content.iter().map(|(p, px)| Entry {
            x: p.x,
            y: p.y,
            color: px.color,
            layer_id: px.layer_id,
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<SelectionContent, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| (GridPoint::new(e.x, e.y), Pixel::new(e.color, e.layer_id)))
            .collect())
    }
}
