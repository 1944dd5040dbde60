// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core grid types shared by every detection stage: the edge map and gradient
// field inputs, the stroke-width output, and the pixel/box primitives.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrichwerkError};

/// A pixel coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two pixel coordinates.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = other.x as f32 - self.x as f32;
        let dy = other.y as f32 - self.y as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Inclusive axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    /// A box covering exactly one pixel.
    pub fn from_point(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    /// Grow the box so it contains `p`.
    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Length of the box diagonal, in pixels.
    pub fn diagonal(&self) -> f32 {
        let w = self.width() as f32;
        let h = self.height() as f32;
        (w * w + h * h).sqrt()
    }

    /// Geometric centre of the box.
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) as f32 / 2.0,
            (self.min_y + self.max_y) as f32 / 2.0,
        )
    }

    /// Whether the (fractional) point lies inside the box, edges included.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x as f32 && x <= self.max_x as f32 && y >= self.min_y as f32 && y <= self.max_y as f32
    }
}

/// A row-major `width x height` buffer with one cell per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Wrap an existing buffer. Fails if `data.len() != width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(StrichwerkError::SizeMismatch {
                expected: usize::MAX,
                actual: data.len(),
            })?;
        if data.len() != expected {
            return Err(StrichwerkError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Strict in-bounds test for signed coordinates: `0 <= x < width` and
    /// `0 <= y < height`.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Flat index of `(x, y)`. Callers must have checked bounds.
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Coordinate of a flat index.
    #[inline]
    pub fn point_of(&self, index: usize) -> Point {
        let w = self.width as usize;
        Point::new((index % w) as u32, (index / w) as u32)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(self.index_of(x, y))
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index_of(x, y);
        self.data.get_mut(idx)
    }
}

impl<T: Clone> Grid<T> {
    pub fn new_fill(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }
}

/// Per-pixel edge strength; zero means "not an edge".
pub type EdgeMap = Grid<u8>;

impl EdgeMap {
    /// Whether `(x, y)` is inside the grid and flagged as an edge.
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_some_and(|&v| v > 0)
    }

    /// Number of edge pixels.
    pub fn edge_count(&self) -> usize {
        self.data.iter().filter(|&&v| v > 0).count()
    }
}

/// Directional derivatives of the source image, one `(dx, dy)` pair per
/// pixel. The vectors point along the intensity slope (dark to bright).
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    dx: Grid<f32>,
    dy: Grid<f32>,
}

impl GradientField {
    /// Pair the two derivative grids. They must share dimensions.
    pub fn new(dx: Grid<f32>, dy: Grid<f32>) -> Result<Self> {
        if dx.dimensions() != dy.dimensions() {
            return Err(StrichwerkError::DimensionMismatch {
                left: "dx grid",
                left_width: dx.width(),
                left_height: dx.height(),
                right: "dy grid",
                right_width: dy.width(),
                right_height: dy.height(),
            });
        }
        Ok(Self { dx, dy })
    }

    pub fn width(&self) -> u32 {
        self.dx.width()
    }

    pub fn height(&self) -> u32 {
        self.dx.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dx.dimensions()
    }

    /// Raw `(dx, dy)` at a pixel, or `None` outside the grid.
    pub fn at(&self, x: u32, y: u32) -> Option<(f32, f32)> {
        Some((*self.dx.get(x, y)?, *self.dy.get(x, y)?))
    }

    pub fn dx(&self) -> &Grid<f32> {
        &self.dx
    }

    pub fn dy(&self) -> &Grid<f32> {
        &self.dy
    }
}

/// Per-pixel stroke width estimate, clamped to a byte.
///
/// Zero is the "unset" sentinel. Writes only ever lower a defined value
/// ([`StrokeWidthMap::lower`]), so the final value of a pixel is the
/// minimum over everything written to it, whatever the write order.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeWidthMap {
    grid: Grid<u8>,
}

impl StrokeWidthMap {
    pub const UNSET: u8 = 0;

    /// A map of the given size with every pixel unset.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::new_fill(width, height, Self::UNSET),
        }
    }

    /// Convert a stroke length in pixels to its stored byte value:
    /// `ceil(length)` clamped to `1..=255`.
    pub fn quantize(length: f32) -> u8 {
        if !length.is_finite() {
            return u8::MAX;
        }
        length.ceil().clamp(1.0, u8::MAX as f32) as u8
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    /// Defined stroke width at `(x, y)`; `None` when unset or out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        match self.grid.get(x, y) {
            Some(&w) if w != Self::UNSET => Some(w),
            _ => None,
        }
    }

    /// Defined stroke width at a flat index.
    pub fn get_index(&self, index: usize) -> Option<u8> {
        match self.grid.data().get(index) {
            Some(&w) if w != Self::UNSET => Some(w),
            _ => None,
        }
    }

    /// Set `(x, y)` to `min(current, width)`, treating unset as infinity.
    /// Returns `true` if the stored value changed. A zero `width` or an
    /// out-of-bounds coordinate is ignored.
    pub fn lower(&mut self, x: u32, y: u32, width: u8) -> bool {
        if width == Self::UNSET {
            return false;
        }
        match self.grid.get_mut(x, y) {
            Some(cell) if *cell == Self::UNSET || width < *cell => {
                *cell = width;
                true
            }
            _ => false,
        }
    }

    /// Number of pixels with a defined stroke width.
    pub fn defined_count(&self) -> usize {
        self.grid.data().iter().filter(|&&w| w != Self::UNSET).count()
    }

    /// The underlying byte grid (zero = unset).
    pub fn as_grid(&self) -> &Grid<u8> {
        &self.grid
    }
}
