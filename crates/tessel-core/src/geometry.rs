#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Two coordinate spaces meet here:
//!
//! - **Grid space** ([`GridPosition`], [`GridSize`]): integer column/row
//!   cells, origin at the top-left cell. This is what collision detection,
//!   placement, and keyboard movement operate on.
//! - **Pixel space** ([`PixelRect`], [`Offset`]): floating point rectangles
//!   as measured by the host. FLIP transitions are computed here.
//!
//! [`CellMetrics`] converts between the two.

use serde::{Deserialize, Serialize};

/// Default number of grid columns.
pub const DEFAULT_COLUMNS: u16 = 12;

/// Default bound on rows searched by placement scans.
pub const DEFAULT_MAX_ROWS: u16 = 100;

/// An item's rectangle in grid cells.
///
/// Uses half-open extents: an item at `x = 2, width = 3` occupies columns
/// 2, 3 and 4. Two positions that merely share an edge do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    /// Left column (inclusive).
    pub x: u16,
    /// Top row (inclusive).
    pub y: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl GridPosition {
    /// Create a new grid position.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Place a size at the given top-left cell.
    #[inline]
    pub const fn at(x: u16, y: u16, size: GridSize) -> Self {
        Self::new(x, y, size.width, size.height)
    }

    /// Right edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.width as u32
    }

    /// Bottom edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.height as u32
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// The width/height pair.
    #[inline]
    pub const fn size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    /// Same size, moved to a new top-left cell.
    #[inline]
    #[must_use]
    pub const fn with_origin(self, x: u16, y: u16) -> Self {
        Self::new(x, y, self.width, self.height)
    }

    /// Same origin, new size.
    #[inline]
    #[must_use]
    pub const fn with_size(self, size: GridSize) -> Self {
        Self::new(self.x, self.y, size.width, size.height)
    }

    /// Check if the cell `(x, y)` lies inside this position.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        (x as u32) >= self.x as u32
            && (x as u32) < self.right()
            && (y as u32) >= self.y as u32
            && (y as u32) < self.bottom()
    }

    /// Check whether the position fits inside `columns` without moving.
    #[inline]
    pub const fn fits_columns(&self, columns: u16) -> bool {
        self.right() <= columns as u32
    }

    /// Iterate over every `(x, y)` cell covered by this position.
    pub fn cells(&self) -> impl Iterator<Item = (u16, u16)> + use<> {
        let Self {
            x,
            y,
            width,
            height,
        } = *self;
        (0..width).flat_map(move |dx| {
            (0..height).map(move |dy| (x.saturating_add(dx), y.saturating_add(dy)))
        })
    }
}

/// A width/height pair in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridSize {
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl GridSize {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Clamp each axis into `[min, max]`.
    ///
    /// `max` wins when the bounds cross.
    #[must_use]
    pub fn clamp(self, min: GridSize, max: GridSize) -> Self {
        Self {
            width: self.width.max(min.width).min(max.width),
            height: self.height.max(min.height).min(max.height),
        }
    }
}

/// A 2D translation in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    /// Zero offset (identity transform).
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Linear interpolation between `self` and `other` at `t`.
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Offset, t: f64) -> Offset {
        Offset {
            dx: self.dx + (other.dx - self.dx) * t,
            dy: self.dy + (other.dy - self.dy) * t,
        }
    }

    /// Check whether both axes are below `epsilon` in magnitude.
    #[inline]
    pub fn is_negligible(&self, epsilon: f64) -> bool {
        self.dx.abs() < epsilon && self.dy.abs() < epsilon
    }
}

/// A measured rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Offset that moves `other`'s top-left corner onto this one.
    #[inline]
    pub fn delta_from(&self, other: &PixelRect) -> Offset {
        Offset::new(self.left - other.left, self.top - other.top)
    }
}

/// Pixel dimensions of one grid cell, used to map between grid and pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    /// Width of a single column in pixels (excluding gap).
    pub column_width: f64,
    /// Height of a single row in pixels (excluding gap).
    pub row_height: f64,
    /// Gap between adjacent cells in pixels.
    pub gap: f64,
    /// Number of columns in the grid.
    pub columns: u16,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            column_width: 80.0,
            row_height: 60.0,
            gap: 16.0,
            columns: DEFAULT_COLUMNS,
        }
    }
}

impl CellMetrics {
    /// Derive metrics from the container's inner width.
    ///
    /// The width is shared evenly across `columns` after subtracting gaps.
    pub fn for_container(container_width: f64, columns: u16, row_height: f64, gap: f64) -> Self {
        let columns = columns.max(1);
        let gaps = gap * f64::from(columns - 1);
        let column_width = ((container_width - gaps) / f64::from(columns)).max(0.0);
        Self {
            column_width,
            row_height,
            gap,
            columns,
        }
    }

    /// Pixel rectangle occupied by a grid position.
    pub fn rect_for(&self, position: &GridPosition) -> PixelRect {
        let stride_x = self.column_width + self.gap;
        let stride_y = self.row_height + self.gap;
        let width = f64::from(position.width);
        let height = f64::from(position.height);
        PixelRect {
            left: f64::from(position.x) * stride_x,
            top: f64::from(position.y) * stride_y,
            width: width * self.column_width + (width - 1.0).max(0.0) * self.gap,
            height: height * self.row_height + (height - 1.0).max(0.0) * self.gap,
        }
    }

    /// Translate a pointer coordinate (relative to the grid origin) into a cell.
    ///
    /// Negative or non-finite coordinates clamp to 0; the column clamps to
    /// `columns - 1`. Rows are unbounded.
    pub fn cell_at(&self, px: f64, py: f64) -> (u16, u16) {
        let stride_x = (self.column_width + self.gap).max(f64::EPSILON);
        let stride_y = (self.row_height + self.gap).max(f64::EPSILON);
        let max_col = self.columns.saturating_sub(1);
        let col = floor_to_cell(px / stride_x).min(max_col);
        let row = floor_to_cell(py / stride_y);
        (col, row)
    }
}

fn floor_to_cell(v: f64) -> u16 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    let floored = v.floor();
    if floored >= f64::from(u16::MAX) {
        u16::MAX
    } else {
        floored as u16
    }
}
