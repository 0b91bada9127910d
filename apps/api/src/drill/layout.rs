//! Layout Engine: maps abstract grid cells to page coordinates.
//!
//! All coordinates are in PostScript points with a top-left origin (y grows
//! downward), matching how the worksheet is composed. The PDF backend flips
//! the y axis when encoding.
//!
//! # Grid rules
//! - `column_width = content_width / columns`
//! - `row_height = (content_height - header_height) / rows`
//! - No rounding. Cell positions keep full `f32` precision.

use serde::{Deserialize, Serialize};

use crate::errors::DrillError;

/// Horizontal reduction applied to every cell before drawing inside it.
/// The inner box is `CELL_INSET` narrower and shifted by half of it.
pub const CELL_INSET: f32 = 10.0;

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// Physical page size and margins for a worksheet page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_left: f32,
    pub margin_bottom: f32,
    pub margin_right: f32,
}

impl PageGeometry {
    /// A4 portrait (595.28 × 841.89 pt) with the worksheet margins.
    pub fn a4() -> Self {
        PageGeometry {
            width: 595.28,
            height: 841.89,
            margin_top: 50.0,
            margin_left: 65.0,
            margin_bottom: 50.0,
            margin_right: 65.0,
        }
    }

    pub fn origin_x(&self) -> f32 {
        self.margin_left
    }

    pub fn origin_y(&self) -> f32 {
        self.margin_top
    }

    /// Page width minus left and right margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Page height minus top and bottom margins.
    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Y coordinate of the bottom edge of the content area.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin_bottom
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Grid
// ────────────────────────────────────────────────────────────────────────────

/// Immutable grid geometry for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: u32,
    pub columns: u32,
    pub content_width: f32,
    pub content_height: f32,
    pub header_height: f32,
    pub column_width: f32,
    pub row_height: f32,
}

impl GridConfig {
    /// Number of cells in the grid.
    pub fn capacity(&self) -> u32 {
        self.rows * self.columns
    }

    /// Iterates `(row, column)` pairs in reading order: left to right, top to bottom.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| (row, column)))
    }
}

/// A single cell's rectangle on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellGeometry {
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: f32,
    pub height: f32,
}

impl CellGeometry {
    /// The drawable box inside the cell: `CELL_INSET` narrower, centred horizontally.
    pub fn inset(&self) -> CellGeometry {
        let inner_width = self.width - CELL_INSET;
        let shift = (self.width - inner_width) / 2.0;
        CellGeometry {
            origin_x: self.origin_x + shift,
            origin_y: self.origin_y,
            width: inner_width,
            height: self.height,
        }
    }
}

/// Computes the grid for a content area, reserving `header_height` at the top.
pub fn compute_grid(
    content_width: f32,
    content_height: f32,
    header_height: f32,
    rows: u32,
    columns: u32,
) -> Result<GridConfig, DrillError> {
    if rows == 0 || columns == 0 {
        return Err(DrillError::InvalidConfig(format!(
            "grid must have at least one row and one column (got {rows}x{columns})"
        )));
    }
    if !(content_width.is_finite() && content_height.is_finite() && header_height.is_finite()) {
        return Err(DrillError::InvalidConfig(
            "content dimensions must be finite".to_string(),
        ));
    }
    if content_width <= 0.0 {
        return Err(DrillError::InvalidConfig(format!(
            "content width must be positive (got {content_width})"
        )));
    }
    if header_height < 0.0 {
        return Err(DrillError::InvalidConfig(format!(
            "header height must not be negative (got {header_height})"
        )));
    }
    if content_height <= header_height {
        return Err(DrillError::InvalidConfig(format!(
            "header band ({header_height}) leaves no room in content height {content_height}"
        )));
    }

    Ok(GridConfig {
        rows,
        columns,
        content_width,
        content_height,
        header_height,
        column_width: content_width / columns as f32,
        row_height: (content_height - header_height) / rows as f32,
    })
}

/// Returns the rectangle of cell `(row_index, column_index)` for a grid whose
/// top-left corner is at `(origin_x, origin_y)`.
pub fn cell_origin(
    config: &GridConfig,
    origin_x: f32,
    origin_y: f32,
    row_index: u32,
    column_index: u32,
) -> Result<CellGeometry, DrillError> {
    if row_index >= config.rows || column_index >= config.columns {
        return Err(DrillError::IndexOutOfBounds {
            row: row_index,
            column: column_index,
            rows: config.rows,
            columns: config.columns,
        });
    }

    Ok(CellGeometry {
        origin_x: origin_x + column_index as f32 * config.column_width,
        origin_y: origin_y + row_index as f32 * config.row_height,
        width: config.column_width,
        height: config.row_height,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
