//! Grid geometry shared by the recycler and static layouts.
//!
//! ## Usage
//!
//! Describe the arrangement with a [`GridSpec`], then call
//! [`GridSpec::measure`] whenever the item count, the parent size or the spec
//! itself changes. The resulting [`GridLayout`] answers row/column counts and
//! the frame of every index. Layouts are always recomputed from scratch.
use derive_setters::Setters;
use glam::Vec2;

use crate::node::{CellFrame, SceneNode};

/// Policy used to derive the row and column counts from the item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridSizing {
    /// Roughly square: `ceil(sqrt(n))` columns and enough rows to hold `n`.
    Uniform,
    /// A fixed number of rows; columns grow with the item count.
    FixedRows(usize),
    /// A fixed number of columns; rows grow with the item count.
    FixedColumns(usize),
}

/// Axis filled first when walking indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StartAxis {
    /// Row-major: consecutive indices move along a row.
    #[default]
    Horizontal,
    /// Column-major: consecutive indices move down a column.
    Vertical,
}

/// Corner of the container where index 0 is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Corner {
    /// Indices grow left-to-right and top-to-bottom.
    #[default]
    UpperLeft,
    /// Indices grow right-to-left and top-to-bottom.
    UpperRight,
    /// Indices grow left-to-right and bottom-to-top.
    LowerLeft,
    /// Indices grow right-to-left and bottom-to-top.
    LowerRight,
}

impl Corner {
    fn is_right(self) -> bool {
        matches!(self, Self::UpperRight | Self::LowerRight)
    }

    fn is_lower(self) -> bool {
        matches!(self, Self::LowerLeft | Self::LowerRight)
    }
}

/// Padding between the container edges and the cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Padding {
    /// Left edge.
    pub left: f32,
    /// Right edge.
    pub right: f32,
    /// Top edge.
    pub top: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Padding {
    /// No padding.
    pub const ZERO: Self = Self {
        left: 0.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
    };

    /// The same padding on every edge.
    pub const fn all(value: f32) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }

    /// Sum of the left and right padding.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Sum of the top and bottom padding.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    fn sanitized(self) -> Self {
        Self {
            left: self.left.max(0.0),
            right: self.right.max(0.0),
            top: self.top.max(0.0),
            bottom: self.bottom.max(0.0),
        }
    }
}

/// Declarative description of a grid.
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridSpec {
    /// How rows and columns are derived from the item count.
    pub sizing: GridSizing,
    /// Cell size used on axes that do not fill the parent.
    pub cell_size: Vec2,
    /// Gap between adjacent cells.
    pub spacing: Vec2,
    /// Inset between the container edges and the cells.
    pub padding: Padding,
    /// Stretch cells so the columns exactly fill the parent width.
    pub fill_width: bool,
    /// Stretch cells so the rows exactly fill the parent height.
    pub fill_height: bool,
    /// Axis walked first when mapping indices to cells.
    pub start_axis: StartAxis,
    /// Corner holding index 0.
    pub start_corner: Corner,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            sizing: GridSizing::FixedColumns(1),
            cell_size: Vec2::splat(100.0),
            spacing: Vec2::ZERO,
            padding: Padding::ZERO,
            fill_width: false,
            fill_height: false,
            start_axis: StartAxis::Horizontal,
            start_corner: Corner::UpperLeft,
        }
    }
}

impl GridSpec {
    /// Computes the layout of `item_count` items inside a parent of
    /// `parent_size`.
    pub fn measure(&self, item_count: usize, parent_size: Vec2) -> GridLayout {
        let (rows, columns) = grid_dimensions(self.sizing, item_count);
        let spacing = self.spacing.max(Vec2::ZERO);
        let padding = self.padding.sanitized();
        let parent_size = parent_size.max(Vec2::ZERO);
        let mut cell_size = self.cell_size.max(Vec2::ZERO);

        if self.fill_width {
            cell_size.x = fill_extent(parent_size.x, columns, spacing.x, padding.horizontal());
        }
        if self.fill_height {
            cell_size.y = fill_extent(parent_size.y, rows, spacing.y, padding.vertical());
        }

        let content_size = Vec2::new(
            padding.horizontal() + track_length(columns, cell_size.x, spacing.x),
            padding.vertical() + track_length(rows, cell_size.y, spacing.y),
        );

        GridLayout {
            item_count,
            rows,
            columns,
            cell_size,
            spacing,
            padding,
            start_axis: self.start_axis,
            start_corner: self.start_corner,
            content_size,
            container_size: content_size.max(parent_size),
        }
    }
}

/// Row and column counts for `item_count` items under `sizing`.
///
/// Both counts are at least 1, and `rows * columns >= item_count`.
pub fn grid_dimensions(sizing: GridSizing, item_count: usize) -> (usize, usize) {
    match sizing {
        GridSizing::Uniform => {
            let root = (item_count as f64).sqrt();
            let columns = (root.ceil() as usize).max(1);
            let mut rows = (root.round() as usize).max(1);
            // Independent rounding of the same root can come up one row short.
            while rows * columns < item_count {
                rows += 1;
            }
            (rows, columns)
        }
        GridSizing::FixedColumns(columns) => {
            let columns = columns.max(1);
            (item_count.div_ceil(columns).max(1), columns)
        }
        GridSizing::FixedRows(rows) => {
            let rows = rows.max(1);
            (rows, item_count.div_ceil(rows).max(1))
        }
    }
}

fn fill_extent(parent: f32, count: usize, spacing: f32, padding: f32) -> f32 {
    let count = count.max(1);
    let gaps = spacing * count.saturating_sub(1) as f32;
    ((parent - gaps - padding) / count as f32).max(0.0)
}

fn track_length(count: usize, cell: f32, spacing: f32) -> f32 {
    cell * count as f32 + spacing * count.saturating_sub(1) as f32
}

/// Result of measuring a [`GridSpec`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    item_count: usize,
    rows: usize,
    columns: usize,
    cell_size: Vec2,
    spacing: Vec2,
    padding: Padding,
    start_axis: StartAxis,
    start_corner: Corner,
    content_size: Vec2,
    container_size: Vec2,
}

impl GridLayout {
    /// Number of items the layout was measured for.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Number of rows, never zero.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns, never zero.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Resolved cell size after fill.
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Padding the layout was measured with.
    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Cell height plus vertical spacing.
    pub fn row_height(&self) -> f32 {
        self.cell_size.y + self.spacing.y
    }

    /// Cell width plus horizontal spacing.
    pub fn column_width(&self) -> f32 {
        self.cell_size.x + self.spacing.x
    }

    /// Size needed to show every cell, including padding.
    pub fn content_size(&self) -> Vec2 {
        self.content_size
    }

    /// Size of the area cells are aligned in: the content size grown to the
    /// parent size.
    pub fn container_size(&self) -> Vec2 {
        self.container_size
    }

    /// How far the content can scroll vertically inside a viewport of
    /// `viewport_height`. Never negative.
    pub fn max_scroll_extent(&self, viewport_height: f32) -> f32 {
        (self.content_size.y - viewport_height).max(0.0)
    }

    /// Row and column of `index`.
    pub fn cell_coords(&self, index: usize) -> (usize, usize) {
        match self.start_axis {
            StartAxis::Horizontal => (index / self.columns, index % self.columns),
            StartAxis::Vertical => (index % self.rows, index / self.rows),
        }
    }

    /// Frame of `index` in container space.
    pub fn cell_frame(&self, index: usize) -> CellFrame {
        let (row, column) = self.cell_coords(index);
        let step_x = column as f32 * self.column_width();
        let step_y = row as f32 * self.row_height();

        let x = if self.start_corner.is_right() {
            self.container_size.x - self.padding.right - self.cell_size.x - step_x
        } else {
            self.padding.left + step_x
        };
        let y = if self.start_corner.is_lower() {
            self.container_size.y - self.padding.bottom - self.cell_size.y - step_y
        } else {
            self.padding.top + step_y
        };

        CellFrame::new(Vec2::new(x, y), self.cell_size)
    }

    /// Frames of every measured index, in index order.
    pub fn frames(&self) -> impl Iterator<Item = CellFrame> + '_ {
        (0..self.item_count).map(|index| self.cell_frame(index))
    }
}

/// Lays out a small, fixed set of nodes without virtualization.
///
/// Every node receives the frame of its position in the slice.
pub fn arrange<V: SceneNode>(spec: &GridSpec, parent_size: Vec2, nodes: &mut [V]) -> GridLayout {
    let layout = spec.measure(nodes.len(), parent_size);
    for (node, frame) in nodes.iter_mut().zip(layout.frames()) {
        node.set_frame(frame);
    }
    layout
}
