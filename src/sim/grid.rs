//! Uniform-cell broad phase
//!
//! The grid is thrown away and rebuilt every tick. Shapes can move any
//! distance in a tick, so patching buckets in place is never attempted.
//! A shape overlapping several cells is listed in each of them.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::shape::{Shape, ShapeId};
use crate::renderer::Surface;

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

/// Inclusive cell-index bounding box of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub min_col: i32,
    pub max_col: i32,
    pub min_row: i32,
    pub max_row: i32,
}

impl GridBounds {
    /// Number of cells in the box
    pub fn cell_count(&self) -> usize {
        let cols = (self.max_col - self.min_col + 1).max(0) as usize;
        let rows = (self.max_row - self.min_row + 1).max(0) as usize;
        cols * rows
    }

    /// Cells column by column, rows inner
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        let GridBounds {
            min_col,
            max_col,
            min_row,
            max_row,
        } = self;
        (min_col..=max_col).flat_map(move |col| (min_row..=max_row).map(move |row| Cell { col, row }))
    }
}

/// Order-independent key of a shape pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(pub ShapeId, pub ShapeId);

impl PairKey {
    pub fn new(a: ShapeId, b: ShapeId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

/// Spatial hash of shape indices keyed by cell
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    /// Indices into the shape slice given to the last rebuild
    buckets: IndexMap<Cell, Vec<usize>>,
    /// Pairs already handed out during the current enumeration
    seen: HashSet<PairKey>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            buckets: IndexMap::new(),
            seen: HashSet::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Re-index every shape from scratch
    ///
    /// Each shape's own cell list is cleared and refilled with exactly the
    /// cells it was inserted into.
    pub fn rebuild(&mut self, shapes: &mut [Shape]) {
        self.buckets.clear();

        for (index, shape) in shapes.iter_mut().enumerate() {
            let bounds = shape.grid_bounds(self.cell_size);
            let cells = shape.cells_mut();
            cells.clear();
            for cell in bounds.cells() {
                self.buckets.entry(cell).or_default().push(index);
                cells.push(cell);
            }
        }
    }

    /// Shape indices in a cell; unknown cells are simply empty
    pub fn bucket(&self, cell: Cell) -> &[usize] {
        self.buckets.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Occupied cells and their shape counts, in first-insertion order
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Cell, usize)> + '_ {
        self.buckets.iter().map(|(cell, bucket)| (*cell, bucket.len()))
    }

    /// Number of buckets holding the shape at `index`
    pub fn buckets_containing(&self, index: usize) -> usize {
        self.buckets.values().filter(|b| b.contains(&index)).count()
    }

    /// Every unordered pair sharing at least one cell, each exactly once
    ///
    /// The first element of each pair is the shape whose cells were being
    /// walked when the pair was found, so shapes earlier in the slice tend to
    /// come first.
    pub fn candidate_pairs(&mut self, shapes: &[Shape]) -> Vec<(usize, usize)> {
        let Self { buckets, seen, .. } = self;
        seen.clear();
        let mut pairs = Vec::new();

        for (index, shape) in shapes.iter().enumerate() {
            for cell in shape.cells() {
                let Some(bucket) = buckets.get(cell) else {
                    continue;
                };
                for &other in bucket {
                    if other == index {
                        continue;
                    }
                    let key = PairKey::new(shape.id(), shapes[other].id());
                    if seen.insert(key) {
                        pairs.push((index, other));
                    }
                }
            }
        }

        log::trace!("{} candidate pairs from {} buckets", pairs.len(), buckets.len());
        pairs
    }

    /// Outline each occupied cell with its shape count
    pub fn draw_overlay<S: Surface + ?Sized>(&self, surface: &mut S) {
        for (cell, count) in self.occupied_cells() {
            surface.grid_cell(cell, self.cell_size, count);
        }
    }
}
