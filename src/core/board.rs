//! Board module - the game grid with collision and line-clear primitives
//!
//! The board is a width x height grid stored row-major (`row * width + col`).
//! Mutations return a new `Board` value, so the engine always holds exactly
//! one authoritative board and snapshots can hand out owned copies freely.
//!
//! Vertical collision policy is asymmetric: rows below the board always
//! collide, rows above it (y < 0) never do. That overhang is what lets
//! pieces spawn partially off-screen.

use serde::{Deserialize, Serialize};

use crate::types::{Cell, Coord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: u8,
    height: u8,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board. Bad dimensions are a defect, not a
    /// runtime condition: both must be non-zero and fit the `i8`
    /// coordinate range, or `width as i8` would go negative and invert
    /// the collision policy.
    pub fn new(width: u8, height: u8) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be non-zero");
        assert!(
            width <= i8::MAX as u8 && height <= i8::MAX as u8,
            "board dimensions must fit i8 coordinates"
        );
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    fn index(&self, x: i8, y: i8) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the cell at (x, y). Callers keep coordinates in bounds; an
    /// out-of-range access is an invariant violation and panics.
    pub fn get(&self, x: i8, y: i8) -> Cell {
        self.cells[self.index(x, y)]
    }

    /// Copy-with-mutation: returns a new board with (x, y) set to `cell`
    pub fn set(&self, x: i8, y: i8, cell: Cell) -> Board {
        let mut next = self.clone();
        let index = next.index(x, y);
        next.cells[index] = cell;
        next
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.x < self.width as i8
            && coord.y >= 0
            && coord.y < self.height as i8
    }

    /// Collision test for a candidate cell set.
    ///
    /// Horizontal out-of-range and y >= height always collide; y < 0 never
    /// does; in-range cells collide iff already filled.
    pub fn collides(&self, cells: &[Coord]) -> bool {
        cells.iter().any(|&coord| {
            if coord.x < 0 || coord.x >= self.width as i8 {
                return true;
            }
            if coord.y >= self.height as i8 {
                return true;
            }
            if coord.y < 0 {
                return false;
            }
            self.get(coord.x, coord.y).is_some()
        })
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        let start = y * self.width as usize;
        let end = start + self.width as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Remove all full rows, compacting the remainder downward.
    ///
    /// Kept rows preserve their relative order; `cleared` empty rows are
    /// stacked on top. Returns the clear count and the resulting board;
    /// zero clears take a fast path that skips the rebuild.
    pub fn clear_full_rows(&self) -> (usize, Board) {
        let height = self.height as usize;
        let width = self.width as usize;

        if (0..height).all(|y| !self.is_row_full(y)) {
            return (0, self.clone());
        }

        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            if !self.is_row_full(y) {
                let start = y * width;
                cells.extend_from_slice(&self.cells[start..start + width]);
            }
        }

        let cleared = height - cells.len() / width;
        let mut next = Board {
            width: self.width,
            height: self.height,
            cells: vec![None; cleared * width],
        };
        next.cells.extend_from_slice(&cells);
        (cleared, next)
    }

    /// Flat view of the cells, row-major
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Build a board from explicit rows (top to bottom)
    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let height = rows.len() as u8;
        let width = rows.first().map(|row| row.len()).unwrap_or(0) as u8;
        assert!(rows.iter().all(|row| row.len() == width as usize));
        Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        }
    }
}
