//! GlobalGrid: the collected, unpartitioned view of every partition's cells.
//!
//! Cells are row-major: partitions in rank order, then interior row, then
//! column. A `GlobalGrid` is what a renderer or exporter consumes, and it is
//! also the explicit initial state used to seed partitions identically for any
//! worker count.

use crate::debug_invariants::{DebugInvariants, check_binary, check_len};
use crate::grid::cell::{ALIVE, Cell, DEAD, is_alive};
use crate::life_error::LifeError;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl GlobalGrid {
    /// An all-dead `rows x cols` grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![DEAD; rows * cols],
        }
    }

    /// Wrap row-major `cells`.
    ///
    /// # Errors
    /// `ShapeMismatch` if `cells.len() != rows * cols`; `InvalidCell` if a
    /// value is not binary.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self, LifeError> {
        check_len(&cells, rows, cols)?;
        check_binary(&cells)?;
        Ok(Self { rows, cols, cells })
    }

    /// A grid with exactly the listed `(row, col)` cells alive.
    ///
    /// # Errors
    /// `CellOutOfRange` for a coordinate outside the grid.
    pub fn with_live_cells<I>(rows: usize, cols: usize, live: I) -> Result<Self, LifeError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut g = Self::new(rows, cols);
        for (r, c) in live {
            g.try_set(r, c, ALIVE)?;
        }
        Ok(g)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    pub fn try_set(&mut self, row: usize, col: usize, value: Cell) -> Result<(), LifeError> {
        if row >= self.rows || col >= self.cols {
            return Err(LifeError::CellOutOfRange { row, col });
        }
        if value != ALIVE && value != DEAD {
            return Err(LifeError::InvalidCell(value));
        }
        self.cells[row * self.cols + col] = value;
        Ok(())
    }

    /// Row-major cells of rows `first..first + count`.
    pub fn row_band(&self, first: usize, count: usize) -> &[Cell] {
        &self.cells[first * self.cols..(first + count) * self.cols]
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| is_alive(c)).count()
    }

    /// Coordinates of live cells in row-major order.
    pub fn live_cells(&self) -> Vec<(usize, usize)> {
        iproduct!(0..self.rows, 0..self.cols)
            .filter(|&(r, c)| is_alive(self.get(r, c)))
            .collect()
    }

    /// This grid shifted by `(dr, dc)` on the torus.
    pub fn translated(&self, dr: isize, dc: isize) -> Self {
        let mut out = Self::new(self.rows, self.cols);
        for (r, c) in self.live_cells() {
            let nr = (r as isize + dr).rem_euclid(self.rows as isize) as usize;
            let nc = (c as isize + dc).rem_euclid(self.cols as isize) as usize;
            out.cells[nr * self.cols + nc] = ALIVE;
        }
        out
    }
}

impl DebugInvariants for GlobalGrid {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "GlobalGrid");
    }

    fn validate_invariants(&self) -> Result<(), LifeError> {
        check_len(&self.cells, self.rows, self.cols)?;
        check_binary(&self.cells)
    }
}
