//! LocalGrid: one partition's cells plus a one-cell ghost frame.
//!
//! Storage is a flat row-major `Vec<Cell>` of `(local_rows + 2) x (cols + 2)`
//! cells. Row `0` and row `local_rows + 1` are ghost rows filled by the halo
//! exchange; column `0` and column `cols + 1` are ghost columns filled by the
//! periodic column wrap. Interior coordinates are `1..=local_rows` by
//! `1..=cols`.
//!
//! Ghost cells are ordinary storage: reading them is always legal, but their
//! contents only mean something once the exchange for the current generation
//! has completed.

use crate::debug_invariants::{DebugInvariants, check_binary, check_len};
use crate::grid::cell::{ALIVE, Cell, DEAD, is_alive};
use crate::life_error::LifeError;

/// `LocalGrid` maintains:
/// - `cells`, the framed row-major storage,
/// - `local_rows` and `cols`, the interior extent.
///
/// # Invariants
///
/// - `cells.len() == (local_rows + 2) * (cols + 2)`.
/// - Every cell is `ALIVE` or `DEAD`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalGrid {
    local_rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl LocalGrid {
    /// A framed buffer of `local_rows x cols` interior cells, all dead.
    pub fn new(local_rows: usize, cols: usize) -> Self {
        Self {
            local_rows,
            cols,
            cells: vec![DEAD; (local_rows + 2) * (cols + 2)],
        }
    }

    #[inline]
    pub fn local_rows(&self) -> usize {
        self.local_rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Width of a framed row, ghost columns included.
    #[inline]
    pub fn stride(&self) -> usize {
        self.cols + 2
    }

    /// Number of framed rows, ghost rows included.
    #[inline]
    pub fn framed_rows(&self) -> usize {
        self.local_rows + 2
    }

    /// Flat index of framed coordinate `(i, j)`.
    #[inline(always)]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        i * self.stride() + j
    }

    #[inline]
    fn in_frame(&self, i: usize, j: usize) -> bool {
        i < self.framed_rows() && j < self.stride()
    }

    /// Read framed cell `(i, j)`.
    ///
    /// # Panics
    /// Panics if `(i, j)` lies outside the frame; use [`try_get`](Self::try_get)
    /// for a checked read.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> Cell {
        debug_assert!(self.in_frame(i, j), "({i}, {j}) outside frame");
        self.cells[self.idx(i, j)]
    }

    /// Write framed cell `(i, j)`.
    ///
    /// # Panics
    /// Panics if `(i, j)` lies outside the frame.
    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, value: Cell) {
        debug_assert!(self.in_frame(i, j), "({i}, {j}) outside frame");
        let k = self.idx(i, j);
        self.cells[k] = value;
    }

    /// Checked read of framed cell `(i, j)`.
    pub fn try_get(&self, i: usize, j: usize) -> Result<Cell, LifeError> {
        if self.in_frame(i, j) {
            Ok(self.get(i, j))
        } else {
            Err(LifeError::CellOutOfRange { row: i, col: j })
        }
    }

    /// Checked write of framed cell `(i, j)`.
    ///
    /// # Errors
    /// `CellOutOfRange` outside the frame, `InvalidCell` for values other
    /// than `ALIVE`/`DEAD`.
    pub fn try_set(&mut self, i: usize, j: usize, value: Cell) -> Result<(), LifeError> {
        if !self.in_frame(i, j) {
            return Err(LifeError::CellOutOfRange { row: i, col: j });
        }
        if value != ALIVE && value != DEAD {
            return Err(LifeError::InvalidCell(value));
        }
        self.set(i, j, value);
        Ok(())
    }

    /// The `cols` non-ghost-column cells of framed row `i`.
    ///
    /// This is the span the halo exchange sends from and receives into.
    #[inline]
    pub fn row(&self, i: usize) -> &[Cell] {
        let start = self.idx(i, 1);
        &self.cells[start..start + self.cols]
    }

    /// Mutable counterpart of [`row`](Self::row).
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [Cell] {
        let start = self.idx(i, 1);
        let cols = self.cols;
        &mut self.cells[start..start + cols]
    }

    /// Whole framed storage.
    #[inline]
    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }

    /// Whole framed storage, mutable. Callers keep the shape intact.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Interior rows, top to bottom, without ghost columns.
    pub fn interior_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        (1..=self.local_rows).map(move |i| self.row(i))
    }

    /// Interior cells in row-major order (the partition's visible cells).
    pub fn visible_cells(&self) -> Vec<Cell> {
        let mut out = Vec::with_capacity(self.local_rows * self.cols);
        for row in self.interior_rows() {
            out.extend_from_slice(row);
        }
        out
    }

    /// Overwrite the interior from `local_rows * cols` row-major cells.
    ///
    /// # Errors
    /// `ShapeMismatch` if `cells` has the wrong length, `InvalidCell` if a
    /// value is not binary.
    pub fn load_visible(&mut self, cells: &[Cell]) -> Result<(), LifeError> {
        check_len(cells, self.local_rows, self.cols)?;
        check_binary(cells)?;
        if self.cols > 0 {
            for (i, src) in cells.chunks_exact(self.cols).enumerate() {
                self.row_mut(i + 1).copy_from_slice(src);
            }
        }
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Copy the interior of `other`, leaving this buffer's ghost frame as is.
    pub fn copy_interior_from(&mut self, other: &LocalGrid) -> Result<(), LifeError> {
        if other.local_rows != self.local_rows || other.cols != self.cols {
            return Err(LifeError::ShapeMismatch {
                expected_rows: self.local_rows,
                expected_cols: self.cols,
                rows: other.local_rows,
                cols: other.cols,
            });
        }
        for i in 1..=self.local_rows {
            self.row_mut(i).copy_from_slice(other.row(i));
        }
        Ok(())
    }

    /// Number of live interior cells.
    pub fn live_count(&self) -> usize {
        self.interior_rows()
            .map(|r| r.iter().filter(|&&c| is_alive(c)).count())
            .sum()
    }
}

impl DebugInvariants for LocalGrid {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "LocalGrid");
    }

    fn validate_invariants(&self) -> Result<(), LifeError> {
        check_len(&self.cells, self.framed_rows(), self.stride())?;
        check_binary(&self.cells)
    }
}
