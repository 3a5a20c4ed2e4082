//! Invariant checks shared by the grid buffers.
//!
//! Checks run after mutations in debug builds and whenever the
//! `check-invariants` or `strict-invariants` feature is enabled.

use crate::grid::cell::{ALIVE, Cell, DEAD};
use crate::life_error::LifeError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), LifeError>;
}

/// Run a fallible check and panic with context when invariant checking is on.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

/// Every cell must hold exactly `ALIVE` or `DEAD`.
pub(crate) fn check_binary(cells: &[Cell]) -> Result<(), LifeError> {
    match cells.iter().find(|&&c| c != ALIVE && c != DEAD) {
        Some(&bad) => Err(LifeError::InvalidCell(bad)),
        None => Ok(()),
    }
}

/// Storage must be exactly `rows * cols` cells.
pub(crate) fn check_len(cells: &[Cell], rows: usize, cols: usize) -> Result<(), LifeError> {
    if cells.len() == rows * cols {
        Ok(())
    } else {
        Err(LifeError::ShapeMismatch {
            expected_rows: rows,
            expected_cols: cols,
            rows: cells.len() / cols.max(1),
            cols,
        })
    }
}
