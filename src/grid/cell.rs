//! Cell values.
//!
//! Cells are single bytes so that a row of cells is already a message
//! payload; no per-cell encoding happens on the wire.

/// State of one cell.
pub type Cell = u8;

/// A live cell.
pub const ALIVE: Cell = 1;
/// A dead cell.
pub const DEAD: Cell = 0;

/// Map a boolean onto a cell value.
#[inline]
pub fn from_bool(alive: bool) -> Cell {
    if alive { ALIVE } else { DEAD }
}

/// True iff `cell` is alive.
#[inline]
pub fn is_alive(cell: Cell) -> bool {
    cell == ALIVE
}
