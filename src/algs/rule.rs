//! Neighbor counting and the B3/S23 transition rule.

use crate::grid::cell::{ALIVE, Cell, DEAD};
use crate::grid::local::LocalGrid;

/// Live cells among the 8 positions around column `j` of `here`, given the
/// framed rows directly above and below.
///
/// All three slices are full framed rows (ghost columns included), so any
/// `1 <= j <= cols` has all 8 neighbors in range.
#[inline(always)]
pub fn count_in_window(above: &[Cell], here: &[Cell], below: &[Cell], j: usize) -> u8 {
    above[j - 1]
        + above[j]
        + above[j + 1]
        + here[j - 1]
        + here[j + 1]
        + below[j - 1]
        + below[j]
        + below[j + 1]
}

/// Live neighbors of interior cell `(i, j)`, ghost cells included.
#[inline]
pub fn count_neighbors(grid: &LocalGrid, i: usize, j: usize) -> u8 {
    let s = grid.stride();
    let cells = grid.as_slice();
    count_in_window(
        &cells[(i - 1) * s..i * s],
        &cells[i * s..(i + 1) * s],
        &cells[(i + 1) * s..(i + 2) * s],
        j,
    )
}

/// B3/S23: born with exactly 3 neighbors, survives with 2 or 3.
#[inline(always)]
pub fn next_state(current: Cell, neighbors: u8) -> Cell {
    match (current, neighbors) {
        (ALIVE, 2) | (ALIVE, 3) | (DEAD, 3) => ALIVE,
        _ => DEAD,
    }
}
