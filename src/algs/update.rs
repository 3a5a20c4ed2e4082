//! Intra-partition update: one generation of the rule over every interior cell.
//!
//! `current` is only read and every task owns a disjoint set of rows of
//! `next`, so the loop is an embarrassingly parallel map. Rows of `next` are
//! handed out by rayon's `par_chunks_mut`; the call returns after rayon's join,
//! so no partially written generation is ever observable.

use crate::algs::rule::{count_in_window, next_state};
use crate::grid::local::LocalGrid;
use crate::life_error::LifeError;
use rayon::ThreadPool;
use rayon::prelude::*;

/// Write generation `g + 1` of every interior cell of `current` into `next`.
///
/// Ghost cells of `next` are left untouched.
///
/// # Errors
/// `ShapeMismatch` if the two buffers differ in shape.
pub fn update_interior(current: &LocalGrid, next: &mut LocalGrid) -> Result<(), LifeError> {
    update_interior_observed(current, next, |_, _| {})
}

/// [`update_interior`] on a dedicated pool, or on the global pool when `None`.
pub fn update_interior_in(
    pool: Option<&ThreadPool>,
    current: &LocalGrid,
    next: &mut LocalGrid,
) -> Result<(), LifeError> {
    match pool {
        Some(pool) => pool.install(|| update_interior(current, next)),
        None => update_interior(current, next),
    }
}

/// [`update_interior`], calling `observe(i, j)` once per interior cell written.
pub fn update_interior_observed<F>(
    current: &LocalGrid,
    next: &mut LocalGrid,
    observe: F,
) -> Result<(), LifeError>
where
    F: Fn(usize, usize) + Sync,
{
    if current.local_rows() != next.local_rows() || current.cols() != next.cols() {
        return Err(LifeError::ShapeMismatch {
            expected_rows: current.local_rows(),
            expected_cols: current.cols(),
            rows: next.local_rows(),
            cols: next.cols(),
        });
    }
    let stride = current.stride();
    let rows = current.local_rows();
    let cols = current.cols();
    let src = current.as_slice();

    next.as_mut_slice()[stride..(rows + 1) * stride]
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(k, out)| {
            let i = k + 1;
            let above = &src[(i - 1) * stride..i * stride];
            let here = &src[i * stride..(i + 1) * stride];
            let below = &src[(i + 1) * stride..(i + 2) * stride];
            for j in 1..=cols {
                out[j] = next_state(here[j], count_in_window(above, here, below, j));
                observe(i, j);
            }
        });
    Ok(())
}
