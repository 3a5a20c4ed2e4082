//! Named seed patterns placed on the unpartitioned grid.

use crate::life_error::LifeError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Period-4 spaceship moving one cell down-right every 4 generations.
    Glider,
    /// Period-2 oscillator (horizontal phase).
    Blinker,
    /// 2x2 still life.
    Block,
    /// Period-2 oscillator made of two blocks.
    Beacon,
    /// Lightweight spaceship, moving left.
    Lwss,
}

impl Pattern {
    /// Live cells as `(row, col)` offsets from the pattern's top-left corner.
    pub fn cells(self) -> &'static [(usize, usize)] {
        match self {
            Pattern::Glider => &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
            Pattern::Blinker => &[(0, 0), (0, 1), (0, 2)],
            Pattern::Block => &[(0, 0), (0, 1), (1, 0), (1, 1)],
            Pattern::Beacon => &[(0, 0), (0, 1), (1, 0), (2, 3), (3, 2), (3, 3)],
            Pattern::Lwss => &[
                (0, 1),
                (0, 4),
                (1, 0),
                (2, 0),
                (2, 4),
                (3, 0),
                (3, 1),
                (3, 2),
                (3, 3),
            ],
        }
    }

    /// Height and width of the bounding box.
    pub fn extent(self) -> (usize, usize) {
        self.cells()
            .iter()
            .fold((0, 0), |(h, w), &(r, c)| (h.max(r + 1), w.max(c + 1)))
    }

    pub fn population(self) -> usize {
        self.cells().len()
    }

    /// Absolute cells when the top-left corner sits at `(row, col)`.
    ///
    /// Columns wrap modulo `cols`. Rows do not wrap: a cell at or beyond
    /// `rows` is rejected.
    ///
    /// # Errors
    /// `PatternOutOfBounds` for the first cell that runs off the simulated rows.
    pub fn placed(
        self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Vec<(usize, usize)>, LifeError> {
        let cols = cols.max(1);
        self.cells()
            .iter()
            .map(|&(r, c)| match row.checked_add(r) {
                Some(abs) if abs < rows => Ok((abs, (col % cols + c) % cols)),
                _ => Err(LifeError::PatternOutOfBounds {
                    row: row.saturating_add(r),
                    rows,
                }),
            })
            .collect()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "glider" => Some(Pattern::Glider),
            "blinker" => Some(Pattern::Blinker),
            "block" => Some(Pattern::Block),
            "beacon" => Some(Pattern::Beacon),
            "lwss" => Some(Pattern::Lwss),
            _ => None,
        }
    }
}
