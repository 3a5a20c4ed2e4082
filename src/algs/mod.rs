//! Re-export public algorithms.

pub mod collect;
pub mod communicator;
pub mod halo;
pub mod ring;
pub mod rule;
pub mod update;
pub mod wire;

pub use collect::{all_gather_grid, gather_grid};
pub use halo::{exchange_ghost_rows, exchange_halo, wrap_ghost_columns};
pub use ring::RingTopology;
pub use rule::{count_neighbors, next_state};
pub use update::update_interior;
