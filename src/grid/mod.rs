//! Cell storage: framed per-partition buffers, the collected global grid,
//! named patterns and initial-state generation.

pub mod cell;
pub mod global;
pub mod init;
pub mod local;
pub mod pattern;

pub use cell::{ALIVE, Cell, DEAD};
pub use global::GlobalGrid;
pub use init::InitialState;
pub use local::LocalGrid;
pub use pattern::Pattern;
