//! Command implementations

mod index;

pub use index::cmd_index;
