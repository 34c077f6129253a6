//! Error types

mod fetch;
mod grid;

pub use fetch::*;
pub use grid::*;
