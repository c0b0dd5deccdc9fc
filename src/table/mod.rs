//! Table reconstruction
//!
//! HTML tables with merged cells are rebuilt on a [`Grid`] and rendered as
//! fixed-width grid tables by [`TableBuilder`].

mod engine;
mod grid;

pub use engine::TableBuilder;
pub use grid::{Cell, Grid};
