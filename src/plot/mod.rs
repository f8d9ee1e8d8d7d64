//! PNG chart rendering.

pub mod chart;

pub use chart::*;
