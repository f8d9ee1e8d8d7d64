//! Formatting utilities: percentages, the post line, and run summaries.

pub mod format;

pub use format::*;
