//! `qbit5-index` library crate.
//!
//! The binary (`qbit5`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the index math is reusable independently of the artifact writers
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod index;
pub mod io;
pub mod plot;
pub mod report;
