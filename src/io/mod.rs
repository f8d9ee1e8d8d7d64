//! Artifact input/output.
//!
//! - levels log read/upsert (`levels`)
//! - stats JSON, post text, last-run marker (`snapshot`)
//! - intraday series CSV (`intraday`)

pub mod intraday;
pub mod levels;
pub mod snapshot;

pub use intraday::*;
pub use levels::*;
pub use snapshot::*;
