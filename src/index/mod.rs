//! Index computation.
//!
//! - basket level / rebased historical series (`calc`)
//! - intraday equal-weight percent-vs-open series (`intraday`)

pub mod calc;
pub mod intraday;

pub use calc::*;
pub use intraday::*;
