//! Input/output helpers.
//!
//! - model JSON and q-value files (`model_file`)
//! - p(r), S(q), I(q) and simulated data dumps (`export`)

pub mod export;
pub mod model_file;

pub use export::*;
pub use model_file::*;
