//! Reporting utilities: run summaries and shape listings.

pub mod format;

pub use format::*;
