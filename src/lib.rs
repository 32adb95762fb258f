//! `shape2sas` library crate.
//!
//! The binary (`shape2sas`) is a thin wrapper around this library so that:
//!
//! - the simulation pipeline is testable without spawning processes
//! - shape providers can be registered by other callers
//! - stages (points, p(r), theory, noise) can be run on their own

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod points;
pub mod report;
pub mod scattering;
