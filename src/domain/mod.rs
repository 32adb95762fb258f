//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model inputs (`SubunitDescriptor`, `ModelProfile`) and run configuration (`SimConfig`)
//! - the assembled point cloud with per-subunit diagnostics
//! - stage outputs (`PairDistribution`, `TheoreticalCurve`, `SimulatedData`)

pub mod types;

pub use types::*;
