//! Scattering stages, in pipeline order:
//!
//! - `pair_distribution`: point cloud -> p(r), Dmax, Rg
//! - `theory`: p(r) -> P(q), I0, I(q)
//! - `experimental`: I(q) -> simulated I(q) ± σ
//!
//! `qgrid` holds the validated q values shared by the last two stages.

pub mod experimental;
pub mod pair_distribution;
pub mod qgrid;
pub mod theory;

pub use experimental::*;
pub use pair_distribution::*;
pub use qgrid::*;
pub use theory::*;
