//! Mathematical utilities: Euler placements and special functions.

pub mod rotation;
pub mod special;

pub use rotation::*;
pub use special::*;
