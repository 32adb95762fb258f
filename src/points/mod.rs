//! Point generation for single subunits and assembly of composite models.

pub mod assembler;
pub mod generator;

pub use assembler::*;
pub use generator::*;
