//! Turning recognized text regions into a license plate reading

pub mod assemble;
pub mod normalize;

pub use assemble::{assemble, PlateResult};
