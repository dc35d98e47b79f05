//! Image preprocessing ahead of OCR
//!
//! Upsamples the upload and binarizes it so plate characters stand out
//! against the plate background.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, PipelineOptions};
