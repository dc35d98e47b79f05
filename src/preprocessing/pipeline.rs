use crate::error::PlateError;
use image::DynamicImage;
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Tunables for the preprocessing pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineOptions {
    /// Upsampling factor applied to both dimensions
    pub scale_factor: f32,
    /// Grayscale level above which a pixel becomes white
    pub threshold: u8,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            scale_factor: 2.0,
            threshold: 150,
        }
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone)]
pub struct PreprocessingResult {
    pub image: DynamicImage,
    pub total_time_ms: u64,
    pub steps: Vec<StepTiming>,
}

/// Preprocessing pipeline: resize, grayscale, threshold
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Process an image into the binarized form handed to the recognizer
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, PlateError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();
        let PipelineOptions {
            scale_factor,
            threshold,
        } = self.options;

        let mut img = image;
        img = self.run_step("resize", img, &mut steps_timing, |img| {
            steps::resize::apply(img, scale_factor)
        })?;
        img = self.run_step("grayscale", img, &mut steps_timing, steps::grayscale::apply)?;
        img = self.run_step("threshold", img, &mut steps_timing, |img| {
            steps::threshold::apply(img, threshold)
        })?;

        let result = PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        };

        tracing::debug!(
            "Preprocessed to {}x{} in {}ms ({:?})",
            result.image.width(),
            result.image.height(),
            result.total_time_ms,
            result.steps
        );

        Ok(result)
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<DynamicImage, PlateError>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage, PlateError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}
