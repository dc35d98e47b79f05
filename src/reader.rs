use crate::engine::TextRecognizer;
use crate::error::PlateError;
use crate::loader::load_image;
use crate::plate::{assemble, PlateResult};
use crate::preprocessing::{Pipeline, PipelineOptions};
use std::sync::Arc;
use std::time::Instant;

/// Reads a license plate from an uploaded image.
///
/// Built once at startup around the shared recognizer; each call runs
/// decode, preprocess, recognize and assemble for one upload.
pub struct PlateReader {
    recognizer: Arc<dyn TextRecognizer>,
    pipeline: Pipeline,
}

impl PlateReader {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, options: PipelineOptions) -> Self {
        Self {
            recognizer,
            pipeline: Pipeline::new(options),
        }
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }

    pub fn options(&self) -> PipelineOptions {
        self.pipeline.options()
    }

    pub fn read(&self, bytes: &[u8]) -> Result<PlateResult, PlateError> {
        let start = Instant::now();

        let image = load_image(bytes)?;
        tracing::debug!("Decoded {}x{} image", image.width(), image.height());

        let preprocessed = self.pipeline.process(image)?;
        let regions = self.recognizer.recognize(&preprocessed.image)?;

        for region in &regions {
            tracing::debug!(
                "Detected {:?} (confidence {:.2}, center y {:.1})",
                region.text,
                region.confidence,
                region.bbox.center_y()
            );
        }

        let result = assemble(&regions);

        tracing::info!(
            "Plate {:?} read in {}ms, confidence: {:.2}, fragments: {}/{}",
            result.plate,
            start.elapsed().as_millis(),
            result.confidence,
            result.all.len(),
            regions.len()
        );

        Ok(result)
    }
}
