//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use.

use crate::config::Config;
use crate::engine::{BoundingBox, DetectedTextRegion, TextRecognizer};
use crate::error::PlateError;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams, TextItem};
use rten::Model;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Text recognizer wrapping the ocrs library
pub struct OcrsRecognizer {
    engine: Arc<OcrsOcrEngine>,
}

impl OcrsRecognizer {
    /// Load the detection and recognition models, downloading them if needed
    pub fn new(config: &Config) -> Result<Self, PlateError> {
        let detection_model_path =
            ensure_model_downloaded(&config.model_dir, DETECTION_MODEL_URL, "text-detection.rten")?;
        let recognition_model_path = ensure_model_downloaded(
            &config.model_dir,
            RECOGNITION_MODEL_URL,
            "text-recognition.rten",
        )?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            PlateError::Initialization(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            PlateError::Initialization(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| PlateError::Initialization(format!("Failed to create OCR engine: {}", e)))?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self {
            engine: Arc::new(engine),
        })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<DetectedTextRegion>, PlateError> {
        // ImageSource::from_bytes expects RGB8 in HWC layout
        let rgb_img = image.to_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions)
            .map_err(|e| PlateError::Internal(format!("Failed to create image source: {}", e)))?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| PlateError::Internal(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| PlateError::Internal(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| PlateError::Internal(format!("Failed to recognize text: {}", e)))?;

        let regions: Vec<DetectedTextRegion> = line_texts
            .iter()
            .filter_map(|line| line.as_ref())
            .map(|line| {
                let rect = line.bounding_rect();
                let text = line
                    .words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                let confidence = f64::from(line_confidence(&text));

                DetectedTextRegion {
                    bbox: BoundingBox::from_edges(
                        rect.left() as f32,
                        rect.top() as f32,
                        rect.right() as f32,
                        rect.bottom() as f32,
                    ),
                    text,
                    confidence,
                }
            })
            .collect();

        tracing::debug!(
            "ocrs found {} words in {} lines",
            word_rects.len(),
            regions.len()
        );

        Ok(regions)
    }
}

// ============================================================================
// Confidence scoring heuristics
// ============================================================================

/// Score a single recognized line.
///
/// ocrs doesn't report per-line probabilities, so the recognized text is
/// judged on how much it looks like one row of a license plate.
fn line_confidence(text: &str) -> f32 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let char_score = analyze_plate_chars(trimmed);
    let length_score = analyze_line_length(trimmed);
    let repetition_score = detect_repetition(trimmed);

    // Foreign symbols veto the line regardless of shape
    let confidence = char_score * (0.6 * length_score + 0.4 * repetition_score);

    confidence.clamp(0.0, 1.0)
}

/// Share of characters that can appear on a plate.
///
/// Plates carry ASCII letters, digits, hyphens, dots and spaces; anything
/// else is usually noise picked up from the frame or screws.
fn analyze_plate_chars(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let plate_chars = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | ' '))
        .count();
    let ratio = plate_chars as f32 / total as f32;

    // One stray symbol in a short line costs a lot
    ratio * ratio
}

/// Score the number of significant characters in a plate row.
fn analyze_line_length(text: &str) -> f32 {
    let significant = text.chars().filter(|c| !c.is_whitespace()).count();

    match significant {
        0..=1 => 0.2,
        2..=3 => 0.7,
        4..=10 => 1.0,
        11..=14 => 0.6,
        _ => 0.3,
    }
}

/// Detect repeated character runs.
///
/// Patterns like "1111111" or "----" usually come from borders and bolts.
fn detect_repetition(text: &str) -> f32 {
    let mut max_repeat = 1;
    let mut current = 1;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if Some(c) == prev && !c.is_whitespace() {
            current += 1;
            max_repeat = max_repeat.max(current);
        } else {
            current = 1;
        }
        prev = Some(c);
    }

    match max_repeat {
        1..=3 => 1.0,
        4..=5 => 0.6,
        _ => 0.2,
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Ensure model is downloaded and return its path
fn ensure_model_downloaded(cache_dir: &Path, url: &str, filename: &str) -> Result<PathBuf, PlateError> {
    std::fs::create_dir_all(cache_dir).map_err(|e| {
        PlateError::Initialization(format!("Failed to create cache directory: {}", e))
    })?;

    let model_path = cache_dir.join(filename);

    if !model_path.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &model_path)?;
        tracing::info!("Downloaded {} to {:?}", filename, model_path);
    } else {
        tracing::info!("Using cached model from {:?}", model_path);
    }

    Ok(model_path)
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), PlateError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| PlateError::Initialization(format!("Failed to download model: {}", e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        PlateError::Initialization(format!("Failed to read response body: {}", e))
    })?;

    // Interrupted downloads must not look cached on the next start
    let partial_path = path.with_extension("part");
    let mut file = File::create(&partial_path).map_err(|e| {
        PlateError::Initialization(format!("Failed to create model file: {}", e))
    })?;

    file.write_all(&buffer).map_err(|e| {
        PlateError::Initialization(format!("Failed to write model file: {}", e))
    })?;

    std::fs::rename(&partial_path, path)
        .map_err(|e| PlateError::Initialization(format!("Failed to store model file: {}", e)))?;

    Ok(())
}
