//! OCR engine implementations
//!
//! This module contains implementations of the TextRecognizer trait for
//! different OCR backends. Engines are conditionally compiled based on
//! feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

use crate::config::Config;
use crate::engine::TextRecognizer;
use crate::error::PlateError;
use std::sync::Arc;

/// Build the recognizer the server runs with.
///
/// Called once at startup; the returned handle is shared read-only by every
/// request.
#[cfg(feature = "engine-ocrs")]
pub fn create_recognizer(config: &Config) -> Result<Arc<dyn TextRecognizer>, PlateError> {
    tracing::info!("Initializing ocrs engine...");
    let recognizer = self::ocrs::OcrsRecognizer::new(config)?;
    Ok(Arc::new(recognizer))
}

#[cfg(not(feature = "engine-ocrs"))]
pub fn create_recognizer(_config: &Config) -> Result<Arc<dyn TextRecognizer>, PlateError> {
    Err(PlateError::Initialization(
        "No OCR engines available. Build with --features engine-ocrs".to_string(),
    ))
}
