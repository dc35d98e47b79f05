use crate::error::PlateError;
use image::DynamicImage;

/// Decode uploaded bytes into an image, sniffing the format from its header
pub fn load_image(bytes: &[u8]) -> Result<DynamicImage, PlateError> {
    if bytes.is_empty() {
        return Err(PlateError::InvalidImage("empty upload".to_string()));
    }

    image::load_from_memory(bytes).map_err(|e| PlateError::InvalidImage(e.to_string()))
}
