use crate::error::PlateError;
use image::DynamicImage;

/// Convert image to 8-bit grayscale
pub fn apply(image: DynamicImage) -> Result<DynamicImage, PlateError> {
    Ok(DynamicImage::ImageLuma8(image.into_luma8()))
}
