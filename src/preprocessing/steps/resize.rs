use crate::error::PlateError;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Maximum output dimension to avoid memory issues
const MAX_DIMENSION: u32 = 8000;

/// Upsample image by a fixed factor with bicubic interpolation
/// Small plate characters get more pixels for the recognizer to work with
pub fn apply(image: DynamicImage, scale_factor: f32) -> Result<DynamicImage, PlateError> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(PlateError::Internal(format!(
            "Invalid scale factor: {}",
            scale_factor
        )));
    }

    let (width, height) = image.dimensions();
    let (new_width, new_height) = target_dimensions(width, height, scale_factor);

    if (new_width, new_height) == (width, height) {
        return Ok(image);
    }

    Ok(image.resize_exact(new_width, new_height, FilterType::CatmullRom))
}

fn target_dimensions(width: u32, height: u32, scale_factor: f32) -> (u32, u32) {
    let new_width = (width as f32 * scale_factor).round().max(1.0) as u64;
    let new_height = (height as f32 * scale_factor).round().max(1.0) as u64;

    // Clamp to max dimension, keeping the aspect ratio
    let max_dim = new_width.max(new_height);
    if max_dim > MAX_DIMENSION as u64 {
        let clamp = |dim: u64| (dim * MAX_DIMENSION as u64 / max_dim).max(1) as u32;
        return (clamp(new_width), clamp(new_height));
    }

    (new_width as u32, new_height as u32)
}
