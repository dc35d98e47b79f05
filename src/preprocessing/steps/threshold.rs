use crate::error::PlateError;
use image::DynamicImage;
use imageproc::contrast::{threshold, ThresholdType};

/// Fixed-level binarization
/// Pixels brighter than `level` become white (255), everything else black (0)
pub fn apply(image: DynamicImage, level: u8) -> Result<DynamicImage, PlateError> {
    let gray = image.into_luma8();
    let binarized = threshold(&gray, level, ThresholdType::Binary);
    Ok(DynamicImage::ImageLuma8(binarized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_threshold_binarizes_image() {
        let img = GrayImage::from_fn(51, 1, |x, _| Luma([(x * 5) as u8]));

        let result = apply(DynamicImage::ImageLuma8(img), 150).unwrap();
        let result_gray = result.to_luma8();

        for pixel in result_gray.pixels() {
            assert!(
                pixel.0[0] == 0 || pixel.0[0] == 255,
                "Expected binary pixel, got {}",
                pixel.0[0]
            );
        }
    }

    #[test]
    fn test_threshold_level_is_exclusive() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([149 + x as u8]));

        let result = apply(DynamicImage::ImageLuma8(img), 150).unwrap();
        let result_gray = result.to_luma8();

        assert_eq!(result_gray.get_pixel(0, 0).0[0], 0);
        assert_eq!(result_gray.get_pixel(1, 0).0[0], 0);
        assert_eq!(result_gray.get_pixel(2, 0).0[0], 255);
    }
}
