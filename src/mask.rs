//! Mask application: isolating the subject from its background

use crate::error::{Result, StudioError};
use crate::types::SegmentationMask;
use image::RgbaImage;

/// Apply a confidence mask to an image's alpha channel
///
/// For every pixel `i`, output alpha is `round(mask[i] * 255)` and RGB passes
/// through unchanged. Returns a newly allocated buffer so the caller keeps the
/// original decodable image for before/after comparison.
///
/// # Errors
/// Returns `DimensionMismatch` when the mask dimensions differ from the image
/// dimensions; never truncates or pads.
pub fn apply_mask(image: &RgbaImage, mask: &SegmentationMask) -> Result<RgbaImage> {
    let image_dims = image.dimensions();
    let mask_dims = mask.dimensions();
    if image_dims != mask_dims {
        return Err(StudioError::dimension_mismatch(image_dims, mask_dims));
    }

    let mut out = image.clone();
    for (pixel, &confidence) in out.pixels_mut().zip(mask.data()) {
        pixel[3] = (confidence * 255.0).round() as u8;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn alpha_comes_from_mask_and_rgb_passes_through() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let mask = SegmentationMask::new(vec![0.0, 0.25, 0.5, 1.0], (2, 2)).unwrap();

        let out = apply_mask(&image, &mask).unwrap();

        let expected_alpha = [0u8, 64, 128, 255];
        for (i, pixel) in out.pixels().enumerate() {
            assert_eq!(&pixel.0[..3], &[10, 20, 30]);
            assert_eq!(pixel.0[3], expected_alpha[i]);
        }
    }

    #[test]
    fn mismatched_dimensions_fail() {
        let image = RgbaImage::new(4, 4);
        let mask = SegmentationMask::new(vec![1.0; 4], (2, 2)).unwrap();

        let err = apply_mask(&image, &mask).unwrap_err();
        assert!(matches!(err, StudioError::DimensionMismatch { .. }));
    }

    #[test]
    fn input_image_is_not_mutated() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([1, 2, 3, 255]));
        let mask = SegmentationMask::new(vec![0.0, 0.0], (2, 1)).unwrap();

        let _ = apply_mask(&image, &mask).unwrap();
        assert_eq!(image.get_pixel(0, 0).0[3], 255);
    }
}
