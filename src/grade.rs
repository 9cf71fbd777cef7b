//! Per-pixel color grading
//!
//! Applies brightness, contrast, saturation, and warmth in a fixed order.
//! Channel values are clamped to `[0, 255]` once, after all four steps, so
//! intermediate values may leave byte range. Changing the step order or the
//! clamp point changes output numerically.

use crate::error::{Result, StudioError};
use image::{Rgba, RgbaImage};

/// Neutral midpoint of the contrast slider; 100 maps to a contrast factor of 1
const CONTRAST_NEUTRAL: f32 = 100.0;

/// Rec.601 luma weights used for the saturation step
const LUMA_R: f32 = 0.2989;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Cosmetic color adjustments, as exposed by the enhancement sliders
///
/// All fields are neutral at their defaults: `saturation` is a multiplier with
/// 1.0 = unchanged, `brightness` and `warmth` are additive offsets with 0 =
/// unchanged, and `contrast` runs a 0–200 slider with 100 = unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAdjustment {
    /// Saturation multiplier, must be >= 0, 1.0 leaves colors untouched
    pub saturation: f32,
    /// Additive brightness offset applied to R, G, and B
    pub brightness: f32,
    /// Contrast slider value; 100 is neutral, mapped through a nonlinear curve
    pub contrast: f32,
    /// Warmth offset; added to red, subtracted from blue
    pub warmth: f32,
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 0.0,
            contrast: CONTRAST_NEUTRAL,
            warmth: 0.0,
        }
    }
}

impl ColorAdjustment {
    /// Validate slider values at the configuration boundary
    ///
    /// # Errors
    /// Returns `InvalidConfig` for negative saturation or non-finite values.
    pub fn validate(&self) -> Result<()> {
        if !self.saturation.is_finite()
            || !self.brightness.is_finite()
            || !self.contrast.is_finite()
            || !self.warmth.is_finite()
        {
            return Err(StudioError::invalid_config(
                "color adjustment values must be finite",
            ));
        }
        if self.saturation < 0.0 {
            return Err(StudioError::invalid_config(format!(
                "saturation must be >= 0, got {}",
                self.saturation
            )));
        }
        Ok(())
    }

    /// Whether this adjustment leaves every pixel unchanged
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        (self.saturation - 1.0).abs() < f32::EPSILON
            && self.brightness.abs() < f32::EPSILON
            && (self.contrast - CONTRAST_NEUTRAL).abs() < f32::EPSILON
            && self.warmth.abs() < f32::EPSILON
    }

    /// Contrast factor for the slider value
    ///
    /// The slider midpoint (100) is shifted to zero before the standard
    /// 259-curve, so the neutral slider position yields a factor of exactly 1.
    fn contrast_factor(&self) -> f32 {
        let offset = self.contrast - CONTRAST_NEUTRAL;
        (259.0 * (offset + 255.0)) / (255.0 * (259.0 - offset))
    }
}

/// Apply color adjustments to every pixel, returning a new buffer
///
/// Step order per pixel: brightness, contrast, saturation, warmth. The input
/// is never mutated and alpha passes through untouched.
///
/// # Errors
/// Returns `InvalidConfig` when the adjustment fails validation.
pub fn grade(image: &RgbaImage, adjustment: &ColorAdjustment) -> Result<RgbaImage> {
    adjustment.validate()?;

    let factor = adjustment.contrast_factor();
    let (width, height) = image.dimensions();
    let mut out = RgbaImage::new(width, height);

    for (dst, src) in out.pixels_mut().zip(image.pixels()) {
        let Rgba([r0, g0, b0, a]) = *src;
        let mut r = f32::from(r0) + adjustment.brightness;
        let mut g = f32::from(g0) + adjustment.brightness;
        let mut b = f32::from(b0) + adjustment.brightness;

        // Contrast uses the pre-clamped brightness-adjusted values
        r = factor * (r - 128.0) + 128.0;
        g = factor * (g - 128.0) + 128.0;
        b = factor * (b - 128.0) + 128.0;

        let gray = LUMA_R * r + LUMA_G * g + LUMA_B * b;
        r = gray + adjustment.saturation * (r - gray);
        g = gray + adjustment.saturation * (g - gray);
        b = gray + adjustment.saturation * (b - gray);

        r += adjustment.warmth;
        b -= adjustment.warmth;

        *dst = Rgba([
            r.clamp(0.0, 255.0).round() as u8,
            g.clamp(0.0, 255.0).round() as u8,
            b.clamp(0.0, 255.0).round() as u8,
            a,
        ]);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(pixel))
    }

    #[test]
    fn neutral_adjustment_is_identity() {
        let img = uniform(4, 4, [17, 130, 244, 200]);
        let out = grade(&img, &ColorAdjustment::default()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn neutral_contrast_reduces_to_factor_one() {
        let adj = ColorAdjustment::default();
        assert!((adj.contrast_factor() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn brightness_only_path() {
        // (100,100,100,255) with brightness=10 and otherwise neutral sliders
        let img = uniform(2, 2, [100, 100, 100, 255]);
        let adj = ColorAdjustment {
            brightness: 10.0,
            ..ColorAdjustment::default()
        };
        let out = grade(&img, &adj).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [110, 110, 110, 255]);
    }

    #[test]
    fn warmth_shifts_red_and_blue_oppositely() {
        let img = uniform(1, 1, [100, 100, 100, 255]);
        let adj = ColorAdjustment {
            warmth: 20.0,
            ..ColorAdjustment::default()
        };
        let out = grade(&img, &adj).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [120, 100, 80, 255]);
    }

    #[test]
    fn saturation_zero_produces_grayscale() {
        let img = uniform(1, 1, [200, 100, 50, 255]);
        let adj = ColorAdjustment {
            saturation: 0.0,
            ..ColorAdjustment::default()
        };
        let out = grade(&img, &adj).unwrap();
        let [r, g, b, _] = out.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
        // Rec.601 gray of (200,100,50) ~= 124.2
        assert_eq!(r, 124);
    }

    #[test]
    fn channels_clamp_only_at_the_end() {
        // Strong brightness pushes channels past 255 before contrast pulls
        // them back; clamping early would lose that headroom.
        let img = uniform(1, 1, [250, 250, 250, 255]);
        let adj = ColorAdjustment {
            brightness: 50.0,
            contrast: 50.0, // factor < 1 compresses toward 128
            ..ColorAdjustment::default()
        };
        let out = grade(&img, &adj).unwrap();
        // brightness: 300; contrast offset -50 -> factor ~= 0.6738
        // 0.6738 * (300 - 128) + 128 = 243.9 -> 244
        assert_eq!(out.get_pixel(0, 0).0[0], 244);
    }

    #[test]
    fn alpha_is_untouched() {
        let img = uniform(1, 1, [10, 20, 30, 42]);
        let adj = ColorAdjustment {
            brightness: 100.0,
            saturation: 3.0,
            ..ColorAdjustment::default()
        };
        let out = grade(&img, &adj).unwrap();
        assert_eq!(out.get_pixel(0, 0).0[3], 42);
    }

    #[test]
    fn negative_saturation_is_rejected() {
        let img = uniform(1, 1, [0, 0, 0, 255]);
        let adj = ColorAdjustment {
            saturation: -0.1,
            ..ColorAdjustment::default()
        };
        assert!(matches!(
            grade(&img, &adj),
            Err(StudioError::InvalidConfig(_))
        ));
    }

    #[test]
    fn grade_does_not_mutate_input() {
        let img = uniform(2, 2, [5, 5, 5, 255]);
        let before = img.clone();
        let adj = ColorAdjustment {
            brightness: 50.0,
            ..ColorAdjustment::default()
        };
        let _ = grade(&img, &adj).unwrap();
        assert_eq!(img, before);
    }
}
