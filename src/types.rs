//! Core types shared by the pipeline stages

use crate::error::{Result, StudioError};
use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageBuffer, Luma};

/// Per-pixel foreground confidence map produced by segmentation
///
/// Values are normalized to `[0, 1]` in the same raster order as the source
/// image. Dimensions always equal the source image dimensions.
#[derive(Debug, Clone)]
pub struct SegmentationMask {
    /// Confidence values, one per pixel, row-major
    data: Vec<f32>,
    /// Mask dimensions (width, height)
    dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Create a new mask, clamping every confidence into `[0, 1]`
    ///
    /// # Errors
    /// Returns `InvalidConfig` when `data.len() != width * height`.
    pub fn new(mut data: Vec<f32>, dimensions: (u32, u32)) -> Result<Self> {
        let expected = dimensions.0 as usize * dimensions.1 as usize;
        if data.len() != expected {
            return Err(StudioError::invalid_config(format!(
                "mask has {} values but {}x{} needs {}",
                data.len(),
                dimensions.0,
                dimensions.1,
                expected
            )));
        }
        for v in &mut data {
            *v = v.clamp(0.0, 1.0);
        }
        Ok(Self { data, dimensions })
    }

    /// Mask dimensions (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Raw confidence values, row-major
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Convert the mask to an 8-bit grayscale alpha image
    pub fn to_alpha_image(&self) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (width, height) = self.dimensions;
        let bytes: Vec<u8> = self.data.iter().map(|&v| (v * 255.0).round() as u8).collect();
        ImageBuffer::from_raw(width, height, bytes)
            .ok_or_else(|| StudioError::inference("failed to build alpha image from mask data"))
    }

    /// Compute coverage statistics over the mask
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total = self.data.len() as f32;
        let foreground = self.data.iter().filter(|&&v| v > 0.5).count() as f32;
        MaskStatistics {
            foreground_ratio: if total > 0.0 { foreground / total } else { 0.0 },
            mean_confidence: if total > 0.0 {
                self.data.iter().sum::<f32>() / total
            } else {
                0.0
            },
        }
    }
}

/// Coverage statistics for a segmentation mask
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskStatistics {
    /// Fraction of pixels with confidence above 0.5
    pub foreground_ratio: f32,
    /// Mean confidence over all pixels
    pub mean_confidence: f32,
}

/// A single captured vehicle photograph, created by the capture screen
///
/// Consumed read-only by the pipeline; the pipeline clones what it needs.
#[derive(Debug, Clone)]
pub struct CapturedAngle {
    /// Stable identifier for the angle (e.g. "front-34-left")
    pub angle_id: String,
    /// Human-readable label shown in the UI (e.g. "Front 3/4 Left")
    pub label: String,
    /// Decoded raster frame
    pub image: DynamicImage,
    /// Capture timestamp
    pub captured_at: DateTime<Utc>,
}

impl CapturedAngle {
    /// Create a captured angle stamped with the current time
    #[must_use]
    pub fn new<S: Into<String>>(angle_id: S, label: S, image: DynamicImage) -> Self {
        Self {
            angle_id: angle_id.into(),
            label: label.into(),
            image,
            captured_at: Utc::now(),
        }
    }
}

/// Terminal and in-flight status of a batch item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleStatus {
    /// Not yet started
    Pending,
    /// Currently running through the stages
    Processing,
    /// All stages completed successfully
    Done,
    /// A stage failed; the original image was passed through
    Failed,
}

impl AngleStatus {
    /// Whether this status is terminal
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Result of running one captured angle through the pipeline
///
/// Holds independently owned snapshots of the original and enhanced frames so
/// the review screen can show before/after comparisons.
#[derive(Debug, Clone)]
pub struct EnhancedAngle {
    /// Identifier carried over from the captured angle
    pub angle_id: String,
    /// Label carried over from the captured angle
    pub label: String,
    /// The unmodified captured frame
    pub original: DynamicImage,
    /// The processed frame (equal to `original` when the item failed)
    pub enhanced: DynamicImage,
    /// Terminal status of this item
    pub status: AngleStatus,
    /// Capture timestamp carried over from the captured angle
    pub captured_at: DateTime<Utc>,
}

/// Final counts for a completed batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Total number of input items
    pub total: usize,
    /// Items that reached `Done`
    pub done: usize,
    /// Items that reached `Failed`
    pub failed: usize,
    /// Wall-clock time for the whole batch, milliseconds
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_clamps_out_of_range_confidences() {
        let mask = SegmentationMask::new(vec![-0.5, 0.25, 1.5, 1.0], (2, 2)).unwrap();
        assert_eq!(mask.data(), &[0.0, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn mask_rejects_wrong_length() {
        let result = SegmentationMask::new(vec![0.5; 3], (2, 2));
        assert!(matches!(result, Err(StudioError::InvalidConfig(_))));
    }

    #[test]
    fn mask_alpha_image_rounds_to_bytes() {
        let mask = SegmentationMask::new(vec![0.0, 0.5, 1.0, 0.25], (2, 2)).unwrap();
        let alpha = mask.to_alpha_image().unwrap();
        assert_eq!(alpha.get_pixel(0, 0).0[0], 0);
        assert_eq!(alpha.get_pixel(1, 0).0[0], 128);
        assert_eq!(alpha.get_pixel(0, 1).0[0], 255);
        assert_eq!(alpha.get_pixel(1, 1).0[0], 64);
    }

    #[test]
    fn mask_statistics_counts_foreground() {
        let mask = SegmentationMask::new(vec![0.9, 0.9, 0.1, 0.1], (2, 2)).unwrap();
        let stats = mask.statistics();
        assert!((stats.foreground_ratio - 0.5).abs() < f32::EPSILON);
        assert!((stats.mean_confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn angle_status_terminality() {
        assert!(!AngleStatus::Pending.is_terminal());
        assert!(!AngleStatus::Processing.is_terminal());
        assert!(AngleStatus::Done.is_terminal());
        assert!(AngleStatus::Failed.is_terminal());
    }
}
