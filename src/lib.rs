#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

//! # carstudio
//!
//! Client-side pipeline for multi-angle vehicle photography: background
//! segmentation and removal, studio backdrop compositing, per-pixel color
//! grading, watermarking, and export.
//!
//! The crate owns the image-processing stages and the batch state machine that
//! drives a set of captured photos through them with progress reporting and
//! partial-failure recovery. Screens, camera acquisition, and styling belong
//! to the app shell and talk to the core only through data contracts
//! ([`CapturedAngle`] in, [`EnhancedAngle`] and [`CarSession`] out).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use carstudio::{
//!     BackgroundSpec, BatchPipeline, CapturedAngle, ColorAdjustment, EnhanceConfig,
//!     LogProgressReporter, SegmentationEngine,
//! };
//!
//! # async fn example(
//! #     factory: Box<dyn carstudio::SegmentationBackendFactory>,
//! #     angles: Vec<CapturedAngle>,
//! # ) -> anyhow::Result<()> {
//! let engine = SegmentationEngine::new(factory);
//! let config = EnhanceConfig::builder()
//!     .background(BackgroundSpec::from_preset("luxury-showroom")?)
//!     .adjustment(ColorAdjustment::default())
//!     .watermark("AUTO HAUS", true)
//!     .build()?;
//!
//! let pipeline = BatchPipeline::new(&engine, config);
//! let (results, summary) = pipeline.run(&angles, &LogProgressReporter).await?;
//! assert_eq!(results.len(), summary.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure policy
//!
//! A stage failure for one item marks that item `Failed`, passes its original
//! image through, and continues with the next item; the batch output always
//! has one entry per input. Export is the opposite: one bad item aborts the
//! whole archive.
//!
//! ## Backend injection
//!
//! No ML runtime is linked here. The app shell supplies one through
//! [`SegmentationBackendFactory`]; the engine loads it lazily, memoizes it for
//! the process lifetime, and serializes all inference calls through it.

pub mod background;
pub mod backends;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod grade;
pub mod inference;
pub mod mask;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod types;
pub mod watermark;

// Public API exports
pub use background::{composite, parse_hex, BackgroundSpec, CompositeOptions, GradientStop};
pub use config::{EnhanceConfig, EnhanceConfigBuilder, DEFAULT_JPEG_QUALITY};
pub use engine::SegmentationEngine;
pub use error::{Result, StudioError};
pub use export::{
    encode, entry_name, export_all, export_archive, export_one, ExportFormat, ExportItem,
};
pub use grade::{grade, ColorAdjustment};
pub use inference::{LoadProgress, SegmentationBackend, SegmentationBackendFactory};
pub use mask::apply_mask;
pub use pipeline::BatchPipeline;
pub use progress::{
    ChannelReporter, LogProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressEvent,
    ProgressReporter,
};
pub use storage::{
    generate_session_id, CaptureMode, CarSession, JsonSessionStore, SessionImage, SessionStore,
};
pub use types::{
    AngleStatus, BatchSummary, CapturedAngle, EnhancedAngle, MaskStatistics, SegmentationMask,
};

use image::{DynamicImage, RgbaImage};

/// Segment a frame and cut its background away
///
/// Convenience wrapper over [`SegmentationEngine::segment`] and
/// [`apply_mask`]; the engine must already be ready or this fails with
/// `ModelUnavailable`.
pub async fn remove_background(
    engine: &SegmentationEngine,
    image: &DynamicImage,
) -> Result<RgbaImage> {
    let mask = engine.segment(image).await?;
    apply_mask(&image.to_rgba8(), &mask)
}

/// Apply backdrop, color grading, and watermark to an already-cut-out frame
///
/// The model-free half of the pipeline, useful for live preview while sliders
/// move.
pub fn enhance_image(cutout: &RgbaImage, config: &EnhanceConfig) -> Result<RgbaImage> {
    let options = CompositeOptions {
        shadow: config.shadow,
        ..CompositeOptions::default()
    };
    let composited = composite(cutout, &config.background, &options)?;
    let graded = grade(&composited, &config.adjustment)?;
    Ok(watermark::stamp(
        &graded,
        &config.watermark_text,
        config.watermark_enabled,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::mock_factory;
    use image::Rgba;

    #[tokio::test]
    async fn remove_background_produces_cutout_with_input_dimensions() {
        let engine = SegmentationEngine::new(mock_factory());
        engine.ensure_ready(None).await.unwrap();

        let frame = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            16,
            16,
            Rgba([100, 100, 100, 255]),
        ));
        let cutout = remove_background(&engine, &frame).await.unwrap();
        assert_eq!(cutout.dimensions(), (16, 16));
        // Mock mask keeps the center and clears the border
        assert_eq!(cutout.get_pixel(8, 8).0[3], 255);
        assert_eq!(cutout.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn enhance_image_runs_the_model_free_stages() {
        let cutout = RgbaImage::from_pixel(32, 32, Rgba([60, 60, 60, 255]));
        let config = EnhanceConfig::builder()
            .background(BackgroundSpec::from_preset("studio").unwrap())
            .shadow(false)
            .build()
            .unwrap();
        let out = enhance_image(&cutout, &config).unwrap();
        assert_eq!(out.dimensions(), (32, 32));
    }
}
