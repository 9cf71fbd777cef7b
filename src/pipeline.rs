//! Batch processing pipeline
//!
//! Drives a batch of captured angles through segmentation, masking,
//! compositing, grading, and watermarking — strictly in input order, one item
//! at a time, because the segmentation engine is a shared singleton resource.
//! A failed item is passed through with its original image and never aborts
//! the batch.

use crate::background::{composite, CompositeOptions};
use crate::config::EnhanceConfig;
use crate::engine::SegmentationEngine;
use crate::error::Result;
use crate::grade::grade;
use crate::mask::apply_mask;
use crate::progress::{ProcessingStage, ProgressReporter};
use crate::types::{AngleStatus, BatchSummary, CapturedAngle, EnhancedAngle};
use crate::watermark::stamp;
use image::{DynamicImage, RgbaImage};
use instant::Instant;
use log::warn;
use tracing::instrument;

/// Per-batch bookkeeping, owned and mutated only by the pipeline
#[derive(Debug)]
struct ProcessingState {
    statuses: Vec<AngleStatus>,
}

impl ProcessingState {
    fn new(total: usize) -> Self {
        Self {
            statuses: vec![AngleStatus::Pending; total],
        }
    }

    fn completed(&self) -> usize {
        self.statuses.iter().filter(|s| s.is_terminal()).count()
    }
}

/// Orchestrates a batch of captured photos through the enhancement stages
pub struct BatchPipeline<'a> {
    engine: &'a SegmentationEngine,
    config: EnhanceConfig,
}

impl<'a> BatchPipeline<'a> {
    /// Create a pipeline bound to an engine and a validated configuration
    #[must_use]
    pub fn new(engine: &'a SegmentationEngine, config: EnhanceConfig) -> Self {
        Self { engine, config }
    }

    /// Process every angle, in input order, yielding one result per input
    ///
    /// Model initialization happens first (reported through
    /// `on_model_progress`); its errors propagate to the caller since nothing
    /// can proceed without the model. Per-item stage errors do not propagate:
    /// the item is marked `Failed`, its original image is passed through, and
    /// the batch continues. Completion is signalled exactly once.
    ///
    /// # Errors
    /// Only model initialization failures; retry by calling `run` again.
    #[instrument(skip_all, fields(items = angles.len()))]
    pub async fn run(
        &self,
        angles: &[CapturedAngle],
        reporter: &dyn ProgressReporter,
    ) -> Result<(Vec<EnhancedAngle>, BatchSummary)> {
        let started = Instant::now();
        let total = angles.len();
        let mut state = ProcessingState::new(total);
        let mut results = Vec::with_capacity(total);

        self.engine
            .ensure_ready(Some(&|pct: u8| reporter.on_model_progress(pct)))
            .await?;

        for (index, angle) in angles.iter().enumerate() {
            state.statuses[index] = AngleStatus::Processing;

            let status = match self.process_item(index, angle, reporter).await {
                Ok(enhanced) => {
                    results.push(self.finish_item(angle, enhanced, AngleStatus::Done));
                    AngleStatus::Done
                },
                Err(error) => {
                    warn!("angle '{}' failed: {error}", angle.label);
                    reporter.on_item_failed(index, &angle.label, &error.to_string());
                    // Pass the original through so the batch output always has
                    // one entry per input item.
                    results.push(self.finish_item(
                        angle,
                        angle.image.to_rgba8(),
                        AngleStatus::Failed,
                    ));
                    AngleStatus::Failed
                },
            };

            state.statuses[index] = status;
            reporter.on_item_finished(index, status, state.completed(), total);
        }

        let summary = BatchSummary {
            total,
            done: state
                .statuses
                .iter()
                .filter(|&&s| s == AngleStatus::Done)
                .count(),
            failed: state
                .statuses
                .iter()
                .filter(|&&s| s == AngleStatus::Failed)
                .count(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        reporter.on_batch_finished(summary);

        Ok((results, summary))
    }

    /// Run one item through every stage
    async fn process_item(
        &self,
        index: usize,
        angle: &CapturedAngle,
        reporter: &dyn ProgressReporter,
    ) -> Result<RgbaImage> {
        reporter.on_stage(index, ProcessingStage::Segmenting);
        let mask = self
            .engine
            .segment_with_timeout(&angle.image, self.config.inference_timeout)
            .await?;

        reporter.on_stage(index, ProcessingStage::Masking);
        let cutout = apply_mask(&angle.image.to_rgba8(), &mask)?;

        reporter.on_stage(index, ProcessingStage::Compositing);
        let options = CompositeOptions {
            shadow: self.config.shadow,
            ..CompositeOptions::default()
        };
        let composited = composite(&cutout, &self.config.background, &options)?;

        reporter.on_stage(index, ProcessingStage::Grading);
        let graded = grade(&composited, &self.config.adjustment)?;

        reporter.on_stage(index, ProcessingStage::Watermarking);
        Ok(stamp(
            &graded,
            &self.config.watermark_text,
            self.config.watermark_enabled,
        ))
    }

    /// Assemble the result record for one terminal item
    fn finish_item(
        &self,
        angle: &CapturedAngle,
        enhanced: RgbaImage,
        status: AngleStatus,
    ) -> EnhancedAngle {
        EnhancedAngle {
            angle_id: angle.angle_id.clone(),
            label: angle.label.clone(),
            original: angle.image.clone(),
            enhanced: DynamicImage::ImageRgba8(enhanced),
            status,
            captured_at: angle.captured_at,
        }
    }
}
