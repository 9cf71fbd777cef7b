//! Progress reporting for batch processing
//!
//! Separates progress concerns from pipeline logic so different frontends can
//! plug in their own handling: a log-based reporter for headless runs, a
//! channel reporter that turns callbacks into an ordered event stream for UIs,
//! or a no-op.

use crate::types::{AngleStatus, BatchSummary};
use std::sync::mpsc;

/// Per-item processing stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Waiting for earlier items to finish
    Pending,
    /// Running model inference for the foreground mask
    Segmenting,
    /// Applying the mask to the alpha channel
    Masking,
    /// Painting the backdrop and compositing the cutout
    Compositing,
    /// Applying color adjustments
    Grading,
    /// Stamping the watermark
    Watermarking,
    /// Item reached a terminal state
    Finished,
}

impl ProcessingStage {
    /// Human-readable description shown alongside the progress bar
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Pending => "Waiting...",
            Self::Segmenting => "Detecting objects...",
            Self::Masking => "Removing background...",
            Self::Compositing => "Applying showroom background...",
            Self::Grading => "Adjusting colors...",
            Self::Watermarking => "Adding watermark...",
            Self::Finished => "Finalizing...",
        }
    }
}

/// Discrete, ordered progress events emitted by a batch run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Model download/load progress during first-time initialization, 0-100
    ModelLoading {
        /// Percent complete
        percent: u8,
    },
    /// An item entered a processing stage
    StageStarted {
        /// Index of the item in the input batch
        item_index: usize,
        /// The stage that started
        stage: ProcessingStage,
    },
    /// An item reached a terminal state
    ItemFinished {
        /// Index of the item in the input batch
        item_index: usize,
        /// Terminal status (`Done` or `Failed`)
        status: AngleStatus,
        /// Items finished so far, including this one
        completed: usize,
        /// Total items in the batch
        total: usize,
    },
    /// An item failed; the batch continues
    ItemFailed {
        /// Index of the item in the input batch
        item_index: usize,
        /// Label of the failed angle
        label: String,
        /// Error description
        error: String,
    },
    /// The whole batch finished; emitted exactly once
    BatchFinished {
        /// Final counts for the run
        summary: BatchSummary,
    },
}

impl ProgressEvent {
    /// Overall batch fraction carried by this event, if any
    #[must_use]
    pub fn overall_fraction(&self) -> Option<f32> {
        match self {
            Self::ItemFinished {
                completed, total, ..
            } => Some(*completed as f32 / (*total).max(1) as f32),
            Self::BatchFinished { .. } => Some(1.0),
            _ => None,
        }
    }
}

/// Trait for observing batch progress
///
/// Default method bodies are empty so reporters implement only what they need.
pub trait ProgressReporter: Send + Sync {
    /// Called with model load progress during first-time initialization
    fn on_model_progress(&self, percent: u8) {
        let _ = percent;
    }

    /// Called when an item enters a stage
    fn on_stage(&self, item_index: usize, stage: ProcessingStage) {
        let _ = (item_index, stage);
    }

    /// Called when an item reaches a terminal state
    fn on_item_finished(&self, item_index: usize, status: AngleStatus, completed: usize, total: usize) {
        let _ = (item_index, status, completed, total);
    }

    /// Called when an item fails; the batch continues afterwards
    fn on_item_failed(&self, item_index: usize, label: &str, error: &str) {
        let _ = (item_index, label, error);
    }

    /// Called exactly once when the batch completes
    fn on_batch_finished(&self, summary: BatchSummary) {
        let _ = summary;
    }
}

/// Reporter that discards all updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {}

/// Reporter that logs progress through the `log` facade
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn on_model_progress(&self, percent: u8) {
        log::info!("loading segmentation model: {percent}%");
    }

    fn on_stage(&self, item_index: usize, stage: ProcessingStage) {
        log::info!("[item {}] {}", item_index + 1, stage.description());
    }

    fn on_item_finished(&self, item_index: usize, status: AngleStatus, completed: usize, total: usize) {
        log::info!(
            "[item {}] {:?} ({completed}/{total})",
            item_index + 1,
            status
        );
    }

    fn on_item_failed(&self, item_index: usize, label: &str, error: &str) {
        log::warn!("[item {}] '{label}' failed: {error}", item_index + 1);
    }

    fn on_batch_finished(&self, summary: BatchSummary) {
        log::info!(
            "batch complete: {}/{} done, {} failed in {}ms",
            summary.done,
            summary.total,
            summary.failed,
            summary.elapsed_ms
        );
    }
}

/// Reporter that forwards every update as a [`ProgressEvent`] on a channel
///
/// The receiving end sees the same strict ordering the pipeline produced.
pub struct ChannelReporter {
    sender: mpsc::Sender<ProgressEvent>,
}

impl ChannelReporter {
    /// Create a reporter and the receiver for its event stream
    #[must_use]
    pub fn new() -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ProgressEvent) {
        // A dropped receiver means the consumer navigated away; that abandons
        // the subscription, not the batch.
        let _ = self.sender.send(event);
    }
}

impl ProgressReporter for ChannelReporter {
    fn on_model_progress(&self, percent: u8) {
        self.send(ProgressEvent::ModelLoading { percent });
    }

    fn on_stage(&self, item_index: usize, stage: ProcessingStage) {
        self.send(ProgressEvent::StageStarted { item_index, stage });
    }

    fn on_item_finished(&self, item_index: usize, status: AngleStatus, completed: usize, total: usize) {
        self.send(ProgressEvent::ItemFinished {
            item_index,
            status,
            completed,
            total,
        });
    }

    fn on_item_failed(&self, item_index: usize, label: &str, error: &str) {
        self.send(ProgressEvent::ItemFailed {
            item_index,
            label: label.to_string(),
            error: error.to_string(),
        });
    }

    fn on_batch_finished(&self, summary: BatchSummary) {
        self.send(ProgressEvent::BatchFinished { summary });
    }
}
