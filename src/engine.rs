//! Lazily-initialized segmentation engine
//!
//! Wraps an injected [`SegmentationBackend`] behind a memoized, process-wide
//! initialization: the model loads at most once per process lifetime, a single
//! in-flight load is shared by concurrent callers, and all `segment` calls
//! serialize through one backend instance.

use crate::error::{Result, StudioError};
use crate::inference::{LoadProgress, SegmentationBackend, SegmentationBackendFactory};
use crate::types::SegmentationMask;
use image::{DynamicImage, GenericImageView};
use log::info;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tracing::instrument;

static GLOBAL_ENGINE: OnceLock<SegmentationEngine> = OnceLock::new();

/// Memoized wrapper around a segmentation backend
pub struct SegmentationEngine {
    factory: Box<dyn SegmentationBackendFactory>,
    backend: OnceCell<Mutex<Box<dyn SegmentationBackend>>>,
}

impl SegmentationEngine {
    /// Create an engine that will obtain its backend from `factory` on first use
    #[must_use]
    pub fn new(factory: Box<dyn SegmentationBackendFactory>) -> Self {
        Self {
            factory,
            backend: OnceCell::new(),
        }
    }

    /// Install the process-wide engine instance
    ///
    /// # Errors
    /// Returns `InvalidConfig` when a global engine is already installed.
    pub fn set_global(engine: SegmentationEngine) -> Result<()> {
        GLOBAL_ENGINE
            .set(engine)
            .map_err(|_| StudioError::invalid_config("global segmentation engine already installed"))
    }

    /// Resolve the process-wide engine instance
    ///
    /// # Errors
    /// Returns `ModelUnavailable` when no global engine has been installed.
    pub fn global() -> Result<&'static SegmentationEngine> {
        GLOBAL_ENGINE.get().ok_or_else(|| {
            StudioError::model_unavailable("no global segmentation engine installed")
        })
    }

    /// Whether the model has finished loading
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.backend.initialized()
    }

    /// Load the model if it is not loaded yet
    ///
    /// Idempotent: once ready, returns immediately without re-invoking
    /// `on_progress`. Concurrent callers share a single in-flight load.
    /// Progress values forwarded to `on_progress` are monotonically
    /// non-decreasing even if the backend reports out of order.
    ///
    /// # Errors
    /// Initialization errors propagate to the caller and leave the engine
    /// unloaded; retry by calling again.
    #[instrument(skip_all)]
    pub async fn ensure_ready(&self, on_progress: Option<LoadProgress<'_>>) -> Result<()> {
        self.backend
            .get_or_try_init(|| async {
                let mut backend = self.factory.create_backend()?;
                let high_water = AtomicU8::new(0);
                let monotonic = |pct: u8| {
                    let pct = pct.min(100);
                    let prev = high_water.fetch_max(pct, Ordering::SeqCst);
                    if pct >= prev {
                        if let Some(cb) = on_progress {
                            cb(pct);
                        }
                    }
                };
                backend.load(&monotonic).await?;
                info!("segmentation model loaded");
                Ok::<_, StudioError>(Mutex::new(backend))
            })
            .await?;
        Ok(())
    }

    /// Segment a decoded frame into a foreground confidence mask
    ///
    /// # Errors
    /// - `ModelUnavailable` before `ensure_ready` has completed
    /// - `InvalidConfig` for zero-dimension input
    /// - `Inference` when the model call errors or returns a structurally
    ///   invalid result (empty map, dimensions that do not match the input)
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub async fn segment(&self, image: &DynamicImage) -> Result<SegmentationMask> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(StudioError::invalid_config(
                "segmentation input must have non-zero dimensions",
            ));
        }

        let cell = self.backend.get().ok_or_else(|| {
            StudioError::model_unavailable("segment called before ensure_ready completed")
        })?;

        // One inference at a time against the shared backend
        let mut backend = cell.lock().await;
        let raw = backend.segment(image).await?;

        if raw.is_empty() {
            return Err(StudioError::inference("model returned an empty mask"));
        }
        let (mask_h, mask_w) = raw.dim();
        if (mask_w as u32, mask_h as u32) != (width, height) {
            return Err(StudioError::inference(format!(
                "model returned a {mask_w}x{mask_h} mask for a {width}x{height} frame"
            )));
        }

        SegmentationMask::new(raw.iter().copied().collect(), (width, height))
    }

    /// Segment with an optional deadline
    ///
    /// On expiry the current item fails with `Inference`; the engine itself
    /// stays usable for subsequent calls.
    pub async fn segment_with_timeout(
        &self,
        image: &DynamicImage,
        timeout: Option<Duration>,
    ) -> Result<SegmentationMask> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.segment(image))
                .await
                .map_err(|_| {
                    StudioError::inference(format!(
                        "inference timed out after {}ms",
                        limit.as_millis()
                    ))
                })?,
            None => self.segment(image).await,
        }
    }
}
