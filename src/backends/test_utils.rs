//! Mock segmentation backends for tests
//!
//! The mock model marks a centered rectangle covering half of each dimension
//! as foreground, which is enough structure for mask and compositing tests.

use crate::error::{Result, StudioError};
use crate::inference::{LoadProgress, SegmentationBackend, SegmentationBackendFactory};
use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use ndarray::Array2;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Progress steps reported by the mock model load
const LOAD_STEPS: [u8; 5] = [0, 25, 50, 75, 100];

/// Deterministic mock backend
pub(crate) struct MockSegmentationBackend {
    loaded: bool,
    /// Artificial per-inference delay
    segment_delay: Option<Duration>,
    /// 1-based call numbers that should fail with an inference error
    fail_on_calls: Vec<usize>,
    calls: usize,
}

impl MockSegmentationBackend {
    pub(crate) fn new() -> Self {
        Self {
            loaded: false,
            segment_delay: None,
            fail_on_calls: Vec::new(),
            calls: 0,
        }
    }

    pub(crate) fn with_segment_delay(mut self, delay: Duration) -> Self {
        self.segment_delay = Some(delay);
        self
    }

    pub(crate) fn failing_on_calls(mut self, calls: Vec<usize>) -> Self {
        self.fail_on_calls = calls;
        self
    }
}

#[async_trait]
impl SegmentationBackend for MockSegmentationBackend {
    async fn load(&mut self, on_progress: LoadProgress<'_>) -> Result<()> {
        for step in LOAD_STEPS {
            on_progress(step);
        }
        self.loaded = true;
        Ok(())
    }

    async fn segment(&mut self, image: &DynamicImage) -> Result<Array2<f32>> {
        if !self.loaded {
            return Err(StudioError::model_unavailable("mock backend not loaded"));
        }
        self.calls += 1;
        if self.fail_on_calls.contains(&self.calls) {
            return Err(StudioError::inference("mock inference failure"));
        }
        if let Some(delay) = self.segment_delay {
            tokio::time::sleep(delay).await;
        }

        let (width, height) = image.dimensions();
        let (w, h) = (width as usize, height as usize);
        let mut mask = Array2::zeros((h, w));
        for y in h / 4..(3 * h / 4).max(h / 4 + 1).min(h) {
            for x in w / 4..(3 * w / 4).max(w / 4 + 1).min(w) {
                mask[(y, x)] = 1.0;
            }
        }
        Ok(mask)
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Backend whose `load` always fails
struct FailingLoadBackend;

#[async_trait]
impl SegmentationBackend for FailingLoadBackend {
    async fn load(&mut self, _on_progress: LoadProgress<'_>) -> Result<()> {
        Err(StudioError::inference("mock model download failed"))
    }

    async fn segment(&mut self, _image: &DynamicImage) -> Result<Array2<f32>> {
        Err(StudioError::model_unavailable("mock backend not loaded"))
    }

    fn is_loaded(&self) -> bool {
        false
    }
}

struct ClosureFactory<F>(F);

impl<F> SegmentationBackendFactory for ClosureFactory<F>
where
    F: Fn() -> Result<Box<dyn SegmentationBackend>> + Send + Sync,
{
    fn create_backend(&self) -> Result<Box<dyn SegmentationBackend>> {
        (self.0)()
    }
}

/// Factory producing a plain mock backend
pub(crate) fn mock_factory() -> Box<dyn SegmentationBackendFactory> {
    Box::new(ClosureFactory(|| {
        Ok(Box::new(MockSegmentationBackend::new()) as Box<dyn SegmentationBackend>)
    }))
}

/// Factory producing a backend that fails on the given 1-based segment calls
pub(crate) fn flaky_factory(fail_on_calls: Vec<usize>) -> Box<dyn SegmentationBackendFactory> {
    Box::new(ClosureFactory(move || {
        Ok(
            Box::new(MockSegmentationBackend::new().failing_on_calls(fail_on_calls.clone()))
                as Box<dyn SegmentationBackend>,
        )
    }))
}

/// Factory producing a backend with slow inference
pub(crate) fn slow_factory(delay: Duration) -> Box<dyn SegmentationBackendFactory> {
    Box::new(ClosureFactory(move || {
        Ok(Box::new(MockSegmentationBackend::new().with_segment_delay(delay))
            as Box<dyn SegmentationBackend>)
    }))
}

/// Factory whose backends never finish loading
pub(crate) fn failing_factory() -> Box<dyn SegmentationBackendFactory> {
    Box::new(ClosureFactory(|| {
        Ok(Box::new(FailingLoadBackend) as Box<dyn SegmentationBackend>)
    }))
}

/// Factory that counts how many backends were actually loaded
pub(crate) struct CountingFactory {
    loads: Arc<AtomicUsize>,
}

impl CountingFactory {
    pub(crate) fn new() -> Self {
        Self {
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn load_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }
}

impl SegmentationBackendFactory for CountingFactory {
    fn create_backend(&self) -> Result<Box<dyn SegmentationBackend>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSegmentationBackend::new()))
    }
}
