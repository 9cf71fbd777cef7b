//! Segmentation backend abstraction
//!
//! The crate owns the pipeline, not the ML runtime. The app shell injects a
//! backend through [`SegmentationBackendFactory`], so the library never links
//! a particular runtime.

use crate::error::Result;
use async_trait::async_trait;
use image::DynamicImage;
use ndarray::Array2;

/// Callback invoked with model download/load progress, 0-100
pub type LoadProgress<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// Trait implemented by image-segmentation runtimes
///
/// `load` is the only network/disk-heavy operation in the core; `segment`
/// produces a row-major H x W foreground confidence map for a decoded frame.
#[async_trait]
pub trait SegmentationBackend: Send + Sync {
    /// Download/load the model, reporting progress as it goes
    ///
    /// # Errors
    /// Model fetch or initialization failures; callers must retry explicitly.
    async fn load(&mut self, on_progress: LoadProgress<'_>) -> Result<()>;

    /// Run inference on a decoded frame
    ///
    /// # Errors
    /// Returns an error when the underlying model call fails. Structural
    /// validation of the result happens in the engine.
    async fn segment(&mut self, image: &DynamicImage) -> Result<Array2<f32>>;

    /// Whether the model has finished loading
    fn is_loaded(&self) -> bool;
}

/// Factory for creating segmentation backends
///
/// The library ships no runtime of its own; frontends provide one (an ONNX
/// session, a remote service adapter, a test mock) through this seam.
pub trait SegmentationBackendFactory: Send + Sync {
    /// Create an unloaded backend instance
    ///
    /// # Errors
    /// Returns an error when the runtime cannot be constructed at all.
    fn create_backend(&self) -> Result<Box<dyn SegmentationBackend>>;
}
