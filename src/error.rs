//! Error types for the studio pipeline

use thiserror::Error;

/// Result type alias for studio pipeline operations
pub type Result<T> = std::result::Result<T, StudioError>;

/// Error taxonomy for segmentation, compositing, and export operations
#[derive(Error, Debug)]
pub enum StudioError {
    /// Segmentation requested before the engine finished loading
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Model call failed, timed out, or returned a malformed result
    #[error("Inference error: {0}")]
    Inference(String),

    /// Mask and image dimensions do not agree
    #[error("Dimension mismatch: image is {image_width}x{image_height}, mask is {mask_width}x{mask_height}")]
    DimensionMismatch {
        /// Width of the source image
        image_width: u32,
        /// Height of the source image
        image_height: u32,
        /// Width of the offending mask
        mask_width: u32,
        /// Height of the offending mask
        mask_height: u32,
    },

    /// Unknown background kind or preset id
    #[error("Unsupported background: {0}")]
    UnsupportedBackground(String),

    /// Serialization or archival failure during export
    #[error("Export error: {0}")]
    Export(String),

    /// Underlying image decode/encode or file I/O failure
    #[error("Device I/O error: {0}")]
    DeviceIo(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StudioError {
    /// Create a new model-unavailable error
    pub fn model_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a dimension mismatch error from image and mask dimensions
    #[must_use]
    pub fn dimension_mismatch(image: (u32, u32), mask: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            image_width: image.0,
            image_height: image.1,
            mask_width: mask.0,
            mask_height: mask.1,
        }
    }

    /// Create a new unsupported background error
    pub fn unsupported_background<S: Into<String>>(kind: S) -> Self {
        Self::UnsupportedBackground(kind.into())
    }

    /// Create a new export error
    pub fn export<S: Into<String>>(msg: S) -> Self {
        Self::Export(msg.into())
    }

    /// Create a new device I/O error
    pub fn device_io<S: Into<String>>(msg: S) -> Self {
        Self::DeviceIo(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        Self::DeviceIo(err.to_string())
    }
}

impl From<image::ImageError> for StudioError {
    fn from(err: image::ImageError) -> Self {
        Self::DeviceIo(err.to_string())
    }
}
