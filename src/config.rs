//! Enhancement configuration
//!
//! Collects everything the UI layer supplies synchronously: background choice,
//! color sliders, watermark settings, and the inference timeout. Validated at
//! the boundary via the builder.

use crate::background::BackgroundSpec;
use crate::error::{Result, StudioError};
use crate::grade::ColorAdjustment;
use image::Rgba;
use std::time::Duration;

/// Default JPEG quality used for enhanced frames and exports
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Configuration for a batch enhancement run
#[derive(Debug, Clone)]
pub struct EnhanceConfig {
    /// Backdrop painted behind the cutout
    pub background: BackgroundSpec,
    /// Color slider values
    pub adjustment: ColorAdjustment,
    /// Watermark text, stamped when `watermark_enabled`
    pub watermark_text: String,
    /// Whether the watermark is stamped at all
    pub watermark_enabled: bool,
    /// Render a drop shadow beneath the vehicle
    pub shadow: bool,
    /// Deadline for a single inference call; `None` waits indefinitely
    pub inference_timeout: Option<Duration>,
    /// JPEG quality for encoded output (0-100)
    pub jpeg_quality: u8,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            background: BackgroundSpec::Flat(Rgba([245, 245, 245, 255])),
            adjustment: ColorAdjustment::default(),
            watermark_text: String::new(),
            watermark_enabled: false,
            shadow: true,
            inference_timeout: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl EnhanceConfig {
    /// Create a configuration builder
    #[must_use]
    pub fn builder() -> EnhanceConfigBuilder {
        EnhanceConfigBuilder::new()
    }
}

/// Builder for [`EnhanceConfig`]
pub struct EnhanceConfigBuilder {
    config: EnhanceConfig,
}

impl EnhanceConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EnhanceConfig::default(),
        }
    }

    #[must_use]
    pub fn background(mut self, background: BackgroundSpec) -> Self {
        self.config.background = background;
        self
    }

    #[must_use]
    pub fn adjustment(mut self, adjustment: ColorAdjustment) -> Self {
        self.config.adjustment = adjustment;
        self
    }

    #[must_use]
    pub fn watermark<S: Into<String>>(mut self, text: S, enabled: bool) -> Self {
        self.config.watermark_text = text.into();
        self.config.watermark_enabled = enabled;
        self
    }

    #[must_use]
    pub fn shadow(mut self, shadow: bool) -> Self {
        self.config.shadow = shadow;
        self
    }

    #[must_use]
    pub fn inference_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.inference_timeout = timeout;
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` for out-of-range slider values or quality.
    pub fn build(self) -> Result<EnhanceConfig> {
        self.config.adjustment.validate()?;
        if self.config.jpeg_quality > 100 {
            return Err(StudioError::invalid_config(format!(
                "JPEG quality must be 0-100, got {}",
                self.config.jpeg_quality
            )));
        }
        if let Some(timeout) = self.config.inference_timeout {
            if timeout.is_zero() {
                return Err(StudioError::invalid_config(
                    "inference timeout must be greater than zero",
                ));
            }
        }
        Ok(self.config)
    }
}

impl Default for EnhanceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        let config = EnhanceConfig::builder().build().unwrap();
        assert!(!config.watermark_enabled);
        assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn negative_saturation_is_rejected_at_build() {
        let result = EnhanceConfig::builder()
            .adjustment(ColorAdjustment {
                saturation: -1.0,
                ..ColorAdjustment::default()
            })
            .build();
        assert!(matches!(result, Err(StudioError::InvalidConfig(_))));
    }

    #[test]
    fn excessive_quality_is_rejected() {
        let result = EnhanceConfig::builder().jpeg_quality(101).build();
        assert!(matches!(result, Err(StudioError::InvalidConfig(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = EnhanceConfig::builder()
            .inference_timeout(Some(Duration::ZERO))
            .build();
        assert!(matches!(result, Err(StudioError::InvalidConfig(_))));
    }

    #[test]
    fn builder_sets_watermark() {
        let config = EnhanceConfig::builder()
            .watermark("AUTO HAUS", true)
            .build()
            .unwrap();
        assert!(config.watermark_enabled);
        assert_eq!(config.watermark_text, "AUTO HAUS");
    }
}
