//! Segmentation backend implementations
//!
//! The library ships no production runtime; app shells inject one through
//! [`crate::inference::SegmentationBackendFactory`]. Mock backends for tests
//! live here.

#[cfg(test)]
pub(crate) mod test_utils;
