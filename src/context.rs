//! Per-call platform context
//!
//! The host passes a context into every call instead of the plugin holding on
//! to an activity handle. It only supplies decoding resources and is never
//! mutated by processing.

use crate::error::{BgRemovalError, Result};
use serde::{Deserialize, Serialize};

/// Default cap on decoded image dimensions (either side)
pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

/// Default cap on decoder allocations, in bytes
pub const DEFAULT_MAX_ALLOC: u64 = 512 * 1024 * 1024;

/// Read-only decoding resources for one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformContext {
    /// Label identifying the host surface (activity name, window id, ...)
    pub label: String,
    /// Largest accepted decoded width
    pub max_image_width: u32,
    /// Largest accepted decoded height
    pub max_image_height: u32,
    /// Largest allocation the decoder may make
    pub max_alloc_bytes: u64,
}

impl Default for PlatformContext {
    fn default() -> Self {
        Self {
            label: "default".to_string(),
            max_image_width: DEFAULT_MAX_DIMENSION,
            max_image_height: DEFAULT_MAX_DIMENSION,
            max_alloc_bytes: DEFAULT_MAX_ALLOC,
        }
    }
}

impl PlatformContext {
    /// Create a context with default limits
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Restrict decoded dimensions
    #[must_use]
    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_image_width = width;
        self.max_image_height = height;
        self
    }

    /// Restrict decoder allocations
    #[must_use]
    pub fn with_max_alloc(mut self, bytes: u64) -> Self {
        self.max_alloc_bytes = bytes;
        self
    }

    /// # Errors
    /// - Any limit set to zero
    pub fn validate(&self) -> Result<()> {
        if self.max_image_width == 0 || self.max_image_height == 0 {
            return Err(BgRemovalError::invalid_config(format!(
                "Decode dimension limits must be positive, got {}x{}",
                self.max_image_width, self.max_image_height
            )));
        }
        if self.max_alloc_bytes == 0 {
            return Err(BgRemovalError::invalid_config(
                "Decode allocation limit must be positive",
            ));
        }
        Ok(())
    }

    /// Decoder limits derived from this context
    #[must_use]
    pub fn decode_limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.max_image_width);
        limits.max_image_height = Some(self.max_image_height);
        limits.max_alloc = Some(self.max_alloc_bytes);
        limits
    }
}
