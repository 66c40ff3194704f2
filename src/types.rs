//! Core types flowing through one background removal request

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Raw encoded image bytes for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    bytes: Vec<u8>,
}

impl ImageRequest {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for ImageRequest {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// RGBA bitmap returned by the removal capability, background already transparent
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pixels: RgbaImage,
}

impl ProcessedImage {
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    #[must_use]
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

impl From<RgbaImage> for ProcessedImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

impl From<DynamicImage> for ProcessedImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.into_rgba8())
    }
}

/// Per-stage timings for one request, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Decoding request bytes
    pub decode_ms: u64,
    /// Waiting on the removal capability
    pub removal_ms: u64,
    /// Scaling and compositing onto the canvas
    pub composite_ms: u64,
    /// PNG encoding
    pub encode_ms: u64,
    /// Whole request
    pub total_ms: u64,
}

/// Encoded PNG produced by the compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeResult {
    /// PNG bytes
    pub bytes: Vec<u8>,
    /// Canvas width
    pub width: u32,
    /// Canvas height
    pub height: u32,
    /// Processing timings
    pub timings: ProcessingTimings,
}

impl CompositeResult {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Hand the PNG bytes over to the caller
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_image_request() {
        let request = ImageRequest::from(vec![0u8; 4]);
        assert_eq!(request.len(), 4);
        assert!(!request.is_empty());
        assert!(ImageRequest::new(Vec::new()).is_empty());
    }

    #[test]
    fn test_processed_image_from_dynamic() {
        let rgb = DynamicImage::new_rgb8(3, 2);
        let processed = ProcessedImage::from(rgb);
        assert_eq!(processed.dimensions(), (3, 2));
        // RGB input becomes fully opaque RGBA
        assert_eq!(processed.pixels().get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_composite_result_into_bytes() {
        let result = CompositeResult {
            bytes: vec![1, 2],
            width: 256,
            height: 128,
            timings: ProcessingTimings::default(),
        };
        assert_eq!(result.dimensions(), (256, 128));
        assert_eq!(result.into_bytes(), vec![1, 2]);
    }
}
