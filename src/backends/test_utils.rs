//! Test utilities and mock capabilities
//!
//! Mock implementations of [`BackgroundRemover`] so the pipeline and plugin
//! can be tested without a real segmentation model.

use crate::{
    remover::{BackgroundRemover, RemoverFailure},
    types::ProcessedImage,
};
use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::{Arc, Mutex};

/// Foreground colour painted by [`MockBackgroundRemover`]
pub const MOCK_FOREGROUND: Rgba<u8> = Rgba([200, 30, 30, 255]);

/// Mock capability returning a fixed-size bitmap
///
/// The output's left half is transparent (removed background) and its right
/// half is an opaque [`MOCK_FOREGROUND`] block.
#[derive(Debug, Clone)]
pub struct MockBackgroundRemover {
    /// Output dimensions, `None` to echo the input size
    output_size: Option<(u32, u32)>,
    /// Whether to simulate a capability failure
    should_fail: bool,
    /// Whether to panic inside the capability
    should_panic: bool,
    /// Call history for verification in tests
    call_history: Arc<Mutex<Vec<String>>>,
}

impl MockBackgroundRemover {
    /// Mock that echoes the input dimensions
    #[must_use]
    pub fn new() -> Self {
        Self {
            output_size: None,
            should_fail: false,
            should_panic: false,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock producing a `width x height` processed bitmap
    #[must_use]
    pub fn with_output_size(width: u32, height: u32) -> Self {
        let mut remover = Self::new();
        remover.output_size = Some((width, height));
        remover
    }

    /// Mock that always fails
    #[must_use]
    pub fn new_failing() -> Self {
        let mut remover = Self::new();
        remover.should_fail = true;
        remover
    }

    /// Mock that panics mid-call
    #[must_use]
    pub fn new_panicking() -> Self {
        let mut remover = Self::new();
        remover.should_panic = true;
        remover
    }

    /// Get the call history for verification in tests
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(call);
        }
    }
}

impl Default for MockBackgroundRemover {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackgroundRemover for MockBackgroundRemover {
    async fn remove_background(
        &self,
        bitmap: DynamicImage,
        enable_high_accuracy: bool,
    ) -> Result<ProcessedImage, RemoverFailure> {
        self.record_call(format!(
            "remove_background({}x{}, high_accuracy={})",
            bitmap.width(),
            bitmap.height(),
            enable_high_accuracy
        ));

        if self.should_fail {
            return Err(RemoverFailure::new("Mock capability failed"));
        }
        if self.should_panic {
            panic!("Mock capability panicked");
        }

        let (width, height) = self
            .output_size
            .unwrap_or((bitmap.width(), bitmap.height()));
        Ok(ProcessedImage::new(test_helpers::half_foreground(width, height)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Helper functions for creating test images
pub mod test_helpers {
    use super::*;
    use image::{ExtendedColorType, ImageEncoder};

    /// Left half transparent, right half opaque foreground
    pub fn half_foreground(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([0, 0, 0, 0])
            } else {
                MOCK_FOREGROUND
            }
        })
    }

    /// Gradient test image encoded as PNG
    pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            Rgba([r, g, 128, 255])
        });

        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_input_size() {
        let remover = MockBackgroundRemover::new();
        let processed = remover
            .remove_background(DynamicImage::new_rgb8(10, 4), true)
            .await
            .unwrap();
        assert_eq!(processed.dimensions(), (10, 4));
        assert_eq!(processed.pixels().get_pixel(0, 0)[3], 0);
        assert_eq!(processed.pixels().get_pixel(9, 3), &MOCK_FOREGROUND);
    }

    #[tokio::test]
    async fn test_mock_failure_and_history() {
        let remover = MockBackgroundRemover::new_failing();
        assert!(remover
            .remove_background(DynamicImage::new_rgb8(2, 2), false)
            .await
            .is_err());
        assert_eq!(
            remover.get_call_history(),
            vec!["remove_background(2x2, high_accuracy=false)".to_string()]
        );
    }
}
