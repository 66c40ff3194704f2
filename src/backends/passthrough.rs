//! Identity capability for inputs whose background is already removed

use crate::{
    remover::{BackgroundRemover, RemoverFailure},
    types::ProcessedImage,
};
use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

/// Returns its input unchanged as RGBA.
///
/// Useful for hosts that run segmentation elsewhere and only need the
/// compositing half of the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRemover;

impl PassthroughRemover {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BackgroundRemover for PassthroughRemover {
    async fn remove_background(
        &self,
        bitmap: DynamicImage,
        enable_high_accuracy: bool,
    ) -> Result<ProcessedImage, RemoverFailure> {
        debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            enable_high_accuracy,
            "Passing bitmap through unchanged"
        );
        Ok(ProcessedImage::from(bitmap))
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}
