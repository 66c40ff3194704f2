//! Background removal processor
//!
//! Runs one request through decode -> removal capability -> composite and
//! collapses every failure past the argument check into a single processing
//! error. Pixel work runs on the blocking pool; the capability is the only
//! await point that depends on a collaborator.

use crate::{
    compositor::ImageCompositor,
    config::CompositorConfig,
    context::PlatformContext,
    error::{BgRemovalError, Result},
    remover::{panic_message, BackgroundRemover},
    services::ImageIOService,
    types::{CompositeResult, ImageRequest},
};
use futures::FutureExt;
use instant::Instant;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, info, instrument, warn};

/// Unified processor shared by every call on a plugin instance
pub struct BackgroundRemovalProcessor<R> {
    remover: R,
    compositor: Arc<ImageCompositor>,
}

impl<R: BackgroundRemover> BackgroundRemovalProcessor<R> {
    /// Create a processor around a removal capability
    ///
    /// # Errors
    /// - Invalid compositor configuration
    pub fn new(remover: R, config: CompositorConfig) -> Result<Self> {
        Ok(Self {
            remover,
            compositor: Arc::new(ImageCompositor::new(config)?),
        })
    }

    /// Create a processor with the default 256-wide white canvas
    pub fn with_defaults(remover: R) -> Self {
        Self {
            remover,
            compositor: Arc::new(ImageCompositor::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        self.compositor.config()
    }

    #[must_use]
    pub fn remover(&self) -> &R {
        &self.remover
    }

    /// Process a request into a composited PNG
    ///
    /// # Errors
    ///
    /// Returns `BgRemovalError::Processing` with a fixed message for any decode,
    /// capability, composite or encode failure. The detailed cause is logged.
    #[instrument(
        skip(self, request, context),
        fields(
            remover = %self.remover.name(),
            request_bytes = request.len(),
            context = %context.label
        )
    )]
    pub async fn process(
        &self,
        request: ImageRequest,
        context: &PlatformContext,
    ) -> Result<CompositeResult> {
        let total_start = Instant::now();

        match self.run(request, context).await {
            Ok(mut result) => {
                result.timings.total_ms = total_start.elapsed().as_millis() as u64;
                info!(
                    width = result.width,
                    height = result.height,
                    png_bytes = result.bytes.len(),
                    total_ms = result.timings.total_ms,
                    "Background removal completed"
                );
                Ok(result)
            },
            Err(e) => {
                warn!(error = %e, "Background removal failed");
                Err(e.flatten())
            },
        }
    }

    /// Process raw bytes; shorthand for [`Self::process`]
    ///
    /// # Errors
    /// - Same as [`Self::process`]
    pub async fn process_bytes(
        &self,
        bytes: Vec<u8>,
        context: &PlatformContext,
    ) -> Result<CompositeResult> {
        self.process(ImageRequest::new(bytes), context).await
    }

    async fn run(
        &self,
        request: ImageRequest,
        context: &PlatformContext,
    ) -> Result<CompositeResult> {
        let decode_start = Instant::now();
        let decode_context = context.clone();
        let bitmap = tokio::task::spawn_blocking(move || {
            ImageIOService::decode_bytes(request.as_bytes(), &decode_context)
        })
        .await
        .map_err(join_error)??;
        let decode_ms = decode_start.elapsed().as_millis() as u64;
        debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            decode_ms,
            "Decoded request image"
        );

        let removal_start = Instant::now();
        let enable_high_accuracy = self.config().enable_high_accuracy;
        let removal = AssertUnwindSafe(async {
            self.remover
                .remove_background(bitmap, enable_high_accuracy)
                .await
        })
        .catch_unwind()
        .await;
        let processed = match removal {
            Ok(Ok(processed)) => processed,
            Ok(Err(failure)) => return Err(self.removal_error(&failure.message)),
            Err(payload) => {
                let message = format!("capability panicked: {}", panic_message(payload.as_ref()));
                return Err(self.removal_error(&message));
            },
        };
        let removal_ms = removal_start.elapsed().as_millis() as u64;

        let compositor = Arc::clone(&self.compositor);
        let mut result = tokio::task::spawn_blocking(move || compositor.composite(processed))
            .await
            .map_err(join_error)??;

        result.timings.decode_ms = decode_ms;
        result.timings.removal_ms = removal_ms;
        Ok(result)
    }

    fn removal_error(&self, details: &str) -> BgRemovalError {
        BgRemovalError::processing_stage_error(
            "remove_background",
            details,
            Some(self.remover.name()),
        )
    }
}

fn join_error(error: JoinError) -> BgRemovalError {
    BgRemovalError::processing(format!("Blocking image task failed: {}", error))
}
