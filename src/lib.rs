#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]

//! # Background Removal Channel
//!
//! Native side of a `background_remover` method channel. A UI framework
//! sends a `removeBackground` call carrying encoded image bytes; the plugin
//! decodes them, hands the bitmap to a pluggable removal capability, scales
//! the result to a fixed-width canvas, flattens it onto an opaque background
//! and replies with PNG bytes.
//!
//! ## Features
//!
//! - **Method channel model**: [`MethodCall`], [`MethodResponse`] and the three wire error codes
//! - **Pluggable capability**: async [`BackgroundRemover`] trait plus a
//!   [`CallbackAdapter`] for listener-style segmenters
//! - **Host lifecycle**: [`PluginHost`] with engine and activity attach/detach
//! - **Deterministic compositing**: aspect-preserving scale, centered placement,
//!   integer alpha blending, lossless PNG output
//! - **CLI Integration**: Optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremove_channel::{
//!     register_plugin, BackgroundRemoverPlugin, MethodCall, PassthroughRemover,
//!     PlatformContext, PluginHost, CHANNEL_NAME,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(image_bytes: Vec<u8>) -> anyhow::Result<()> {
//! let host = PluginHost::new();
//! register_plugin(&host, Arc::new(BackgroundRemoverPlugin::with_defaults(PassthroughRemover)));
//! host.attach_to_activity(PlatformContext::new("main"))?;
//!
//! let response = host
//!     .dispatch(CHANNEL_NAME, MethodCall::remove_background(image_bytes))
//!     .await;
//! if let Some(png) = response.success_bytes() {
//!     std::fs::write("output.png", png)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface and tracing subscriber setup
//! - `webp-support` (default): WebP input decoding
//! - `tracing-json`: JSON structured log output for the CLI

pub mod backends;
pub mod channel;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod context;
pub mod error;
pub mod plugin;
pub mod processor;
pub mod remover;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

use tokio::io::AsyncRead;

// Public API exports
pub use backends::PassthroughRemover;
pub use channel::{
    ChannelValue, ErrorCode, MethodCall, MethodResponse, CHANNEL_NAME, IMAGE_BYTES_ARGUMENT,
    REMOVE_BACKGROUND_METHOD,
};
pub use compositor::ImageCompositor;
pub use config::{CompositorConfig, CompositorConfigBuilder, PngCompression, ResampleFilter};
pub use context::PlatformContext;
pub use error::{BgRemovalError, Result, NULL_IMAGE_BYTES_MESSAGE, PROCESSING_ERROR_MESSAGE};
pub use plugin::{
    error_response, register_plugin, BackgroundRemoverPlugin, MethodCallHandler, PluginHost,
    NO_ACTIVITY_MESSAGE,
};
pub use processor::BackgroundRemovalProcessor;
pub use remover::{
    BackgroundRemover, CallbackAdapter, CallbackBackgroundRemover, RemovalListener, RemoverFailure,
};
pub use services::{ImageIOService, PngOutputHandler};
pub use types::{CompositeResult, ImageRequest, ProcessedImage, ProcessingTimings};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, init_library_tracing, TracingConfig, TracingFormat};

/// Run the full pipeline on encoded image bytes without going through a channel
///
/// Errors are flattened the same way the plugin reports them: anything past
/// argument handling is a processing error with a fixed message.
///
/// # Examples
///
/// ```rust,no_run
/// use bgremove_channel::{
///     remove_background_from_bytes, CompositorConfig, PassthroughRemover, PlatformContext,
/// };
///
/// # async fn example(upload: Vec<u8>) -> anyhow::Result<()> {
/// let result = remove_background_from_bytes(
///     upload,
///     PassthroughRemover,
///     &PlatformContext::default(),
///     CompositorConfig::default(),
/// )
/// .await?;
/// assert_eq!(result.width, 256);
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_bytes<R: BackgroundRemover>(
    image_bytes: Vec<u8>,
    remover: R,
    context: &PlatformContext,
    config: CompositorConfig,
) -> Result<CompositeResult> {
    let processor = BackgroundRemovalProcessor::new(remover, config)?;
    processor.process_bytes(image_bytes, context).await
}

/// Read an image from an async stream, then run [`remove_background_from_bytes`]
///
/// # Errors
/// - Stream read failure (reported as a processing error)
/// - Same as [`remove_background_from_bytes`]
pub async fn remove_background_from_reader<S, R>(
    mut reader: S,
    remover: R,
    context: &PlatformContext,
    config: CompositorConfig,
) -> Result<CompositeResult>
where
    S: AsyncRead + Unpin,
    R: BackgroundRemover,
{
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer)
        .await
        .map_err(|e| BgRemovalError::processing(format!("Failed to read from stream: {}", e)))?;

    remove_background_from_bytes(buffer, remover, context, config).await
}
