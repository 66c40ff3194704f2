//! Background removal capability abstraction
//!
//! The segmentation itself is an external collaborator. It is reached through
//! [`BackgroundRemover`], an awaitable seam with exactly two terminal
//! outcomes. Capabilities that report through a listener instead of returning
//! a future are wrapped with [`CallbackAdapter`].

use crate::types::ProcessedImage;
use async_trait::async_trait;
use image::DynamicImage;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::warn;

/// Failure reported by a removal capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Background removal failed: {message}")]
pub struct RemoverFailure {
    pub message: String,
}

impl RemoverFailure {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Awaitable background removal capability
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Remove the background from `bitmap`
    ///
    /// # Errors
    /// - Any failure inside the capability
    async fn remove_background(
        &self,
        bitmap: DynamicImage,
        enable_high_accuracy: bool,
    ) -> Result<ProcessedImage, RemoverFailure>;

    /// Name used in logs
    fn name(&self) -> &str {
        "unnamed"
    }
}

#[async_trait]
impl<T: BackgroundRemover + ?Sized> BackgroundRemover for Arc<T> {
    async fn remove_background(
        &self,
        bitmap: DynamicImage,
        enable_high_accuracy: bool,
    ) -> Result<ProcessedImage, RemoverFailure> {
        (**self)
            .remove_background(bitmap, enable_high_accuracy)
            .await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Single-shot completion handle given to a callback-style capability.
///
/// Both methods consume the listener, so at most one outcome is delivered.
/// Dropping it without calling either counts as a failure.
#[derive(Debug)]
pub struct RemovalListener {
    sender: oneshot::Sender<Result<DynamicImage, RemoverFailure>>,
}

impl RemovalListener {
    /// Report the processed bitmap
    pub fn on_success(self, bitmap: DynamicImage) {
        if self.sender.send(Ok(bitmap)).is_err() {
            warn!("Removal result delivered after the caller went away");
        }
    }

    /// Report a failure
    pub fn on_failed(self, failure: RemoverFailure) {
        if self.sender.send(Err(failure)).is_err() {
            warn!("Removal failure delivered after the caller went away");
        }
    }
}

/// Capability that completes through a [`RemovalListener`]
pub trait CallbackBackgroundRemover: Send + Sync {
    /// Start processing `bitmap`; the outcome goes to `listener`, possibly
    /// from another thread and possibly before this call returns.
    fn bitmap_for_processing(
        &self,
        bitmap: DynamicImage,
        enable_high_accuracy: bool,
        listener: RemovalListener,
    );

    fn name(&self) -> &str {
        "callback"
    }
}

/// Exposes a callback-style capability as a [`BackgroundRemover`]
#[derive(Debug, Clone)]
pub struct CallbackAdapter<R> {
    inner: R,
}

impl<R: CallbackBackgroundRemover> CallbackAdapter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: CallbackBackgroundRemover> BackgroundRemover for CallbackAdapter<R> {
    async fn remove_background(
        &self,
        bitmap: DynamicImage,
        enable_high_accuracy: bool,
    ) -> Result<ProcessedImage, RemoverFailure> {
        let (sender, receiver) = oneshot::channel();
        let listener = RemovalListener { sender };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .bitmap_for_processing(bitmap, enable_high_accuracy, listener);
        })) {
            return Err(RemoverFailure::new(format!(
                "capability panicked: {}",
                panic_message(payload.as_ref())
            )));
        }

        match receiver.await {
            Ok(Ok(bitmap)) => Ok(ProcessedImage::from(bitmap)),
            Ok(Err(failure)) => Err(failure),
            Err(_) => Err(RemoverFailure::new(
                "listener dropped without reporting a result",
            )),
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
