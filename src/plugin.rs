//! Method channel plugin and its host lifecycle
//!
//! [`BackgroundRemoverPlugin`] answers `removeBackground` calls.
//! [`PluginHost`] models the framework side: it registers handlers on named
//! channels while attached to an engine, tracks the current activity context,
//! and hands that context to each call explicitly.
//!
//! Call handling order:
//! 1. unknown method -> not implemented
//! 2. missing `imageBytes` -> `INVALID_ARGUMENT`
//! 3. no activity context -> `CONTEXT_UNAVAILABLE`
//! 4. anything failing in the pipeline -> `PROCESSING_ERROR`

use crate::{
    channel::{
        MethodCall, MethodResponse, CHANNEL_NAME, IMAGE_BYTES_ARGUMENT, REMOVE_BACKGROUND_METHOD,
    },
    config::CompositorConfig,
    context::PlatformContext,
    error::{BgRemovalError, Result, NULL_IMAGE_BYTES_MESSAGE, PROCESSING_ERROR_MESSAGE},
    processor::BackgroundRemovalProcessor,
    remover::BackgroundRemover,
    types::ImageRequest,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};

/// Message reported when a call arrives with no activity attached
pub const NO_ACTIVITY_MESSAGE: &str = "No activity attached to process the image";

/// Handler for calls arriving on a method channel
#[async_trait]
pub trait MethodCallHandler: Send + Sync {
    /// Answer one call. Must produce exactly one response and never panic on bad input.
    async fn on_method_call(
        &self,
        call: MethodCall,
        context: Option<&PlatformContext>,
    ) -> MethodResponse;
}

/// Plugin exposing background removal on the `background_remover` channel
pub struct BackgroundRemoverPlugin<R> {
    processor: BackgroundRemovalProcessor<R>,
}

impl<R: BackgroundRemover> BackgroundRemoverPlugin<R> {
    /// Create a plugin with a custom compositor configuration
    ///
    /// # Errors
    /// - Invalid compositor configuration
    pub fn new(remover: R, config: CompositorConfig) -> Result<Self> {
        Ok(Self {
            processor: BackgroundRemovalProcessor::new(remover, config)?,
        })
    }

    pub fn with_defaults(remover: R) -> Self {
        Self {
            processor: BackgroundRemovalProcessor::with_defaults(remover),
        }
    }

    /// Channel this plugin expects to be registered on
    #[must_use]
    pub fn channel_name(&self) -> &'static str {
        CHANNEL_NAME
    }

    #[must_use]
    pub fn processor(&self) -> &BackgroundRemovalProcessor<R> {
        &self.processor
    }

    /// Answer a call with a context the caller guarantees is available
    pub async fn handle(&self, call: MethodCall, context: &PlatformContext) -> MethodResponse {
        self.dispatch(call, Some(context)).await
    }

    #[instrument(skip(self, call, context), fields(method = %call.method))]
    async fn dispatch(
        &self,
        call: MethodCall,
        context: Option<&PlatformContext>,
    ) -> MethodResponse {
        match call.method.as_str() {
            REMOVE_BACKGROUND_METHOD => self.remove_background(call, context).await,
            _ => {
                debug!("Method not implemented");
                MethodResponse::NotImplemented
            },
        }
    }

    async fn remove_background(
        &self,
        mut call: MethodCall,
        context: Option<&PlatformContext>,
    ) -> MethodResponse {
        let Some(image_bytes) = call.take_argument_bytes(IMAGE_BYTES_ARGUMENT) else {
            warn!("removeBackground called without image bytes");
            return error_response(&BgRemovalError::invalid_argument(NULL_IMAGE_BYTES_MESSAGE));
        };

        let Some(context) = context else {
            warn!("removeBackground called with no activity attached");
            return error_response(&BgRemovalError::context_unavailable(NO_ACTIVITY_MESSAGE));
        };

        match self
            .processor
            .process(ImageRequest::new(image_bytes), context)
            .await
        {
            Ok(result) => MethodResponse::success(result.into_bytes()),
            Err(e) => error_response(&e),
        }
    }
}

#[async_trait]
impl<R: BackgroundRemover> MethodCallHandler for BackgroundRemoverPlugin<R> {
    async fn on_method_call(
        &self,
        call: MethodCall,
        context: Option<&PlatformContext>,
    ) -> MethodResponse {
        self.dispatch(call, context).await
    }
}

/// Build the channel error reply for an error
#[must_use]
pub fn error_response(error: &BgRemovalError) -> MethodResponse {
    let message = match error {
        BgRemovalError::InvalidArgument(msg) | BgRemovalError::ContextUnavailable(msg) => {
            msg.clone()
        },
        _ => PROCESSING_ERROR_MESSAGE.to_string(),
    };
    MethodResponse::error(error.error_code(), message)
}

#[derive(Default)]
struct HostState {
    handlers: HashMap<String, Arc<dyn MethodCallHandler>>,
    activity: Option<PlatformContext>,
}

/// Framework-side registry of channel handlers plus the current activity
///
/// Lifecycle calls may race with dispatches; each dispatch works on a
/// snapshot of the handler and context taken when it starts.
#[derive(Default)]
pub struct PluginHost {
    state: RwLock<HostState>,
}

impl PluginHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` on `channel`, replacing any previous handler
    pub fn attach_to_engine<S: Into<String>>(
        &self,
        channel: S,
        handler: Arc<dyn MethodCallHandler>,
    ) {
        let channel = channel.into();
        info!(channel = %channel, "Plugin attached to engine");
        self.write_state().handlers.insert(channel, handler);
    }

    /// Unregister the handler on `channel`. Returns whether one was registered.
    pub fn detach_from_engine(&self, channel: &str) -> bool {
        let removed = self.write_state().handlers.remove(channel).is_some();
        info!(channel = %channel, removed, "Plugin detached from engine");
        removed
    }

    /// Make `context` the activity handed to subsequent calls
    ///
    /// # Errors
    /// - Context with invalid decode limits
    pub fn attach_to_activity(&self, context: PlatformContext) -> Result<()> {
        context.validate()?;
        info!(activity = %context.label, "Attached to activity");
        self.write_state().activity = Some(context);
        Ok(())
    }

    pub fn detach_from_activity(&self) {
        info!("Detached from activity");
        self.write_state().activity = None;
    }

    /// Activity torn down for a configuration change (rotation, resize)
    pub fn detach_from_activity_for_config_changes(&self) {
        debug!("Detached from activity for configuration change");
        self.write_state().activity = None;
    }

    /// Activity recreated after a configuration change
    ///
    /// # Errors
    /// - Context with invalid decode limits
    pub fn reattach_to_activity_for_config_changes(&self, context: PlatformContext) -> Result<()> {
        debug!("Reattaching to activity after configuration change");
        self.attach_to_activity(context)
    }

    #[must_use]
    pub fn has_activity(&self) -> bool {
        self.read_state().activity.is_some()
    }

    #[must_use]
    pub fn is_registered(&self, channel: &str) -> bool {
        self.read_state().handlers.contains_key(channel)
    }

    /// Deliver `call` to the handler on `channel`
    ///
    /// A channel with no handler answers "not implemented", matching what the
    /// framework reports for a missing plugin.
    pub async fn dispatch(&self, channel: &str, call: MethodCall) -> MethodResponse {
        let (handler, activity) = {
            let state = self.read_state();
            (state.handlers.get(channel).cloned(), state.activity.clone())
        };

        match handler {
            Some(handler) => handler.on_method_call(call, activity.as_ref()).await,
            None => {
                debug!(channel = %channel, method = %call.method, "No handler registered");
                MethodResponse::NotImplemented
            },
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, HostState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, HostState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Register `plugin` on its own channel
pub fn register_plugin<R>(host: &PluginHost, plugin: Arc<BackgroundRemoverPlugin<R>>)
where
    R: BackgroundRemover + 'static,
{
    let channel = plugin.channel_name();
    host.attach_to_engine(channel, plugin);
}
