//! Error types for background removal bridge operations

use crate::channel::ErrorCode;
use thiserror::Error;

/// Message reported to the caller for every flattened processing failure
pub const PROCESSING_ERROR_MESSAGE: &str = "Error processing image";

/// Message reported when the `imageBytes` argument is missing
pub const NULL_IMAGE_BYTES_MESSAGE: &str = "Image bytes are null";

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Error types for background removal bridge operations
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Required input missing or of the wrong type, detected before processing starts
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Any failure from decoding, the removal capability, compositing or encoding
    #[error("Processing error: {0}")]
    Processing(String),

    /// The host has no activity context to process the call with
    #[error("Context unavailable: {0}")]
    ContextUnavailable(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Image format, decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Input/output errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BgRemovalError {
    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new context unavailable error
    pub fn context_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ContextUnavailable(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create processing error with stage context
    pub fn processing_stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Processing(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }

    /// Collapse any error into the generic processing error the caller sees.
    ///
    /// `InvalidArgument` and `ContextUnavailable` are reported before processing
    /// starts and pass through unchanged.
    #[must_use]
    pub fn flatten(self) -> Self {
        match self {
            Self::InvalidArgument(_) | Self::ContextUnavailable(_) => self,
            _ => Self::Processing(PROCESSING_ERROR_MESSAGE.to_string()),
        }
    }

    /// Channel error code this error is reported under
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::ContextUnavailable(_) => ErrorCode::ContextUnavailable,
            Self::Processing(_) | Self::InvalidConfig(_) | Self::Image(_) | Self::Io(_) => {
                ErrorCode::ProcessingError
            },
        }
    }
}
