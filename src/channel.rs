//! Method channel message types
//!
//! A method channel carries a method name plus loosely typed arguments from
//! the UI framework to native code, and a single reply back: a success value,
//! an error triple, or "not implemented". Only the value model lives here; the
//! byte-level transport encoding belongs to the host framework.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Channel the background remover plugin registers on
pub const CHANNEL_NAME: &str = "background_remover";

/// Method that runs background removal on an encoded image
pub const REMOVE_BACKGROUND_METHOD: &str = "removeBackground";

/// Argument key carrying the encoded image bytes
pub const IMAGE_BYTES_ARGUMENT: &str = "imageBytes";

/// Values a method channel can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ChannelValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<ChannelValue>),
    Map(BTreeMap<String, ChannelValue>),
}

impl ChannelValue {
    /// Borrow the payload of a `Bytes` value
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Take the payload of a `Bytes` value
    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Vec<u8>> for ChannelValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<String> for ChannelValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ChannelValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// An inbound method invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name
    pub method: String,
    /// Call arguments (usually a `Map`, may be `Null`)
    pub arguments: ChannelValue,
}

impl MethodCall {
    /// Create a call with no arguments
    pub fn new<S: Into<String>>(method: S) -> Self {
        Self {
            method: method.into(),
            arguments: ChannelValue::Null,
        }
    }

    /// Add a named argument, turning the arguments into a map if needed
    #[must_use]
    pub fn with_argument<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ChannelValue>,
    {
        if !matches!(self.arguments, ChannelValue::Map(_)) {
            self.arguments = ChannelValue::Map(BTreeMap::new());
        }
        if let ChannelValue::Map(map) = &mut self.arguments {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Build a `removeBackground` call carrying the given image bytes
    #[must_use]
    pub fn remove_background(image_bytes: Vec<u8>) -> Self {
        Self::new(REMOVE_BACKGROUND_METHOD).with_argument(IMAGE_BYTES_ARGUMENT, image_bytes)
    }

    /// Look up a named argument; `None` when arguments are not a map or the key is absent
    #[must_use]
    pub fn argument(&self, key: &str) -> Option<&ChannelValue> {
        match &self.arguments {
            ChannelValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Look up a named byte-blob argument. Absent, null and non-bytes values all yield `None`.
    #[must_use]
    pub fn argument_bytes(&self, key: &str) -> Option<&[u8]> {
        self.argument(key).and_then(ChannelValue::as_bytes)
    }

    /// Remove a named byte-blob argument and return its payload.
    ///
    /// A value of another kind is left in place and `None` is returned.
    pub fn take_argument_bytes(&mut self, key: &str) -> Option<Vec<u8>> {
        let ChannelValue::Map(map) = &mut self.arguments else {
            return None;
        };
        if !matches!(map.get(key), Some(ChannelValue::Bytes(_))) {
            return None;
        }
        map.remove(key).and_then(ChannelValue::into_bytes)
    }
}

/// Error codes reported over the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Required argument missing
    InvalidArgument,
    /// Anything that failed after the argument check
    ProcessingError,
    /// Host has no activity context attached
    ContextUnavailable,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ProcessingError => "PROCESSING_ERROR",
            Self::ContextUnavailable => "CONTEXT_UNAVAILABLE",
        }
    }

    /// Whether the error is raised before any processing starts
    #[must_use]
    pub fn is_precondition(self) -> bool {
        matches!(self, Self::InvalidArgument | Self::ContextUnavailable)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to a method call. Every call gets exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        result: ChannelValue,
    },
    Error {
        code: ErrorCode,
        message: String,
        details: Option<ChannelValue>,
    },
    NotImplemented,
}

impl MethodResponse {
    #[must_use]
    pub fn success<V: Into<ChannelValue>>(value: V) -> Self {
        Self::Success {
            result: value.into(),
        }
    }

    pub fn error<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        Self::Error {
            code,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Error code, if this is an error reply
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Byte payload of a successful reply
    #[must_use]
    pub fn success_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Success { result } => result.as_bytes(),
            _ => None,
        }
    }
}
