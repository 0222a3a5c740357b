//! Error taxonomy and raw failure shapes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Closed set of failure categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NetworkError,
    ConnectionError,
    Timeout,
    ServerError,
    RateLimit,
    AuthenticationError,
    InvalidRequest,
    ModelNotFound,
    ModelUnavailable,
    ContentFilter,
    ContextLengthExceeded,
    ProviderUnavailable,
    AllProvidersFailed,
    Unknown,
}

impl ErrorKind {
    /// Worth trying again, on this provider or another one
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NetworkError
                | Self::ConnectionError
                | Self::Timeout
                | Self::ServerError
                | Self::RateLimit
                | Self::ProviderUnavailable
        )
    }

    /// Must not be retried against the same provider
    pub fn is_severe(self) -> bool {
        matches!(
            self,
            Self::AuthenticationError
                | Self::ModelNotFound
                | Self::ModelUnavailable
                | Self::ContentFilter
                | Self::ContextLengthExceeded
        )
    }

    /// Short human-readable explanation
    pub fn user_message(self) -> &'static str {
        match self {
            Self::NetworkError => "Network error, check your internet connection",
            Self::ConnectionError => "Could not connect to the provider",
            Self::Timeout => "The request timed out before the provider answered",
            Self::ServerError => "The provider reported a server error, try again later",
            Self::RateLimit => "Rate limit exceeded, try again later",
            Self::AuthenticationError => "Authentication failed, check the API key",
            Self::InvalidRequest => "The request was rejected as invalid, check the input",
            Self::ModelNotFound => "The model was not found, check the model name",
            Self::ModelUnavailable => "The model is not available for this task",
            Self::ContentFilter => "The request was blocked by a content filter",
            Self::ContextLengthExceeded => "The input exceeds the model context length",
            Self::ProviderUnavailable => "The provider is currently unavailable",
            Self::AllProvidersFailed => "All providers failed",
            Self::Unknown => "Unknown error",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkError => "NetworkError",
            Self::ConnectionError => "ConnectionError",
            Self::Timeout => "Timeout",
            Self::ServerError => "ServerError",
            Self::RateLimit => "RateLimit",
            Self::AuthenticationError => "AuthenticationError",
            Self::InvalidRequest => "InvalidRequest",
            Self::ModelNotFound => "ModelNotFound",
            Self::ModelUnavailable => "ModelUnavailable",
            Self::ContentFilter => "ContentFilter",
            Self::ContextLengthExceeded => "ContextLengthExceeded",
            Self::ProviderUnavailable => "ProviderUnavailable",
            Self::AllProvidersFailed => "AllProvidersFailed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend failure as observed at the dispatcher boundary
///
/// Each backend family builds one of these once; classification then matches on
/// the variant instead of probing loosely shaped error objects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RawFailure {
    /// The backend answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The transport failed before a response arrived
    #[error("network error {code}: {message}")]
    Network { code: String, message: String },

    /// Only a message is known, optionally tagged with the provider that raised it
    #[error("{text}")]
    Message {
        text: String,
        provider: Option<String>,
    },

    /// The call exceeded its deadline
    #[error("request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// The call was refused locally because the provider is cooling down
    #[error("provider {provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },
}

impl RawFailure {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    pub fn network(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::Message {
            text: text.into(),
            provider: None,
        }
    }

    /// Message tagged with the provider family that produced it
    pub fn from_provider(provider: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Message {
            text: text.into(),
            provider: Some(provider.into()),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Timeout { after }
    }

    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}
