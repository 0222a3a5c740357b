//! Mapping raw failures onto [`ErrorKind`]

use super::types::{ErrorKind, RawFailure};

/// Backend families with their own error vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    OpenAi,
    Anthropic,
    LocalRuntime,
    Other,
}

impl ProviderFamily {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "openai" => Self::OpenAi,
            "anthropic" => Self::Anthropic,
            "ollama" | "lmstudio" | "local" => Self::LocalRuntime,
            _ => Self::Other,
        }
    }
}

/// Classify a failure.
///
/// HTTP status wins, then transport codes and timeout/connection keywords, then
/// provider-specific keywords, then `Unknown`.
pub fn classify(failure: &RawFailure) -> ErrorKind {
    match failure {
        RawFailure::Http { status, .. } => classify_status(*status),
        RawFailure::Network { code, message } => {
            let code = code.to_ascii_lowercase();
            let message = message.to_lowercase();
            classify_transport(&code, &message).unwrap_or(ErrorKind::Unknown)
        }
        RawFailure::Message { text, provider } => {
            let text = text.to_lowercase();
            classify_transport("", &text)
                .or_else(|| {
                    provider
                        .as_deref()
                        .and_then(|p| classify_provider_text(ProviderFamily::from_name(p), &text))
                })
                .unwrap_or(ErrorKind::Unknown)
        }
        RawFailure::Timeout { .. } => ErrorKind::Timeout,
        RawFailure::Unavailable { .. } => ErrorKind::ProviderUnavailable,
    }
}

fn classify_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::AuthenticationError,
        404 => ErrorKind::ModelNotFound,
        429 => ErrorKind::RateLimit,
        400..=499 => ErrorKind::InvalidRequest,
        500.. => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    }
}

/// `code` and `message` must already be lowercase
fn classify_transport(code: &str, message: &str) -> Option<ErrorKind> {
    if code == "etimedout"
        || code == "timeout"
        || message.contains("timeout")
        || message.contains("timed out")
    {
        return Some(ErrorKind::Timeout);
    }

    if matches!(code, "econnrefused" | "econnreset" | "enotfound")
        || message.contains("connection")
        || message.contains("network")
    {
        return Some(ErrorKind::ConnectionError);
    }

    if code.starts_with('e') || message.contains("internet") {
        return Some(ErrorKind::NetworkError);
    }

    None
}

/// `text` must already be lowercase
fn classify_provider_text(family: ProviderFamily, text: &str) -> Option<ErrorKind> {
    let has = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    match family {
        ProviderFamily::OpenAi => {
            if has(&["rate limit", "rate_limit"]) {
                Some(ErrorKind::RateLimit)
            } else if has(&["api key", "authentication"]) {
                Some(ErrorKind::AuthenticationError)
            } else if has(&["model"]) {
                Some(ErrorKind::ModelNotFound)
            } else if has(&["content filter"]) {
                Some(ErrorKind::ContentFilter)
            } else if has(&["context length", "token"]) {
                Some(ErrorKind::ContextLengthExceeded)
            } else if has(&["invalid_request"]) {
                Some(ErrorKind::InvalidRequest)
            } else if has(&["server_error", "server error"]) {
                Some(ErrorKind::ServerError)
            } else {
                None
            }
        }
        ProviderFamily::Anthropic => {
            if has(&["rate limit", "quota"]) {
                Some(ErrorKind::RateLimit)
            } else if has(&["api key", "auth"]) {
                Some(ErrorKind::AuthenticationError)
            } else if has(&["model"]) {
                Some(ErrorKind::ModelNotFound)
            } else if has(&["content", "policy"]) {
                Some(ErrorKind::ContentFilter)
            } else if has(&["context", "token"]) {
                Some(ErrorKind::ContextLengthExceeded)
            } else {
                None
            }
        }
        ProviderFamily::LocalRuntime => {
            if has(&["not found", "no model"]) {
                Some(ErrorKind::ModelNotFound)
            } else if has(&["server", "internal"]) {
                Some(ErrorKind::ServerError)
            } else {
                None
            }
        }
        ProviderFamily::Other => None,
    }
}
