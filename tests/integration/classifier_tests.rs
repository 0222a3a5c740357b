//! Error taxonomy tests through the public API

#[cfg(test)]
mod tests {
    use llm_relay::{ErrorKind, RawFailure, classify};

    const ALL_KINDS: [ErrorKind; 14] = [
        ErrorKind::NetworkError,
        ErrorKind::ConnectionError,
        ErrorKind::Timeout,
        ErrorKind::ServerError,
        ErrorKind::RateLimit,
        ErrorKind::AuthenticationError,
        ErrorKind::InvalidRequest,
        ErrorKind::ModelNotFound,
        ErrorKind::ModelUnavailable,
        ErrorKind::ContentFilter,
        ErrorKind::ContextLengthExceeded,
        ErrorKind::ProviderUnavailable,
        ErrorKind::AllProvidersFailed,
        ErrorKind::Unknown,
    ];

    /// No kind is both retryable and severe
    #[test]
    fn test_retryable_and_severe_are_disjoint() {
        for kind in ALL_KINDS {
            assert!(
                !(kind.is_retryable() && kind.is_severe()),
                "{} is both retryable and severe",
                kind
            );
        }
    }

    /// Every kind has a non-empty explanation and a stable name
    #[test]
    fn test_kind_descriptions() {
        for kind in ALL_KINDS {
            assert!(!kind.user_message().is_empty());
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    /// The same message means different things for different providers
    #[test]
    fn test_provider_vocabulary() {
        let text = "model overloaded, internal error";
        assert_eq!(
            classify(&RawFailure::from_provider("openai", text)),
            ErrorKind::ModelNotFound
        );
        assert_eq!(
            classify(&RawFailure::from_provider("ollama", text)),
            ErrorKind::ServerError
        );
        assert_eq!(classify(&RawFailure::message(text)), ErrorKind::Unknown);
    }

    /// Connection-level failures are retryable
    #[test]
    fn test_transport_failures_retryable() {
        let failures = [
            RawFailure::network("ECONNREFUSED", "connect refused"),
            RawFailure::network("ENOTFOUND", "dns lookup failed"),
            RawFailure::message("socket hang up: network unreachable"),
            RawFailure::http(502, "bad gateway"),
        ];
        for failure in failures {
            assert!(classify(&failure).is_retryable(), "{}", failure);
        }
    }
}
