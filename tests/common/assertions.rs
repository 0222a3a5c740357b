//! Custom test assertions

use llm_relay::{ErrorKind, GatewayResponse};

/// Assertions for GatewayResponse
pub trait ResponseAssertions {
    /// Assert the response succeeded and came from `provider`
    fn assert_served_by(&self, provider: &str);

    /// Assert the response failed with `kind`
    fn assert_failed_with(&self, kind: ErrorKind);
}

impl ResponseAssertions for GatewayResponse {
    fn assert_served_by(&self, provider: &str) {
        assert!(
            self.success,
            "Expected success from {}, got {:?}: {:?}",
            provider, self.error_kind, self.error
        );
        assert_eq!(self.provider, provider, "Served by the wrong provider");
        assert!(self.error_kind.is_none());
    }

    fn assert_failed_with(&self, kind: ErrorKind) {
        assert!(!self.success, "Expected failure {:?}, got success", kind);
        assert_eq!(self.error_kind, Some(kind));
        assert!(self.error.is_some(), "Failure without a message");
    }
}
