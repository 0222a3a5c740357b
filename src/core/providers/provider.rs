//! Backend provider contract

use super::types::{Completion, CompletionRequest, ProviderStatus};
use crate::core::classifier::RawFailure;
use async_trait::async_trait;

/// A backend able to produce completions.
///
/// Implementations report failures as [`RawFailure`]; the gateway classifies
/// them and never lets them reach callers as errors.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used in model and priority tables
    fn name(&self) -> &str;

    /// Run one completion
    async fn invoke(&self, request: &CompletionRequest) -> Result<Completion, RawFailure>;

    /// Whether the backend is worth calling right now; may probe the network
    async fn is_available(&self) -> bool {
        true
    }

    /// Models the backend can serve, used as a lightweight liveness probe
    async fn list_models(&self) -> Result<Vec<String>, RawFailure> {
        Ok(Vec::new())
    }

    /// Dispatcher statistics, when the provider is wrapped by one
    fn status(&self) -> Option<ProviderStatus> {
        None
    }
}
