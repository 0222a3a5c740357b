//! Router tests module


use crate::core::classifier::RawFailure;
use crate::core::providers::{Completion, CompletionRequest, Provider, ProviderStatus};
use async_trait::async_trait;

/// Provider that is never invoked; only its name and status matter here
pub(super) struct StubProvider {
    name: String,
    status: Option<ProviderStatus>,
}

impl StubProvider {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: None,
        }
    }

    pub(super) fn cooling_down(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: Some(ProviderStatus {
                is_available: false,
                consecutive_failures: 5,
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &CompletionRequest) -> Result<Completion, RawFailure> {
        Ok(Completion::new("stub", request.model.clone()))
    }

    fn status(&self) -> Option<ProviderStatus> {
        self.status.clone()
    }
}
