//! Provider contract and shared request/result types
//!
//! Concrete wire clients live outside this crate; they implement [`Provider`]
//! and are usually wrapped in a [`QueuedProvider`](crate::core::dispatcher::QueuedProvider)
//! before registration.

pub mod provider;
pub mod quality;
pub mod registry;
pub mod simulated;
pub mod types;

pub use provider::Provider;
pub use quality::quality_score;
pub use registry::ProviderRegistry;
pub use simulated::SimulatedProvider;
pub use types::{Completion, CompletionOptions, CompletionRequest, CompletionResult, ProviderStatus};
