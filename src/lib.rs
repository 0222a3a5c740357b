//! # llm-relay
//!
//! Provider orchestration for heterogeneous LLM backends: health-aware
//! provider selection, failover across providers, bounded-concurrency
//! dispatch per backend and a response cache.
//!
//! ## Features
//!
//! - **Error classification**: backend failures map to one closed set of kinds,
//!   each either retryable, severe or neither
//! - **Health tracking**: a rescaled rolling window per provider
//! - **Selection strategies**: priority, performance, cost, load-balanced,
//!   round-robin and fallback
//! - **Failover**: bounded fallback loop with linear backoff
//! - **Dispatch**: per-provider concurrency caps with a paced FIFO queue
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_relay::{
//!     Config, DispatcherConfig, Gateway, ProviderRegistry, QueuedProvider, SimulatedProvider,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> llm_relay::Result<()> {
//!     let config = Config::from_file("config/relay.yaml").await?;
//!     let registry = ProviderRegistry::new()
//!         .with_provider(Arc::new(QueuedProvider::new(
//!             SimulatedProvider::new("ollama"),
//!             DispatcherConfig::default(),
//!         )));
//!
//!     let gateway = Gateway::new(&config.relay, registry);
//!     let response = gateway.process("code-generation", "Write a parser", None).await;
//!     println!("{} -> {}", response.provider, response.text);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::{Config, DispatcherConfig, RelayConfig};
pub use utils::error::{GatewayError, Result};

pub use core::cache_manager::{CacheKey, CacheStats, ResponseCache};
pub use core::classifier::{ErrorKind, RawFailure, classify};
pub use core::dispatcher::QueuedProvider;
pub use core::enhancer::{EnhancedOptions, GatewayEnhancer};
pub use core::gateway::{Gateway, GatewayResponse, GatewayState, ProcessOptions};
pub use core::health::{HealthMonitor, ProviderHealth};
pub use core::providers::{
    Completion, CompletionOptions, CompletionRequest, CompletionResult, Provider,
    ProviderRegistry, ProviderStatus, SimulatedProvider,
};
pub use core::router::{ProviderSelector, SelectionStrategy};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
