//! Gateway enhancer
//!
//! Threads an explicit selection strategy through to the gateway, supports
//! a preferred provider for the first attempt, injects faults for tests and
//! fans batches out concurrently.

#[allow(clippy::module_inception)]
mod enhancer;
mod options;

pub use enhancer::{GatewayEnhancer, TEST_PROVIDER};
pub use options::EnhancedOptions;
