//! Utility modules for llm-relay
//!
//! - **error**: crate-level error type for configuration and setup paths
//! - **logging**: tracing subscriber installation

pub mod error;
pub mod logging;

pub use error::{GatewayError, Result};
pub use logging::init_logging;
