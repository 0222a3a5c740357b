//! Request orchestration
//!
//! A request moves through cache lookup, provider selection and invocation.
//! A successful answer is cached. A retryable failure starts the fallback
//! loop and a non-retryable one is returned as is.

mod fallback;
mod process;
mod state;
mod types;

pub use process::Gateway;
pub use state::GatewayState;
pub use types::{AttemptSummary, GatewayResponse, NO_PROVIDER, ProcessOptions};
