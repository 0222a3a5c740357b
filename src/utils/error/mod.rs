//! Error handling for the relay
//!
//! Request processing never surfaces these errors to callers; failures there are
//! reported through `GatewayResponse`. `GatewayError` covers setup paths such as
//! configuration loading, validation and logging initialization.

mod helpers;
mod types;

pub use types::{GatewayError, Result};
