//! Error classification
//!
//! Turns heterogeneous backend failures into a small closed taxonomy and answers
//! two questions about each kind: can it be retried, and is it severe enough that
//! the same provider must not be tried again.

mod classify;
mod types;

pub use classify::{ProviderFamily, classify};
pub use types::{ErrorKind, RawFailure};
