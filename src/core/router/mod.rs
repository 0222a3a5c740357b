//! Provider ranking and selection
//!
//! - `score`: pure scoring functions over health snapshots
//! - `strategy`: the selection strategy enum and the shared round-robin cursor
//! - `selection`: `ProviderSelector`, which filters, scores and picks providers

pub mod score;
pub mod selection;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use score::{availability_score, provider_score};
pub use selection::ProviderSelector;
pub use strategy::{RoundRobinCursor, SelectionStrategy};
