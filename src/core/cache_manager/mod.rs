//! Response cache keyed by task type and input

pub mod manager;
pub mod types;


pub use manager::ResponseCache;
pub use types::{CacheEntry, CacheKey, CacheStats};
