//! Bounded-concurrency dispatch
//!
//! [`QueuedProvider`] wraps a backend so that at most `max_concurrent` calls
//! are in flight. Excess requests wait in a FIFO queue that is drained in
//! paced batches as slots free up. The wrapper also owns the per-backend
//! retry loop, the probe fast path and the cool-down gate.

mod queued;
mod types;

pub use queued::{QueuedProvider, retry_allowed};
