//! Core orchestration
//!
//! Leaves first: `classifier` and `health` know nothing about the rest,
//! `router` reads health snapshots, `gateway` combines selection, health and
//! classification, and `enhancer` wraps the gateway. `dispatcher` sits below
//! the gateway on each provider.

pub mod cache_manager;
pub mod classifier;
pub mod dispatcher;
pub mod enhancer;
pub mod gateway;
pub mod health;
pub mod providers;
pub mod router;
