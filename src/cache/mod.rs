//! Generic in-memory response cache.
//!
//! This module knows nothing about Raindrop. It provides:
//! - A [`QueryKey`] trait for turning a request shape into a stable key
//! - Pluggable storage (in-memory, or no-op when caching is disabled)
//! - A TTL-checking [`ResponseCache`] on top of the storage

mod layer;
mod storage;
mod traits;

pub use layer::ResponseCache;
pub use storage::{MemoryStorage, NoopStorage};
pub use traits::QueryKey;
