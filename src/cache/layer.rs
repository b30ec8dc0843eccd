//! TTL cache layer over a storage backend.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use super::storage::CacheStorage;
use super::traits::CacheEntry;

/// Time-boxed response cache.
///
/// Entries older than the stale time read as absent. They are not evicted;
/// the next `put` for the same key replaces them.
pub struct ResponseCache<T> {
  storage: Arc<dyn CacheStorage<T>>,
  /// How long a stored response counts as fresh
  stale_time: Duration,
}

impl<T> ResponseCache<T> {
  /// Create a new cache with the given storage backend.
  pub fn new(storage: impl CacheStorage<T> + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: Duration::minutes(5),
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  fn is_fresh(&self, stored_at: DateTime<Utc>) -> bool {
    Utc::now() - stored_at < self.stale_time
  }

  /// Stored body for `key` if it is younger than the stale time.
  pub fn get(&self, key: &str) -> Option<Arc<T>> {
    self
      .storage
      .get(key)
      .filter(|entry| self.is_fresh(entry.stored_at))
      .map(|entry| entry.data)
  }

  /// Store `body` under `key` with a fresh timestamp.
  pub fn put(&self, key: &str, body: Arc<T>) {
    self.storage.store(key, CacheEntry::new(body));
  }
}

impl<T> Clone for ResponseCache<T> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      stale_time: self.stale_time,
    }
  }
}
