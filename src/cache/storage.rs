//! Cache storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::CacheEntry;

/// Trait for cache storage backends.
pub trait CacheStorage<T>: Send + Sync {
  /// Get the entry stored under `key`, fresh or not.
  fn get(&self, key: &str) -> Option<CacheEntry<T>>;

  /// Store an entry, replacing any previous one for `key`.
  fn store(&self, key: &str, entry: CacheEntry<T>);
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl<T> CacheStorage<T> for NoopStorage {
  fn get(&self, _key: &str) -> Option<CacheEntry<T>> {
    None // Always miss
  }

  fn store(&self, _key: &str, _entry: CacheEntry<T>) {
    // Discard
  }
}

/// Process-local storage. Lives as long as the client holding it.
pub struct MemoryStorage<T> {
  entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T> MemoryStorage<T> {
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
    }
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.entries().len()
  }

  // A poisoned map is still structurally valid: entries are swapped in whole.
  fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<T> Default for MemoryStorage<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Send + Sync> CacheStorage<T> for MemoryStorage<T> {
  fn get(&self, key: &str) -> Option<CacheEntry<T>> {
    self.entries().get(key).cloned()
  }

  fn store(&self, key: &str, entry: CacheEntry<T>) {
    self.entries().insert(key.to_string(), entry);
  }
}
