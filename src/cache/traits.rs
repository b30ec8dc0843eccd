//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Trait for request shapes that can be used as cache keys.
pub trait QueryKey {
  /// Stable, fixed-length key. Equal keys must mean equal upstream requests.
  fn cache_hash(&self) -> String;

  /// Human readable description for logging
  fn description(&self) -> String;
}

/// One stored response. Never mutated; a newer fetch replaces it wholesale.
#[derive(Debug)]
pub struct CacheEntry<T> {
  pub data: Arc<T>,
  pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
  pub fn new(data: Arc<T>) -> Self {
    Self::stored_at(data, Utc::now())
  }

  pub fn stored_at(data: Arc<T>, stored_at: DateTime<Utc>) -> Self {
    Self { data, stored_at }
  }
}

impl<T> Clone for CacheEntry<T> {
  fn clone(&self) -> Self {
    Self {
      data: Arc::clone(&self.data),
      stored_at: self.stored_at,
    }
  }
}
