//! Cache keys for Raindrop requests.

use sha2::{Digest, Sha256};

use crate::cache::QueryKey;

use super::types::RequestDescriptor;

impl QueryKey for RequestDescriptor {
  /// Only fields that change the upstream request take part; `layout` and
  /// pass-through keys do not.
  fn cache_hash(&self) -> String {
    // `search` goes last so an arbitrary term cannot shift the numeric fields
    let search = match &self.search {
      Some(term) => format!("={}", term),
      None => "-".to_string(),
    };
    let collection = self
      .collection_id
      .map(|id| id.to_string())
      .unwrap_or_else(|| "all".to_string());

    let input = format!(
      "{}:{}:{}:{}:{}",
      self.kind, collection, self.page, self.per_page, search
    );

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    let scope = match self.collection_id {
      Some(id) => format!("collection {}", id),
      None => "all collections".to_string(),
    };
    match &self.search {
      Some(term) => format!(
        "{} in {} matching '{}' (page {}, {} per page)",
        self.kind, scope, term, self.page, self.per_page
      ),
      None => format!(
        "{} in {} (page {}, {} per page)",
        self.kind, scope, self.page, self.per_page
      ),
    }
  }
}
