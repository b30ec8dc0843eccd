//! Serde-deserializable views over Raindrop API responses.
//!
//! Response bodies are passed to the renderer untouched; these types only
//! cover the few fields the crate itself reads.

use serde::Deserialize;
use serde_json::Value;

/// The `items` array of a listing response. Missing or non-array reads as empty.
pub fn list_items(body: &Value) -> &[Value] {
  body
    .get("items")
    .and_then(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or_default()
}

/// Whether another page follows: this page was full and the upstream
/// `count` reaches past it.
pub fn has_more(body: &Value, page: u32, per_page: u32) -> bool {
  let total = body.get("count").and_then(Value::as_u64).unwrap_or(0);
  let shown = (u64::from(page) + 1) * u64::from(per_page);
  list_items(body).len() as u64 == u64::from(per_page) && shown < total
}

/// A single bookmark ("raindrop") as far as tag counting is concerned
#[derive(Debug, Deserialize)]
pub struct ApiRaindrop {
  #[serde(default)]
  pub tags: Vec<String>,
}

impl ApiRaindrop {
  /// `None` for items that don't have the expected shape.
  pub fn from_item(item: &Value) -> Option<Self> {
    Self::deserialize(item).ok()
  }
}
