use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Largest page size the Raindrop API accepts.
pub const MAX_PER_PAGE: u32 = 50;

/// Which upstream view a block asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
  #[default]
  Bookmarks,
  Collections,
  User,
  Search,
}

impl Kind {
  /// Unknown values map to `Bookmarks`, the same fallback the request
  /// dispatch uses.
  pub fn from_block_value(value: &str) -> Self {
    match value.to_ascii_lowercase().as_str() {
      "collections" => Self::Collections,
      "user" => Self::User,
      "search" => Self::Search,
      _ => Self::Bookmarks,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Bookmarks => "bookmarks",
      Self::Collections => "collections",
      Self::User => "user",
      Self::Search => "search",
    }
  }
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Presentation layout requested by a block. Does not affect fetching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
  #[default]
  Card,
  Table,
}

impl Layout {
  pub fn parse(value: &str) -> Option<Self> {
    match value.to_ascii_lowercase().as_str() {
      "card" => Some(Self::Card),
      "table" => Some(Self::Table),
      _ => None,
    }
  }
}

/// Defaults applied to keys a block leaves out
#[derive(Debug, Clone, Copy)]
pub struct BlockDefaults {
  pub layout: Layout,
  pub per_page: u32,
}

impl Default for BlockDefaults {
  fn default() -> Self {
    Self {
      layout: Layout::Card,
      per_page: 20,
    }
  }
}

/// Normalized description of one requested data view.
///
/// `layout` and `extra` travel with the descriptor for the renderer but never
/// influence the upstream request or its cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
  pub kind: Kind,
  /// `None` means every collection (upstream id `0`)
  pub collection_id: Option<u64>,
  pub search: Option<String>,
  pub page: u32,
  pub per_page: u32,
  pub layout: Layout,
  /// Unrecognized block keys, kept verbatim
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub extra: BTreeMap<String, String>,
}

impl RequestDescriptor {
  pub fn new(kind: Kind, defaults: BlockDefaults) -> Self {
    Self {
      kind,
      collection_id: None,
      search: None,
      page: 0,
      per_page: defaults.per_page.min(MAX_PER_PAGE),
      layout: defaults.layout,
      extra: BTreeMap::new(),
    }
  }

  /// Descriptor for one page of the bulk "all bookmarks" listing
  pub fn all_bookmarks_page(page: u32) -> Self {
    Self {
      page,
      per_page: MAX_PER_PAGE,
      ..Self::new(Kind::Bookmarks, BlockDefaults::default())
    }
  }

  pub fn with_page(self, page: u32) -> Self {
    Self { page, ..self }
  }

  pub fn with_search(self, search: impl Into<String>) -> Self {
    Self {
      search: Some(search.into()),
      ..self
    }
  }
}
