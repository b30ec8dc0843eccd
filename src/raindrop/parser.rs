//! Parsing of `raindrop` blocks and `raindrop:` inline links into descriptors.

use super::error::{Error, Result};
use super::types::{BlockDefaults, Kind, Layout, RequestDescriptor, MAX_PER_PAGE};

const INLINE_LINK_PREFIX: &str = "raindrop:";
const INLINE_LINK_PER_PAGE: u32 = 10;

/// Parse a `raindrop` block.
///
/// Lines are `key: value` pairs. Unknown keys pass through into
/// `RequestDescriptor::extra`; only the numeric keys are validated.
pub fn parse(raw: &str, defaults: BlockDefaults) -> Result<RequestDescriptor> {
  let mut descriptor = RequestDescriptor::new(Kind::Bookmarks, defaults);

  for (key, value) in block_pairs(raw) {
    match key {
      "type" => descriptor.kind = Kind::from_block_value(value),
      "layout" => descriptor.layout = Layout::parse(value).unwrap_or(defaults.layout),
      "page" => descriptor.page = parse_number(key, value)?,
      "perpage" => descriptor.per_page = parse_per_page(value)?,
      "search" => descriptor.search = Some(value.to_string()),
      "collection" => descriptor.collection_id = parse_collection(value)?,
      _ => {
        descriptor.extra.insert(key.to_string(), value.to_string());
      }
    }
  }

  Ok(descriptor)
}

/// Parse a `raindrop-search` block. Same keys as [`parse`], but the kind is
/// always `search`.
pub fn parse_search(raw: &str, defaults: BlockDefaults) -> Result<RequestDescriptor> {
  let mut descriptor = parse(raw, defaults)?;
  descriptor.kind = Kind::Search;
  Ok(descriptor)
}

/// Parse an inline link such as `raindrop:collection/123`.
///
/// Accepted targets: `bookmarks[/id]`, `collection/id`, `collections`, `user`.
pub fn parse_inline_link(href: &str) -> Result<RequestDescriptor> {
  let target = href
    .trim()
    .strip_prefix(INLINE_LINK_PREFIX)
    .ok_or_else(|| Error::InvalidLink(href.to_string()))?;

  let defaults = BlockDefaults {
    layout: Layout::Card,
    per_page: INLINE_LINK_PER_PAGE,
  };

  let mut parts = target.split('/');
  let head = parts.next().unwrap_or_default();
  let scope = parts.next().filter(|s| !s.is_empty());

  let mut descriptor = match head {
    "bookmarks" | "collection" => RequestDescriptor::new(Kind::Bookmarks, defaults),
    "collections" => RequestDescriptor::new(Kind::Collections, defaults),
    "user" => RequestDescriptor::new(Kind::User, defaults),
    _ => return Err(Error::InvalidLink(href.to_string())),
  };

  if descriptor.kind == Kind::Bookmarks {
    if let Some(id) = scope {
      descriptor.collection_id =
        parse_collection(id).map_err(|_| Error::InvalidLink(href.to_string()))?;
    }
  }

  Ok(descriptor)
}

/// Trimmed `key: value` pairs, skipping blank lines and empty keys or values.
fn block_pairs(raw: &str) -> impl Iterator<Item = (&str, &str)> {
  raw
    .lines()
    .filter_map(|line| line.split_once(':'))
    .map(|(key, value)| (key.trim(), value.trim()))
    .filter(|(key, value)| !key.is_empty() && !value.is_empty())
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
  value.parse().map_err(|_| Error::InvalidBlock {
    key: key.to_string(),
    value: value.to_string(),
    reason: "expected a non-negative integer",
  })
}

fn parse_per_page(value: &str) -> Result<u32> {
  match parse_number("perpage", value)? {
    0 => Err(Error::InvalidBlock {
      key: "perpage".to_string(),
      value: value.to_string(),
      reason: "must be at least 1",
    }),
    n => Ok(n.min(MAX_PER_PAGE)),
  }
}

/// `0` and `all` both mean every collection.
fn parse_collection(value: &str) -> Result<Option<u64>> {
  if value.eq_ignore_ascii_case("all") {
    return Ok(None);
  }

  match value.parse::<u64>() {
    Ok(0) => Ok(None),
    Ok(id) => Ok(Some(id)),
    Err(_) => Err(Error::InvalidBlock {
      key: "collection".to_string(),
      value: value.to_string(),
      reason: "expected a collection id or 'all'",
    }),
  }
}
