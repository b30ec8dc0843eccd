//! Locating `raindrop` blocks and inline links in a markdown document.

/// What a snippet found in a document asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snippet {
  /// Body of a ```raindrop fenced block
  Block(String),
  /// Body of a ```raindrop-search fenced block
  SearchBlock(String),
  /// Target of a markdown link such as `[x](raindrop:collection/5)`
  InlineLink(String),
}

/// A snippet and the 1-based line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
  pub line: usize,
  pub snippet: Snippet,
}

struct OpenFence {
  marker: &'static str,
  line: usize,
  search: bool,
  body: Vec<String>,
}

/// Every snippet in document order. An unterminated fence runs to the end
/// of the document.
pub fn extract(markdown: &str) -> Vec<Located> {
  let mut found = Vec::new();
  let mut open: Option<OpenFence> = None;
  // Fences with other languages; their contents are skipped
  let mut foreign: Option<&'static str> = None;

  for (index, line) in markdown.lines().enumerate() {
    let line_no = index + 1;
    let trimmed = line.trim_start();

    if let Some(marker) = foreign {
      if trimmed.starts_with(marker) && trimmed.trim_start_matches(marker).trim().is_empty() {
        foreign = None;
      }
      continue;
    }

    if let Some(fence) = open.as_mut() {
      if trimmed.starts_with(fence.marker)
        && trimmed.trim_start_matches(fence.marker).trim().is_empty()
      {
        if let Some(fence) = open.take() {
          found.push(close(fence));
        }
      } else {
        fence.body.push(line.to_string());
      }
      continue;
    }

    if let Some((marker, info)) = fence_start(trimmed) {
      match info {
        "raindrop" | "raindrop-search" => {
          open = Some(OpenFence {
            marker,
            line: line_no,
            search: info == "raindrop-search",
            body: Vec::new(),
          });
        }
        _ => foreign = Some(marker),
      }
      continue;
    }

    found.extend(inline_links(line).map(|href| Located {
      line: line_no,
      snippet: Snippet::InlineLink(href.to_string()),
    }));
  }

  if let Some(fence) = open {
    found.push(close(fence));
  }

  found
}

fn close(fence: OpenFence) -> Located {
  let body = fence.body.join("\n");
  Located {
    line: fence.line,
    snippet: if fence.search {
      Snippet::SearchBlock(body)
    } else {
      Snippet::Block(body)
    },
  }
}

/// Fence marker and info string (first word) of an opening fence line
fn fence_start(trimmed: &str) -> Option<(&'static str, &str)> {
  let marker = ["```", "~~~"]
    .into_iter()
    .find(|m| trimmed.starts_with(m))?;
  let info = trimmed
    .trim_start_matches(marker)
    .split_whitespace()
    .next()
    .unwrap_or_default();
  Some((marker, info))
}

/// `raindrop:` targets of markdown links on one line
fn inline_links(line: &str) -> impl Iterator<Item = &str> {
  line.match_indices("](raindrop:").filter_map(move |(start, _)| {
    let href_start = start + 2;
    let rest = &line[href_start..];
    rest.find(')').map(|end| &rest[..end])
  })
}
