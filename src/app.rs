use color_eyre::{eyre::eyre, Result};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::chart;
use crate::config::{Config, DisplayConfig};
use crate::document::{self, Located, Snippet};
use crate::raindrop::{self, has_more, parser, CachedRaindropClient, Kind, RequestDescriptor};

/// Shortest search term worth sending upstream
const MIN_SEARCH_LEN: usize = 2;

/// Presentation settings forwarded to the renderer with every response
#[derive(Debug, Serialize)]
pub struct RenderSettings<'a> {
  pub grid_columns: u32,
  #[serde(flatten)]
  pub display: &'a DisplayConfig,
}

/// What a renderer receives for one block
#[derive(Debug, Serialize)]
pub struct BlockOutput<'a> {
  pub descriptor: RequestDescriptor,
  pub display: RenderSettings<'a>,
  pub data: Arc<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub has_more: Option<bool>,
}

/// One entry of a whole-document run. Failures become a message, not an abort.
#[derive(Debug, Serialize)]
pub struct DocumentEntry<'a> {
  pub line: usize,
  #[serde(flatten)]
  pub result: EntryResult<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryResult<'a> {
  Ok(BlockOutput<'a>),
  Error(String),
}

/// Trimmed search term, or an error when it is too short to send
fn search_term(query: &str) -> Result<&str> {
  let query = query.trim();
  if query.chars().count() < MIN_SEARCH_LEN {
    return Err(eyre!(
      "Search term must be at least {} characters",
      MIN_SEARCH_LEN
    ));
  }
  Ok(query)
}

/// Outcome of the tag-chart utility
#[derive(Debug, PartialEq, Eq)]
pub enum ChartOutcome {
  NoBookmarks,
  NoTags,
  Chart { block: String, tag_count: usize },
}

/// Main application state
pub struct App {
  /// Application configuration
  config: Config,

  /// Raindrop client
  raindrop: CachedRaindropClient,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let raindrop = CachedRaindropClient::new(&config)?;
    Ok(Self { config, raindrop })
  }

  #[cfg(test)]
  fn with_client(config: Config, raindrop: CachedRaindropClient) -> Self {
    Self { config, raindrop }
  }

  fn render_settings(&self) -> RenderSettings<'_> {
    RenderSettings {
      grid_columns: self.config.grid_columns,
      display: &self.config.display,
    }
  }

  async fn fetch(&self, descriptor: RequestDescriptor) -> raindrop::Result<BlockOutput<'_>> {
    let data = self.raindrop.fetch(&descriptor).await?;
    let more = (descriptor.kind == Kind::Search)
      .then(|| has_more(&data, descriptor.page, descriptor.per_page));

    Ok(BlockOutput {
      descriptor,
      display: self.render_settings(),
      data,
      has_more: more,
    })
  }

  /// Fetch a `raindrop` block, with optional page/search overrides.
  pub async fn block(
    &self,
    source: &str,
    page: Option<u32>,
    search: Option<String>,
  ) -> Result<BlockOutput<'_>> {
    let mut descriptor = parser::parse(source, self.config.block_defaults())?;
    if let Some(page) = page {
      descriptor = descriptor.with_page(page);
    }
    if let Some(search) = search {
      descriptor = descriptor.with_search(search);
    }
    Ok(self.fetch(descriptor).await?)
  }

  /// Run a search from a `raindrop-search` block.
  pub async fn search(&self, source: &str, query: &str, page: u32) -> Result<BlockOutput<'_>> {
    let query = search_term(query)?;
    let descriptor = parser::parse_search(source, self.config.block_defaults())?
      .with_search(query)
      .with_page(page);
    Ok(self.fetch(descriptor).await?)
  }

  /// Fetch the target of a `raindrop:` inline link.
  pub async fn link(&self, href: &str) -> Result<BlockOutput<'_>> {
    let descriptor = parser::parse_inline_link(href)?;
    Ok(self.fetch(descriptor).await?)
  }

  /// Fetch every block and inline link of a document concurrently.
  ///
  /// `raindrop-search` blocks without a `search` key are reported as an
  /// error entry; they need a term to run.
  pub async fn document(&self, markdown: &str) -> Vec<DocumentEntry<'_>> {
    let located = document::extract(markdown);
    let fetches = located.into_iter().map(|Located { line, snippet }| async move {
      let result = match self.document_descriptor(snippet) {
        Ok(descriptor) => match self.fetch(descriptor).await {
          Ok(output) => EntryResult::Ok(output),
          Err(e) => EntryResult::Error(e.to_string()),
        },
        Err(e) => EntryResult::Error(e.to_string()),
      };
      DocumentEntry { line, result }
    });

    join_all(fetches).await
  }

  fn document_descriptor(&self, snippet: Snippet) -> Result<RequestDescriptor> {
    let defaults = self.config.block_defaults();
    match snippet {
      Snippet::Block(source) => Ok(parser::parse(&source, defaults)?),
      Snippet::SearchBlock(source) => {
        let descriptor = parser::parse_search(&source, defaults)?;
        let query = match descriptor.search.as_deref() {
          Some(query) => search_term(query)?.to_string(),
          None => return Err(eyre!("Search block has no search term")),
        };
        Ok(descriptor.with_search(query))
      }
      Snippet::InlineLink(href) => Ok(parser::parse_inline_link(&href)?),
    }
  }

  /// Every bookmark, optionally with a tag chart.
  pub async fn all(&self) -> Result<Value> {
    let items = self.raindrop.fetch_all().await?;
    let mut output = serde_json::json!({
      "count": items.len(),
    });

    if self.config.auto_generate_chart {
      output["chart"] = Value::from(chart::chart_block(&chart::tag_frequency(&items)));
    }
    output["items"] = Value::from(items);

    Ok(output)
  }

  /// Fetch all bookmarks and build the tag chart block.
  pub async fn tags_chart(&self) -> Result<ChartOutcome> {
    let items = self.raindrop.fetch_all().await?;
    if items.is_empty() {
      return Ok(ChartOutcome::NoBookmarks);
    }

    let frequency = chart::tag_frequency(&items);
    if frequency.is_empty() {
      return Ok(ChartOutcome::NoTags);
    }

    Ok(ChartOutcome::Chart {
      block: chart::chart_block(&frequency),
      tag_count: frequency.len(),
    })
  }
}
