use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::raindrop::{BlockDefaults, Layout};

const TOKEN_ENV: &str = "RAINDROP_TOKEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub default_layout: Layout,
  /// Card grid width, passed through to the renderer
  pub grid_columns: u32,
  pub items_per_page: u32,
  pub display: DisplayConfig,
  /// Attach a tag chart to `all` output
  pub auto_generate_chart: bool,
  pub cache: CacheConfig,
  pub fetch_all: FetchAllConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      default_layout: Layout::Card,
      grid_columns: 3,
      items_per_page: 20,
      display: DisplayConfig::default(),
      auto_generate_chart: false,
      cache: CacheConfig::default(),
      fetch_all: FetchAllConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token. RAINDROP_TOKEN takes precedence when set.
  pub token: Option<String>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.raindrop.io/rest/v1".to_string(),
      token: None,
    }
  }
}

/// Display toggles for the renderer. Not interpreted by the fetch layer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
  pub show_cover_images: bool,
  pub show_tags: bool,
  pub show_excerpts: bool,
  pub show_domain: bool,
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self {
      show_cover_images: true,
      show_tags: true,
      show_excerpts: false,
      show_domain: false,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  pub ttl_secs: u64,
}

impl CacheConfig {
  /// `ttl_secs` as a chrono duration
  pub fn ttl(&self) -> Result<chrono::Duration> {
    i64::try_from(self.ttl_secs)
      .ok()
      .and_then(chrono::Duration::try_seconds)
      .ok_or_else(|| eyre!("cache.ttl_secs is too large: {}", self.ttl_secs))
  }
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      ttl_secs: 300,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchAllConfig {
  /// Safety limit on pages walked when fetching every bookmark
  pub max_pages: u32,
}

impl Default for FetchAllConfig {
  fn default() -> Self {
    Self { max_pages: 200 }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./raindrop-blocks.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/raindrop-blocks/config.yaml
  ///
  /// Without any file every setting takes its default.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };
    config.validate()?;
    Ok(config)
  }

  /// Reject settings that would only fail later, at fetch time.
  fn validate(&self) -> Result<()> {
    if self.items_per_page == 0 {
      return Err(eyre!("items_per_page must be at least 1"));
    }
    if self.fetch_all.max_pages == 0 {
      return Err(eyre!("fetch_all.max_pages must be at least 1"));
    }
    self.cache.ttl()?;
    Ok(())
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("raindrop-blocks.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("raindrop-blocks").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file parses as null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Defaults for keys a block leaves out
  pub fn block_defaults(&self) -> BlockDefaults {
    BlockDefaults {
      layout: self.default_layout,
      per_page: self.items_per_page,
    }
  }

  /// Bearer token: RAINDROP_TOKEN first, then `api.token`.
  pub fn api_token(&self) -> Option<String> {
    std::env::var(TOKEN_ENV)
      .ok()
      .filter(|t| !t.trim().is_empty())
      .or_else(|| self.api.token.clone())
  }
}
