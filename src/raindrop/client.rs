use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;

use super::error::{Error, Result};
use super::request::ApiRequest;

/// Raindrop REST API client. One request per call, no retries.
#[derive(Clone)]
pub struct RaindropClient {
  http: reqwest::Client,
  base_url: Url,
  token: Option<String>,
}

impl RaindropClient {
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let base_url = Url::parse(&config.api.base_url).map_err(|e| {
      color_eyre::eyre::eyre!("Invalid API base URL {}: {}", config.api.base_url, e)
    })?;

    Self::with_base_url(base_url, config.api_token())
  }

  pub fn with_base_url(base_url: Url, token: Option<String>) -> color_eyre::Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("raindrop-blocks/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| color_eyre::eyre::eyre!("Failed to build HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      token: token.filter(|t| !t.trim().is_empty()),
    })
  }

  pub fn has_token(&self) -> bool {
    self.token.is_some()
  }

  /// Perform a GET and parse the JSON body.
  pub async fn get(&self, request: &ApiRequest) -> Result<Value> {
    let token = self.token.as_deref().ok_or(Error::MissingCredential)?;
    let url = request.url(&self.base_url)?;

    debug!("GET {}", url);

    let response = self
      .http
      .get(url)
      .header(AUTHORIZATION, format!("Bearer {}", token))
      .header(CONTENT_TYPE, "application/json")
      .send()
      .await?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
      return Err(Error::Unauthorized);
    }
    if !status.is_success() {
      return Err(Error::Upstream {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
      });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| Error::InvalidResponse(e.to_string()))
  }
}
