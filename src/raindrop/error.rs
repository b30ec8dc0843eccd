//! Error type shared by the parser, request builder and fetch layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the Raindrop fetch pipeline.
///
/// `Clone` is required so that one in-flight request can hand the same
/// outcome to every caller waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
  #[error("API token is required. Set RAINDROP_TOKEN or api.token in the config file.")]
  MissingCredential,

  #[error("Invalid API token. Please check your settings.")]
  Unauthorized,

  #[error("API error: {status} {status_text}")]
  Upstream { status: u16, status_text: String },

  #[error("Malformed request descriptor: {0}")]
  MalformedDescriptor(String),

  #[error("Network failure: {0}")]
  NetworkFailure(String),

  #[error("Invalid response body: {0}")]
  InvalidResponse(String),

  #[error("Invalid value for '{key}': '{value}' ({reason})")]
  InvalidBlock {
    key: String,
    value: String,
    reason: &'static str,
  },

  #[error("Invalid Raindrop link: {0}")]
  InvalidLink(String),

  /// Bulk fetch needed more pages than the configured safety limit.
  #[error("Gave up after {limit} pages; the bookmark list did not end")]
  PaginationLimitExceeded { limit: u32 },
}

impl From<reqwest::Error> for Error {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::InvalidResponse(err.to_string())
    } else {
      Self::NetworkFailure(err.to_string())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_upstream_message_includes_status() {
    let err = Error::Upstream {
      status: 503,
      status_text: "Service Unavailable".to_string(),
    };
    assert_eq!(err.to_string(), "API error: 503 Service Unavailable");
  }

  #[test]
  fn test_invalid_block_names_key_and_value() {
    let err = Error::InvalidBlock {
      key: "page".to_string(),
      value: "abc".to_string(),
      reason: "expected a non-negative integer",
    };
    let msg = err.to_string();
    assert!(msg.contains("'page'"));
    assert!(msg.contains("'abc'"));
  }
}
