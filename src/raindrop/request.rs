//! Mapping from descriptors to concrete REST requests.

use url::Url;

use super::error::{Error, Result};
use super::types::{Kind, RequestDescriptor, MAX_PER_PAGE};

/// A relative endpoint plus ordered query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
  pub endpoint: String,
  pub query: Vec<(String, String)>,
}

impl ApiRequest {
  fn new(endpoint: impl Into<String>) -> Self {
    Self {
      endpoint: endpoint.into(),
      query: Vec::new(),
    }
  }

  fn param(mut self, key: &str, value: impl ToString) -> Self {
    self.query.push((key.to_string(), value.to_string()));
    self
  }

  /// Resolve against the API base, e.g. `https://api.raindrop.io/rest/v1`.
  pub fn url(&self, base: &Url) -> Result<Url> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), self.endpoint);
    let mut url = Url::parse(&joined).map_err(|e| Error::MalformedDescriptor(e.to_string()))?;

    if !self.query.is_empty() {
      url.query_pairs_mut().extend_pairs(&self.query);
    }

    Ok(url)
  }
}

/// Build the request for a descriptor. Pure; no I/O.
pub fn build(descriptor: &RequestDescriptor) -> Result<ApiRequest> {
  let per_page = checked_per_page(descriptor.per_page)?;
  let collection = descriptor.collection_id.unwrap_or(0);

  let request = match descriptor.kind {
    Kind::Collections => ApiRequest::new("/collections"),
    Kind::Search => ApiRequest::new(format!("/raindrops/{}", collection))
      .param("search", descriptor.search.as_deref().unwrap_or(""))
      .param("page", descriptor.page)
      .param("perpage", per_page),
    Kind::User => ApiRequest::new("/user"),
    Kind::Bookmarks => {
      let request = ApiRequest::new(format!("/raindrops/{}", collection))
        .param("page", descriptor.page)
        .param("perpage", per_page);

      match descriptor.search.as_deref() {
        Some(search) if !search.is_empty() => request.param("search", search),
        _ => request,
      }
    }
  };

  Ok(request)
}

fn checked_per_page(per_page: u32) -> Result<u32> {
  if (1..=MAX_PER_PAGE).contains(&per_page) {
    Ok(per_page)
  } else {
    Err(Error::MalformedDescriptor(format!(
      "perpage must be between 1 and {}, got {}",
      MAX_PER_PAGE, per_page
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::raindrop::types::BlockDefaults;
  use pretty_assertions::assert_eq;

  fn descriptor(kind: Kind) -> RequestDescriptor {
    RequestDescriptor::new(kind, BlockDefaults::default())
  }

  fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn test_collections_have_no_query() {
    let request = build(&descriptor(Kind::Collections).with_search("ignored")).unwrap();
    assert_eq!(request.endpoint, "/collections");
    assert!(request.query.is_empty());
  }

  #[test]
  fn test_user_profile_endpoint() {
    let request = build(&descriptor(Kind::User)).unwrap();
    assert_eq!(request.endpoint, "/user");
    assert!(request.query.is_empty());
  }

  #[test]
  fn test_search_without_term_sends_empty_search() {
    let request = build(&descriptor(Kind::Search)).unwrap();
    assert_eq!(request.endpoint, "/raindrops/0");
    assert_eq!(
      request.query,
      pairs(&[("search", ""), ("page", "0"), ("perpage", "20")])
    );
  }

  #[test]
  fn test_search_scoped_to_collection() {
    let mut d = descriptor(Kind::Search).with_search("rust").with_page(2);
    d.collection_id = Some(42);
    let request = build(&d).unwrap();
    assert_eq!(request.endpoint, "/raindrops/42");
    assert_eq!(
      request.query,
      pairs(&[("search", "rust"), ("page", "2"), ("perpage", "20")])
    );
  }

  #[test]
  fn test_bookmarks_append_search_only_when_present() {
    let request = build(&descriptor(Kind::Bookmarks)).unwrap();
    assert_eq!(request.endpoint, "/raindrops/0");
    assert_eq!(request.query, pairs(&[("page", "0"), ("perpage", "20")]));

    let request = build(&descriptor(Kind::Bookmarks).with_search("")).unwrap();
    assert_eq!(request.query, pairs(&[("page", "0"), ("perpage", "20")]));

    let request = build(&descriptor(Kind::Bookmarks).with_search("tokio")).unwrap();
    assert_eq!(
      request.query,
      pairs(&[("page", "0"), ("perpage", "20"), ("search", "tokio")])
    );
  }

  #[test]
  fn test_build_is_deterministic() {
    let mut d = descriptor(Kind::Search).with_search("a b&c").with_page(7);
    d.collection_id = Some(9);
    assert_eq!(build(&d).unwrap(), build(&d.clone()).unwrap());
  }

  #[test]
  fn test_out_of_range_per_page_is_malformed() {
    let mut d = descriptor(Kind::Bookmarks);
    d.per_page = 0;
    assert!(matches!(build(&d), Err(Error::MalformedDescriptor(_))));
    d.per_page = 51;
    assert!(matches!(build(&d), Err(Error::MalformedDescriptor(_))));
  }

  #[test]
  fn test_url_encodes_query() {
    let base = Url::parse("https://api.raindrop.io/rest/v1/").unwrap();
    let request = build(&descriptor(Kind::Search).with_search("a b")).unwrap();
    let url = request.url(&base).unwrap();
    assert_eq!(
      url.as_str(),
      "https://api.raindrop.io/rest/v1/raindrops/0?search=a+b&page=0&perpage=20"
    );
  }
}
