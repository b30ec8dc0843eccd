//! Cached Raindrop client that wraps RaindropClient with transparent caching.

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::cache::{MemoryStorage, NoopStorage, QueryKey, ResponseCache};
use crate::config::Config;

use super::api_types::list_items;
use super::client::RaindropClient;
use super::error::{Error, Result};
use super::request;
use super::types::{RequestDescriptor, MAX_PER_PAGE};

type PendingFetch = Shared<BoxFuture<'static, Result<Arc<Value>>>>;

/// Requests currently on the wire, by cache key
type InFlight = Arc<Mutex<HashMap<String, PendingFetch>>>;

/// Default upper bound on pages walked by [`CachedRaindropClient::fetch_all`]
pub const DEFAULT_MAX_PAGES: u32 = 200;

/// Raindrop client with a TTL response cache.
///
/// Concurrent fetches of the same uncached request share one upstream call.
#[derive(Clone)]
pub struct CachedRaindropClient {
  inner: RaindropClient,
  cache: ResponseCache<Value>,
  in_flight: InFlight,
  max_pages: u32,
}

impl CachedRaindropClient {
  /// Create a new cached client from configuration.
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let inner = RaindropClient::new(config)?;
    let cache = if config.cache.enabled {
      ResponseCache::new(MemoryStorage::new())
    } else {
      ResponseCache::new(NoopStorage)
    };
    let cache = cache.with_stale_time(config.cache.ttl()?);

    Ok(Self::with_cache(inner, cache).with_max_pages(config.fetch_all.max_pages))
  }

  pub fn with_cache(inner: RaindropClient, cache: ResponseCache<Value>) -> Self {
    Self {
      inner,
      cache,
      in_flight: Arc::new(Mutex::new(HashMap::new())),
      max_pages: DEFAULT_MAX_PAGES,
    }
  }

  /// Safety limit for `fetch_all`
  pub fn with_max_pages(mut self, max_pages: u32) -> Self {
    self.max_pages = max_pages;
    self
  }

  /// Fetch the response for a descriptor, from cache when fresh.
  pub async fn fetch(&self, descriptor: &RequestDescriptor) -> Result<Arc<Value>> {
    if !self.inner.has_token() {
      return Err(Error::MissingCredential);
    }

    let key = descriptor.cache_hash();
    if let Some(body) = self.cache.get(&key) {
      debug!("cache hit: {}", descriptor.description());
      return Ok(body);
    }

    let request = request::build(descriptor)?;
    let pending = {
      let mut in_flight = lock(&self.in_flight);
      match in_flight.get(&key) {
        Some(pending) => {
          debug!("joining in-flight request: {}", descriptor.description());
          pending.clone()
        }
        None => {
          debug!("cache miss: {}", descriptor.description());
          let pending = self.start_fetch(key.clone(), request);
          in_flight.insert(key, pending.clone());
          pending
        }
      }
    };

    pending.await
  }

  fn start_fetch(&self, key: String, request: request::ApiRequest) -> PendingFetch {
    let inner = self.inner.clone();
    let cache = self.cache.clone();
    let in_flight = Arc::clone(&self.in_flight);

    async move {
      let result = inner.get(&request).await.map(Arc::new);
      if let Ok(body) = &result {
        cache.put(&key, Arc::clone(body));
      }
      lock(&in_flight).remove(&key);
      result
    }
    .boxed()
    .shared()
  }

  /// Fetch every bookmark across all collections, page by page.
  ///
  /// Stops at the first page holding fewer than 50 items. Fails with
  /// `PaginationLimitExceeded` instead of walking past `max_pages`.
  pub async fn fetch_all(&self) -> Result<Vec<Value>> {
    let mut all_items = Vec::new();

    for page in 0..self.max_pages {
      let body = self
        .fetch(&RequestDescriptor::all_bookmarks_page(page))
        .await?;
      let items = list_items(&body);
      all_items.extend_from_slice(items);

      debug!("fetched page {} ({} items)", page, items.len());

      if items.len() < MAX_PER_PAGE as usize {
        return Ok(all_items);
      }
    }

    Err(Error::PaginationLimitExceeded {
      limit: self.max_pages,
    })
  }
}

fn lock(in_flight: &InFlight) -> MutexGuard<'_, HashMap<String, PendingFetch>> {
  in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::raindrop::types::{BlockDefaults, Kind, Layout};
  use serde_json::json;
  use std::time::Duration;
  use url::Url;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn client(server: &MockServer) -> CachedRaindropClient {
    let base = Url::parse(&format!("{}/rest/v1", server.uri())).unwrap();
    let inner = RaindropClient::with_base_url(base, Some("token".to_string())).unwrap();
    CachedRaindropClient::with_cache(inner, ResponseCache::new(MemoryStorage::new()))
  }

  fn page_of(len: usize, page: u32) -> Value {
    let items: Vec<Value> = (0..len)
      .map(|i| json!({ "_id": page as usize * 1000 + i }))
      .collect();
    json!({ "result": true, "items": items })
  }

  async fn mount_page(server: &MockServer, page: u32, len: usize) {
    Mock::given(method("GET"))
      .and(path("/rest/v1/raindrops/0"))
      .and(query_param("page", page.to_string()))
      .and(query_param("perpage", "50"))
      .respond_with(ResponseTemplate::new(200).set_body_json(page_of(len, page)))
      .expect(1)
      .mount(server)
      .await;
  }

  fn bookmarks() -> RequestDescriptor {
    RequestDescriptor::new(Kind::Bookmarks, BlockDefaults::default())
  }

  #[test]
  fn test_new_rejects_out_of_range_ttl() {
    let mut config = Config::default();
    config.cache.ttl_secs = 100_000_000_000_000_000;
    assert!(CachedRaindropClient::new(&config).is_err());

    config.cache.ttl_secs = u64::MAX;
    assert!(CachedRaindropClient::new(&config).is_err());
  }

  #[tokio::test]
  async fn test_second_fetch_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/rest/v1/raindrops/0"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [1] })))
      .expect(1)
      .mount(&server)
      .await;

    let client = client(&server);
    let first = client.fetch(&bookmarks()).await.unwrap();
    let second = client.fetch(&bookmarks()).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
  }

  #[tokio::test]
  async fn test_layout_change_reuses_cached_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
      .expect(1)
      .mount(&server)
      .await;

    let client = client(&server);
    client.fetch(&bookmarks()).await.unwrap();

    let mut table = bookmarks();
    table.layout = Layout::Table;
    client.fetch(&table).await.unwrap();
  }

  #[tokio::test]
  async fn test_different_search_terms_fetch_separately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
      .expect(2)
      .mount(&server)
      .await;

    let client = client(&server);
    client.fetch(&bookmarks().with_search("rust")).await.unwrap();
    client.fetch(&bookmarks().with_search("go")).await.unwrap();
  }

  #[tokio::test]
  async fn test_concurrent_fetches_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(json!({ "items": [] }))
          .set_delay(Duration::from_millis(200)),
      )
      .expect(1)
      .mount(&server)
      .await;

    let client = client(&server);
    let d = bookmarks();
    let (a, b) = tokio::join!(client.fetch(&d), client.fetch(&d));
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert!(lock(&client.in_flight).is_empty());
  }

  #[tokio::test]
  async fn test_errors_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(500))
      .expect(2)
      .mount(&server)
      .await;

    let client = client(&server);
    for _ in 0..2 {
      let err = client.fetch(&bookmarks()).await.unwrap_err();
      assert!(matches!(err, Error::Upstream { status: 500, .. }));
    }
  }

  #[tokio::test]
  async fn test_401_surfaces_as_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(401))
      .mount(&server)
      .await;

    let err = client(&server).fetch(&bookmarks()).await.unwrap_err();
    assert_eq!(err, Error::Unauthorized);
  }

  #[tokio::test]
  async fn test_missing_token_fails_before_cache() {
    let base = Url::parse("http://127.0.0.1:9/rest/v1").unwrap();
    let inner = RaindropClient::with_base_url(base, None).unwrap();
    let client = CachedRaindropClient::with_cache(inner, ResponseCache::new(MemoryStorage::new()));

    let err = client.fetch(&bookmarks()).await.unwrap_err();
    assert_eq!(err, Error::MissingCredential);
  }

  #[tokio::test]
  async fn test_malformed_descriptor_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&server)
      .await;

    let mut d = bookmarks();
    d.per_page = 0;
    let err = client(&server).fetch(&d).await.unwrap_err();
    assert!(matches!(err, Error::MalformedDescriptor(_)));
  }

  #[tokio::test]
  async fn test_fetch_all_concatenates_pages() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 50).await;
    mount_page(&server, 1, 50).await;
    mount_page(&server, 2, 30).await;

    let items = client(&server).fetch_all().await.unwrap();
    assert_eq!(items.len(), 130);
    assert_eq!(items[0], json!({ "_id": 0 }));
    assert_eq!(items[50], json!({ "_id": 1000 }));
    assert_eq!(items[129], json!({ "_id": 2029 }));
  }

  #[tokio::test]
  async fn test_fetch_all_empty_first_page() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 0).await;

    let items = client(&server).fetch_all().await.unwrap();
    assert!(items.is_empty());
  }

  #[tokio::test]
  async fn test_fetch_all_gives_up_at_page_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_json(page_of(50, 0)))
      .expect(3)
      .mount(&server)
      .await;

    let err = client(&server).with_max_pages(3).fetch_all().await.unwrap_err();
    assert_eq!(err, Error::PaginationLimitExceeded { limit: 3 });
  }

  #[tokio::test]
  async fn test_fetch_all_fails_on_any_page_error() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 50).await;
    Mock::given(method("GET"))
      .and(query_param("page", "1"))
      .respond_with(ResponseTemplate::new(502))
      .mount(&server)
      .await;

    let err = client(&server).fetch_all().await.unwrap_err();
    assert!(matches!(err, Error::Upstream { status: 502, .. }));
  }
}
