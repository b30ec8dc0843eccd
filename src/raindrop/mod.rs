//! Raindrop.io integration: block parsing, request building and cached fetching.

mod api_types;
mod cache;
mod cached_client;
mod client;
mod error;
pub mod parser;
mod request;
mod types;

pub use api_types::{has_more, ApiRaindrop};
pub use cached_client::CachedRaindropClient;
#[cfg(test)]
pub use client::RaindropClient;
pub use error::Result;
pub use types::{BlockDefaults, Kind, Layout, RequestDescriptor};
