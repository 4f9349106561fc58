//! Article source clients.

pub mod pmc;

use async_trait::async_trait;
use neuromine_common::Result;

/// Interface the fetcher needs from a literature API.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// One page of identifiers matching `query`, starting at `offset`.
    async fn search_page(&self, query: &str, offset: usize, limit: usize) -> Result<Vec<String>>;

    /// The raw full-text document for one identifier.
    async fn fetch_document(&self, identifier: &str) -> Result<String>;
}
