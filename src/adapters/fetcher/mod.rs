//! Content retrieval
//!
//! A [`ContentFetcher`] turns article descriptors into articles with content.

pub mod http;

pub use http::HttpContentFetcher;

use crate::domain::{DownloadableArticle, FetchedArticle, Result};
use async_trait::async_trait;

/// Retrieves full content for a set of articles
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch content for every article
    ///
    /// `on_progress` is called with the number of completed articles after each
    /// completion. Reported counts strictly increase and end at `articles.len()`.
    /// The result keeps input order and holds exactly one entry per input.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any single article cannot be retrieved.
    async fn fetch_all(
        &self,
        articles: Vec<DownloadableArticle>,
        on_progress: &(dyn Fn(usize) + Send + Sync),
    ) -> Result<Vec<FetchedArticle>>;
}
