//! HTTP content fetcher
//!
//! Downloads each article's URL with a bounded number of requests in flight.
//! Articles that already carry content are passed through without a request.

use super::ContentFetcher;
use crate::adapters::http_client;
use crate::config::{FetcherConfig, RetryConfig};
use crate::domain::{DownloadableArticle, FetchError, FetchedArticle, Result};
use crate::log_retry_attempt;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Fetches article bodies over HTTP(S)
///
/// # Example
///
/// ```no_run
/// use article_archiver::adapters::fetcher::HttpContentFetcher;
/// use article_archiver::config::FetcherConfig;
///
/// let fetcher = HttpContentFetcher::new(&FetcherConfig::default()).unwrap();
/// ```
pub struct HttpContentFetcher {
    client: Client,
    concurrency: usize,
    retry: RetryConfig,
}

impl HttpContentFetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the HTTP client cannot be built
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = http_client(config.timeout_seconds, &config.user_agent)?;
        Ok(Self {
            client,
            concurrency: config.concurrency.max(1),
            retry: config.retry.clone(),
        })
    }

    async fn fetch_one(&self, article: DownloadableArticle) -> Result<FetchedArticle> {
        if article.content.as_deref().is_some_and(|c| !c.is_empty()) {
            tracing::trace!(article_id = %article.id, "Reusing cached content");
            return Ok(FetchedArticle::try_from(article)?);
        }

        let url = parse_source(&article)?;
        let body = self.retry_request(|| self.get_text(&url)).await?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyContent(article.id.to_string()).into());
        }

        tracing::debug!(
            article_id = %article.id,
            bytes = body.len(),
            "Article content fetched"
        );
        Ok(FetchedArticle::from_parts(article, body))
    }

    async fn get_text(&self, url: &Url) -> std::result::Result<String, FetchError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.text()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }

    /// Retry a request with exponential backoff
    ///
    /// Only connection failures, timeouts, 429 and 5xx responses are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> std::result::Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, FetchError>>,
    {
        let max_attempts = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_attempts || !is_transient(&e) {
                        return Err(e);
                    }

                    let delay_ms = self.retry.delay_ms(attempt);
                    log_retry_attempt!(attempt, max_attempts, &e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_all(
        &self,
        articles: Vec<DownloadableArticle>,
        on_progress: &(dyn Fn(usize) + Send + Sync),
    ) -> Result<Vec<FetchedArticle>> {
        let total = articles.len();
        let mut fetched = Vec::with_capacity(total);

        let mut results = stream::iter(articles)
            .map(|article| self.fetch_one(article))
            .buffered(self.concurrency);

        while let Some(result) = results.next().await {
            fetched.push(result?);
            on_progress(fetched.len());
        }

        tracing::info!(count = fetched.len(), "Fetched article content");
        Ok(fetched)
    }
}

fn parse_source(article: &DownloadableArticle) -> std::result::Result<Url, FetchError> {
    let url = Url::parse(&article.url).map_err(|e| {
        FetchError::InvalidSource(format!("article {} has URL '{}': {e}", article.id, article.url))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidSource(format!(
            "article {} uses unsupported scheme '{other}'",
            article.id
        ))),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else {
        FetchError::ConnectionFailed(e.to_string())
    }
}

fn is_transient(error: &FetchError) -> bool {
    match error {
        FetchError::ConnectionFailed(_) | FetchError::Timeout(_) => true,
        FetchError::HttpStatus { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        _ => false,
    }
}
