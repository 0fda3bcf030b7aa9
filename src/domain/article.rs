//! Article domain models
//!
//! [`DownloadableArticle`] is what callers hand to the pipeline; [`FetchedArticle`]
//! is the same article once its content is guaranteed to be present.

use super::errors::FetchError;
use super::ids::ArticleId;
use serde::{Deserialize, Deserializer, Serialize};

/// An article to export
///
/// The content slot starts empty for articles that still need fetching. Articles
/// that were cached earlier may arrive with content already populated; fetchers
/// reuse it as-is.
///
/// # Examples
///
/// ```
/// use article_archiver::domain::{ArticleId, DownloadableArticle};
///
/// let article = DownloadableArticle::new(
///     ArticleId::new("a-1").unwrap(),
///     "Release notes 1.2",
///     "https://blog.example.com/posts/a-1",
///     1_700_000_000,
/// );
/// assert!(article.content.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadableArticle {
    /// Article identifier
    pub id: ArticleId,

    /// Title; may contain path-hostile characters
    pub title: String,

    /// Where the full content lives
    #[serde(default)]
    pub url: String,

    /// Publish time in seconds since the Unix epoch
    #[serde(deserialize_with = "deserialize_epoch_seconds")]
    pub published_at: i64,

    /// Fetched content, absent until retrieved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl DownloadableArticle {
    /// Creates an article descriptor without content
    pub fn new(
        id: ArticleId,
        title: impl Into<String>,
        url: impl Into<String>,
        published_at: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            url: url.into(),
            published_at,
            content: None,
        }
    }

    /// Populates the content slot
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// An article whose content has been retrieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedArticle {
    /// Article identifier
    pub id: ArticleId,

    /// Title as supplied by the caller
    pub title: String,

    /// Source URL
    pub url: String,

    /// Publish time in seconds since the Unix epoch
    pub published_at: i64,

    /// Raw article body
    pub content: String,
}

impl FetchedArticle {
    /// Builds a fetched article from a descriptor and its retrieved body
    pub fn from_parts(article: DownloadableArticle, content: String) -> Self {
        Self {
            id: article.id,
            title: article.title,
            url: article.url,
            published_at: article.published_at,
            content,
        }
    }
}

impl TryFrom<DownloadableArticle> for FetchedArticle {
    type Error = FetchError;

    fn try_from(mut article: DownloadableArticle) -> Result<Self, Self::Error> {
        match article.content.take() {
            Some(content) if !content.is_empty() => Ok(Self::from_parts(article, content)),
            _ => Err(FetchError::MissingContent(article.id.into_inner())),
        }
    }
}

/// Accepts the publish time as a JSON integer or as a numeric string
///
/// Article manifests in the wild carry both forms; both normalize to `i64` here.
fn deserialize_epoch_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EpochSeconds {
        Int(i64),
        Text(String),
    }

    match EpochSeconds::deserialize(deserializer)? {
        EpochSeconds::Int(value) => Ok(value),
        EpochSeconds::Text(text) => text.trim().parse::<i64>().map_err(|_| {
            serde::de::Error::custom(format!(
                "published_at must be whole seconds since epoch, got '{text}'"
            ))
        }),
    }
}
