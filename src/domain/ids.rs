//! Domain identifier types with validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Article identifier newtype wrapper
///
/// Identifiers are opaque to the archiver; they only need to be non-empty so
/// that log lines and error messages can point at a specific article.
///
/// # Examples
///
/// ```
/// use article_archiver::domain::ids::ArticleId;
/// use std::str::FromStr;
///
/// let id = ArticleId::from_str("2247483901_1").unwrap();
/// assert_eq!(id.as_str(), "2247483901_1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleId(String);

impl ArticleId {
    /// Creates a new ArticleId from a string
    ///
    /// # Errors
    ///
    /// Returns `Err` if the identifier is empty or whitespace only
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Article ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the article ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArticleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArticleId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ArticleId> for String {
    fn from(id: ArticleId) -> Self {
        id.0
    }
}

impl AsRef<str> for ArticleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
