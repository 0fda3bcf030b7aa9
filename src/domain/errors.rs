//! Domain error types
//!
//! This module defines the error hierarchy for the archiver. Collaborator failures
//! are wrapped in domain-specific enums so that no third-party error types leak
//! through the public API.

use thiserror::Error;

/// Main archiver error type
///
/// Every fallible operation in the crate returns this type. Each variant maps to
/// one [`ErrorKind`] so callers can branch on the failure class without matching
/// on message text.
#[derive(Debug, Error)]
pub enum ArchiverError {
    /// Article content could not be retrieved
    #[error("Fetch failure: {0}")]
    Fetch(#[from] FetchError),

    /// An article could not be packed into its container folder
    #[error("Pack failure: {0}")]
    Pack(#[from] PackError),

    /// A container could not be serialized into an artifact
    #[error("Serialization failure: {0}")]
    Serialization(String),

    /// A finished artifact could not be handed off
    #[error("Emit failure: {0}")]
    Emit(String),

    /// Invalid configuration or invocation arguments
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Validation errors on domain values
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Failure class of an [`ArchiverError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Any article could not be retrieved
    FetchFailure,
    /// Asset packing failed for an article
    PackFailure,
    /// A container could not be serialized
    SerializationFailure,
    /// An artifact could not be handed off
    EmitFailure,
    /// Bad batch size, empty filename, malformed config
    InvalidConfiguration,
    /// Anything else
    Other,
}

impl ArchiverError {
    /// Returns the failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArchiverError::Fetch(_) => ErrorKind::FetchFailure,
            ArchiverError::Pack(_) => ErrorKind::PackFailure,
            ArchiverError::Serialization(_) => ErrorKind::SerializationFailure,
            ArchiverError::Emit(_) => ErrorKind::EmitFailure,
            ArchiverError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            ArchiverError::Validation(_) | ArchiverError::Io(_) | ArchiverError::Other(_) => {
                ErrorKind::Other
            }
        }
    }

    /// A single sentence suitable for showing to an end user
    ///
    /// The full error (including collaborator detail) is available through
    /// `Display` and should go to the diagnostic log instead.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::FetchFailure => "Downloading article content failed".to_string(),
            ErrorKind::PackFailure => "Packing an article into the archive failed".to_string(),
            ErrorKind::SerializationFailure => "Writing the archive failed".to_string(),
            ErrorKind::EmitFailure => "Saving the archive failed".to_string(),
            ErrorKind::InvalidConfiguration => format!("Export could not start: {self}"),
            ErrorKind::Other => format!("Export failed: {self}"),
        }
    }
}

/// Content retrieval errors
///
/// Errors raised by a content fetcher. These never expose the HTTP client's own
/// error type.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed to connect to the content server
    #[error("Failed to connect: {0}")]
    ConnectionFailed(String),

    /// Server answered with a non-success status
    #[error("Unexpected status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Server returned an empty body
    #[error("Empty content for article {0}")]
    EmptyContent(String),

    /// Fetcher produced an article without content
    #[error("Article {0} has no content after fetching")]
    MissingContent(String),

    /// Article descriptor cannot be fetched (no or bad URL)
    #[error("Invalid article source: {0}")]
    InvalidSource(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Asset packing errors
#[derive(Debug, Error)]
pub enum PackError {
    /// Content could not be parsed
    #[error("Invalid content for '{article}': {reason}")]
    InvalidContent { article: String, reason: String },

    /// An asset could not be downloaded
    #[error("Failed to fetch asset {url}: {reason}")]
    AssetFetchFailed { url: String, reason: String },

    /// An asset exceeded the configured size limit
    #[error("Asset {url} is {size} bytes, limit is {limit}")]
    AssetTooLarge { url: String, size: usize, limit: usize },

    /// Publish timestamp is outside the representable calendar range
    #[error("Timestamp {0} cannot be formatted as a date")]
    InvalidTimestamp(i64),

    /// Entry could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ArchiverError {
    fn from(err: std::io::Error) -> Self {
        ArchiverError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ArchiverError {
    fn from(err: serde_json::Error) -> Self {
        ArchiverError::Validation(format!("JSON error: {err}"))
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ArchiverError {
    fn from(err: toml::de::Error) -> Self {
        ArchiverError::InvalidConfiguration(format!("TOML parse error: {err}"))
    }
}

// Conversion from zip writer errors
impl From<zip::result::ZipError> for ArchiverError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiverError::Serialization(err.to_string())
    }
}
