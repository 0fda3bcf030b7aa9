//! Domain models and types for the archiver.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ArticleId`])
//! - **Article models** ([`DownloadableArticle`], [`FetchedArticle`])
//! - **Error types** ([`ArchiverError`], [`FetchError`], [`PackError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ArchiverError>`]:
//!
//! ```rust
//! use article_archiver::domain::{ArchiverError, ErrorKind, Result};
//!
//! fn check_filename(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(ArchiverError::InvalidConfiguration("filename is empty".into()));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_filename("").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
//! ```

pub mod article;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use article::{DownloadableArticle, FetchedArticle};
pub use errors::{ArchiverError, ErrorKind, FetchError, PackError};
pub use ids::ArticleId;
pub use result::Result;
