//! Deterministic names for archive entries and artifacts

use crate::domain::{FetchedArticle, PackError};
use chrono::{DateTime, FixedOffset};

/// Extension of every produced archive
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Replacement for characters that would otherwise create nested folders
pub const PATH_PLACEHOLDER: char = '_';

const UNTITLED: &str = "untitled";

/// Replaces path separators so a title stays a single path component
///
/// Surrounding whitespace is kept; only a blank title is replaced.
pub fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if c == '/' || c == '\\' { PATH_PLACEHOLDER } else { c })
        .collect();
    if sanitized.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        sanitized
    }
}

/// Base name for the packed article file inside its folder
///
/// Periods are replaced so downstream tools never mistake part of the title for
/// an extension.
pub fn entry_base_name(title: &str) -> String {
    sanitize_title(title).replace('.', "_")
}

/// Formats a publish timestamp as `YYYY-MM-DD` at the given UTC offset
pub fn format_publish_date(published_at: i64, offset: FixedOffset) -> Result<String, PackError> {
    let utc = DateTime::from_timestamp(published_at, 0)
        .ok_or(PackError::InvalidTimestamp(published_at))?;
    Ok(utc.with_timezone(&offset).format("%Y-%m-%d").to_string())
}

/// Folder name for an article: publish date, a space, then the sanitized title
pub fn entry_folder_name(
    article: &FetchedArticle,
    offset: FixedOffset,
) -> Result<String, PackError> {
    let date = format_publish_date(article.published_at, offset)?;
    Ok(format!("{date} {}", sanitize_title(&article.title)))
}

/// Artifact filename for batch `number` (1-based) of `total`
pub fn artifact_filename(base: &str, number: usize, total: usize) -> String {
    if total > 1 {
        format!("{base}_part{number}of{total}.{ARCHIVE_EXTENSION}")
    } else {
        format!("{base}.{ARCHIVE_EXTENSION}")
    }
}
