//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output filtered through `RUST_LOG` or the configured level
//! - JSON-formatted local log files with rotation
//! - Helper macros for the events every export emits
//!
//! # Example
//!
//! ```no_run
//! use article_archiver::logging::init_logging;
//! use article_archiver::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the completion of an export operation
///
/// # Example
///
/// ```no_run
/// use article_archiver::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(3, 250, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($artifacts:expr, $articles:expr, $duration:expr) => {
        tracing::info!(
            artifacts = $artifacts,
            articles = $articles,
            duration_ms = $duration.as_millis() as u64,
            "Export finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use article_archiver::log_error_with_context;
/// use article_archiver::domain::ArchiverError;
///
/// let error = ArchiverError::InvalidConfiguration("empty filename".to_string());
/// log_error_with_context!(&error, "Export failed");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a batch processing operation
///
/// # Example
///
/// ```no_run
/// use article_archiver::log_batch_processing;
///
/// log_batch_processing!(2, 3, 100);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr, $size:expr) => {
        tracing::debug!(
            batch = $current,
            total_batches = $total,
            batch_size = $size,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use article_archiver::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::ArchiverError;
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let error = ArchiverError::Emit("disk full".to_string());
        log_error_with_context!(&error, "Export failed");
        log_batch_processing!(1usize, 3usize, 100usize);
        log_export_complete!(3usize, 250usize, Duration::from_millis(5));
        log_retry_attempt!(1usize, 3usize, "timeout");
    }
}
