//! Export summary and reporting
//!
//! This module defines structures for reporting the result of one invocation.

use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// One emitted artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    /// Filename handed to the emitter
    pub filename: String,

    /// Article folders inside the archive
    pub entries: usize,

    /// Serialized size
    pub size_bytes: usize,
}

/// Summary of an export invocation
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Identifier of the invocation, also attached to its log span
    pub run_id: Uuid,

    /// Articles passed in
    pub total_articles: usize,

    /// Articles with content after fetching
    pub fetched_articles: usize,

    /// Articles packed into emitted or in-flight containers
    pub packed_articles: usize,

    /// Number of batches the input was split into
    pub total_batches: usize,

    /// Emitted artifacts in batch order
    pub artifacts: Vec<ArtifactReport>,

    /// Duration of the export
    pub duration: Duration,

    /// Whether a cancel signal stopped the run between batches
    pub interrupted: bool,
}

impl ExportSummary {
    /// Create an empty summary for `run_id`
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            total_articles: 0,
            fetched_articles: 0,
            packed_articles: 0,
            total_batches: 0,
            artifacts: Vec::new(),
            duration: Duration::from_secs(0),
            interrupted: false,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record an emitted artifact
    pub fn add_artifact(&mut self, filename: impl Into<String>, entries: usize, size_bytes: usize) {
        self.artifacts.push(ArtifactReport {
            filename: filename.into(),
            entries,
            size_bytes,
        });
    }

    /// Check if every batch was emitted
    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.artifacts.len() == self.total_batches
    }

    /// Total bytes across emitted artifacts
    pub fn total_bytes(&self) -> usize {
        self.artifacts.iter().map(|a| a.size_bytes).sum()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            total_articles = self.total_articles,
            fetched = self.fetched_articles,
            packed = self.packed_articles,
            batches = self.total_batches,
            artifacts = self.artifacts.len(),
            total_bytes = self.total_bytes(),
            duration_ms = self.duration.as_millis() as u64,
            "Export completed"
        );

        if self.interrupted {
            tracing::warn!(
                emitted = self.artifacts.len(),
                batches = self.total_batches,
                "Export interrupted before all batches were emitted"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new(Uuid::nil());

        assert_eq!(summary.total_articles, 0);
        assert_eq!(summary.total_batches, 0);
        assert!(summary.artifacts.is_empty());
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.is_complete());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::new(Uuid::nil()).with_duration(Duration::from_secs(120));

        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_export_summary_completion() {
        let mut summary = ExportSummary::new(Uuid::new_v4());
        summary.total_batches = 2;
        summary.add_artifact("a_part1of2.zip", 100, 4096);
        assert!(!summary.is_complete());

        summary.add_artifact("a_part2of2.zip", 3, 1024);
        assert!(summary.is_complete());
        assert_eq!(summary.total_bytes(), 5120);

        summary.interrupted = true;
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_export_summary_serializes() {
        let mut summary = ExportSummary::new(Uuid::nil());
        summary.add_artifact("export.zip", 1, 10);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["artifacts"][0]["filename"], "export.zip");
        assert_eq!(json["interrupted"], false);
    }
}
