//! Shared progress state for one export invocation
//!
//! The pipeline is the only writer. Any number of readers can take a
//! [`ProgressSnapshot`] or subscribe to changes through a `tokio::sync::watch`
//! receiver.

use serde::Serialize;
use std::fmt;
use tokio::sync::watch;

/// Phase label shown while article content is downloaded
pub const FETCH_PHASE: &str = "Fetching article content";

/// Phase label shown while batch `batch` of `total` is packed
pub fn packing_phase(batch: usize, total: usize) -> String {
    format!("Packing (batch {batch}/{total})")
}

/// State machine position of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// No invocation has run yet
    #[default]
    Idle,
    /// Retrieving content for all articles
    Fetching,
    /// Packing batch `batch` (1-based) of `total`
    Packing { batch: usize, total: usize },
    /// All artifacts emitted
    Succeeded,
    /// An error ended the invocation
    Failed,
    /// A cancel signal was observed between batches
    Interrupted,
}

impl PipelineState {
    /// Whether the invocation has ended
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Succeeded | PipelineState::Failed | PipelineState::Interrupted
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Fetching => write!(f, "fetching"),
            PipelineState::Packing { batch, total } => write!(f, "packing {batch}/{total}"),
            PipelineState::Succeeded => write!(f, "succeeded"),
            PipelineState::Failed => write!(f, "failed"),
            PipelineState::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Point-in-time copy of the progress record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// State machine position
    pub state: PipelineState,
    /// Human-readable phase label
    pub phase: String,
    /// Articles whose content has been retrieved
    pub fetched_count: usize,
    /// Articles packed into a container so far
    pub packed_count: usize,
    /// Articles in the current invocation
    pub total_articles: usize,
    /// Whether an invocation is running
    pub busy: bool,
    /// Message of the error that ended the last invocation
    pub last_error: Option<String>,
}

/// Writer side of the progress record
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<ProgressSnapshot>,
}

impl ProgressTracker {
    /// Create a tracker in the `Idle` state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::default());
        Self { tx }
    }

    /// Subscribe to progress changes
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    /// Current progress
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    /// Whether an invocation is running
    pub fn is_busy(&self) -> bool {
        self.tx.borrow().busy
    }

    /// Reset for a new invocation and enter `Fetching`
    pub fn begin(&self, total_articles: usize) {
        self.tx.send_replace(ProgressSnapshot {
            state: PipelineState::Fetching,
            phase: FETCH_PHASE.to_string(),
            fetched_count: 0,
            packed_count: 0,
            total_articles,
            busy: true,
            last_error: None,
        });
    }

    /// Record the fetcher's completed count
    ///
    /// Counts never move backwards.
    pub fn set_fetched(&self, count: usize) {
        self.tx.send_if_modified(|p| {
            if count > p.fetched_count {
                p.fetched_count = count;
                true
            } else {
                false
            }
        });
    }

    /// Enter `Packing(batch, total)`
    pub fn enter_batch(&self, batch: usize, total: usize) {
        self.tx.send_modify(|p| {
            p.state = PipelineState::Packing { batch, total };
            p.phase = packing_phase(batch, total);
        });
    }

    /// Count one more packed article
    pub fn increment_packed(&self) {
        self.tx.send_modify(|p| p.packed_count += 1);
    }

    /// Terminal success
    pub fn finish_success(&self) {
        self.tx.send_modify(|p| {
            p.state = PipelineState::Succeeded;
            p.busy = false;
        });
    }

    /// Terminal failure, keeping `message` for readers
    pub fn finish_failed(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|p| {
            p.state = PipelineState::Failed;
            p.busy = false;
            p.last_error = Some(message);
        });
    }

    /// Terminal cancellation
    pub fn finish_interrupted(&self) {
        self.tx.send_modify(|p| {
            p.state = PipelineState::Interrupted;
            p.busy = false;
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_idle() {
        let tracker = ProgressTracker::new();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.state, PipelineState::Idle);
        assert!(!snapshot.busy);
        assert_eq!(snapshot.fetched_count, 0);
        assert!(snapshot.phase.is_empty());
    }

    #[test]
    fn test_begin_resets_previous_run() {
        let tracker = ProgressTracker::new();
        tracker.begin(3);
        tracker.set_fetched(3);
        tracker.enter_batch(1, 1);
        tracker.increment_packed();
        tracker.finish_failed("boom");

        tracker.begin(7);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.state, PipelineState::Fetching);
        assert_eq!(snapshot.phase, FETCH_PHASE);
        assert_eq!(snapshot.fetched_count, 0);
        assert_eq!(snapshot.packed_count, 0);
        assert_eq!(snapshot.total_articles, 7);
        assert!(snapshot.busy);
        assert!(snapshot.last_error.is_none());
    }

    #[test]
    fn test_set_fetched_never_decreases() {
        let tracker = ProgressTracker::new();
        tracker.begin(10);
        tracker.set_fetched(4);
        tracker.set_fetched(2);
        assert_eq!(tracker.snapshot().fetched_count, 4);
    }

    #[test]
    fn test_enter_batch_updates_phase() {
        let tracker = ProgressTracker::new();
        tracker.begin(250);
        tracker.enter_batch(2, 3);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.state, PipelineState::Packing { batch: 2, total: 3 });
        assert_eq!(snapshot.phase, "Packing (batch 2/3)");
    }

    #[test]
    fn test_terminal_states_clear_busy() {
        let tracker = ProgressTracker::new();

        tracker.begin(1);
        tracker.finish_success();
        assert!(!tracker.is_busy());
        assert!(tracker.snapshot().state.is_terminal());

        tracker.begin(1);
        tracker.finish_interrupted();
        assert_eq!(tracker.snapshot().state, PipelineState::Interrupted);
        assert!(!tracker.is_busy());

        tracker.begin(1);
        tracker.finish_failed("network down");
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.state, PipelineState::Failed);
        assert_eq!(snapshot.last_error.as_deref(), Some("network down"));
    }

    #[tokio::test]
    async fn test_subscriber_sees_changes() {
        let tracker = ProgressTracker::new();
        let mut rx = tracker.subscribe();

        tracker.begin(2);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().state, PipelineState::Fetching);

        tracker.increment_packed();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().packed_count, 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(
            PipelineState::Packing { batch: 1, total: 4 }.to_string(),
            "packing 1/4"
        );
        assert_eq!(PipelineState::Succeeded.to_string(), "succeeded");
    }
}
