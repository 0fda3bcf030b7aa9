//! Export pipeline - main orchestrator for one archive export
//!
//! Fetches all content, splits it into batches, then for each batch packs a
//! fresh container, serializes it, hands the artifact to the emitter and drops
//! everything the batch held before moving on.

use crate::adapters::emitter::ArtifactEmitter;
use crate::adapters::fetcher::ContentFetcher;
use crate::adapters::Collaborators;
use crate::config::ExportConfig;
use crate::core::export::archive::{ArchiveBuilder, Container};
use crate::core::export::batch::{Batch, Batcher};
use crate::core::export::naming::artifact_filename;
use crate::core::export::progress::ProgressTracker;
use crate::core::export::summary::ExportSummary;
use crate::domain::{ArchiverError, DownloadableArticle, FetchError, FetchedArticle, Result};
use crate::{log_batch_processing, log_error_with_context, log_export_complete};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tracing::Instrument;
use uuid::Uuid;

/// Batched, memory-bounded export pipeline
pub struct ExportPipeline {
    batcher: Batcher,
    builder: ArchiveBuilder,
    fetcher: Arc<dyn ContentFetcher>,
    emitter: Arc<dyn ArtifactEmitter>,
    progress: Arc<ProgressTracker>,
    shutdown: Option<watch::Receiver<bool>>,
    run_lock: Mutex<()>,
}

impl ExportPipeline {
    /// Create a new export pipeline
    ///
    /// The batch size comes from the export profile unless `batch_size` is set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a zero batch size, a zero pack
    /// concurrency or an out-of-range UTC offset
    pub fn new(config: &ExportConfig, collaborators: Collaborators) -> Result<Self> {
        let batcher = Batcher::new(config.effective_batch_size())?;
        let builder = ArchiveBuilder::new(
            collaborators.packer,
            config.compression,
            config.utc_offset_minutes,
            config.pack_concurrency,
        )?;

        tracing::debug!(
            profile = %config.profile,
            batch_size = batcher.batch_size(),
            pack_concurrency = config.pack_concurrency,
            "Export pipeline created"
        );

        Ok(Self {
            batcher,
            builder,
            fetcher: collaborators.fetcher,
            emitter: collaborators.emitter,
            progress: Arc::new(ProgressTracker::new()),
            shutdown: None,
            run_lock: Mutex::new(()),
        })
    }

    /// Report progress through an existing tracker
    pub fn with_progress(mut self, progress: Arc<ProgressTracker>) -> Self {
        self.progress = progress;
        self
    }

    /// Stop between batches once `shutdown` turns `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Progress tracker shared with observers
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    /// Effective batch size
    pub fn batch_size(&self) -> usize {
        self.batcher.batch_size()
    }

    /// Export `articles` into one or more archives named after `filename`
    ///
    /// With a single batch the artifact is `{filename}.zip`, otherwise
    /// `{filename}_part{i}of{T}.zip`. Artifacts emitted before a failure stay
    /// delivered.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if another invocation is running or the
    /// filename is blank or contains a path separator, and the first fetch, pack, serialization or emit
    /// error otherwise. Progress ends in `Failed` in the latter cases.
    pub async fn download(
        &self,
        articles: Vec<DownloadableArticle>,
        filename: &str,
    ) -> Result<ExportSummary> {
        let _running = self.run_lock.try_lock().map_err(|_| {
            ArchiverError::InvalidConfiguration("an export is already running".to_string())
        })?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "export",
            run_id = %run_id,
            filename = %filename,
            articles = articles.len()
        );

        async move {
            self.progress.begin(articles.len());

            match self.run(run_id, articles, filename).await {
                Ok(summary) => {
                    if summary.interrupted {
                        self.progress.finish_interrupted();
                    } else {
                        self.progress.finish_success();
                    }
                    summary.log_summary();
                    log_export_complete!(
                        summary.artifacts.len(),
                        summary.total_articles,
                        summary.duration
                    );
                    Ok(summary)
                }
                Err(e) => {
                    self.progress.finish_failed(e.user_message());
                    log_error_with_context!(&e, "Export failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        run_id: Uuid,
        articles: Vec<DownloadableArticle>,
        filename: &str,
    ) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let base = filename.trim();
        if base.is_empty() {
            return Err(ArchiverError::InvalidConfiguration(
                "archive filename cannot be empty".to_string(),
            ));
        }
        if base == "." || base == ".." || base.contains(['/', '\\', '\0']) {
            return Err(ArchiverError::InvalidConfiguration(format!(
                "archive filename '{base}' must not contain path separators"
            )));
        }

        let mut summary = ExportSummary::new(run_id);
        summary.total_articles = articles.len();

        tracing::info!(
            articles = articles.len(),
            batch_size = self.batcher.batch_size(),
            "Starting export"
        );

        let fetched = self.fetch_all(articles).await?;
        summary.fetched_articles = fetched.len();

        let batches = self.batcher.split(fetched);
        let total = batches.len();
        summary.total_batches = total;

        tracing::info!(batches = total, "Articles fetched, packing batches");

        for batch in batches {
            if self.is_cancelled() {
                tracing::warn!(
                    next_batch = batch.number(),
                    total_batches = total,
                    "Shutdown requested, stopping before next batch"
                );
                summary.interrupted = true;
                break;
            }

            let (entries, size_bytes, name) = self.process_batch(batch, base).await?;
            summary.add_artifact(name, entries, size_bytes);
            summary.packed_articles = self.progress.snapshot().packed_count;
        }

        Ok(summary.with_duration(start_time.elapsed()))
    }

    async fn fetch_all(&self, articles: Vec<DownloadableArticle>) -> Result<Vec<FetchedArticle>> {
        let expected = articles.len();
        let progress = Arc::clone(&self.progress);
        let on_progress = move |count: usize| progress.set_fetched(count);

        let fetched = self.fetcher.fetch_all(articles, &on_progress).await?;

        if fetched.len() != expected {
            return Err(FetchError::InvalidResponse(format!(
                "fetcher returned {} of {} articles",
                fetched.len(),
                expected
            ))
            .into());
        }
        if let Some(article) = fetched.iter().find(|a| a.content.is_empty()) {
            return Err(FetchError::MissingContent(article.id.to_string()).into());
        }

        self.progress.set_fetched(fetched.len());
        Ok(fetched)
    }

    /// Packs, serializes and emits one batch
    ///
    /// The batch and its container are dropped before this returns.
    async fn process_batch(&self, batch: Batch, base: &str) -> Result<(usize, usize, String)> {
        let number = batch.number();
        let total = batch.total;
        self.progress.enter_batch(number, total);
        log_batch_processing!(number, total, batch.len());

        let mut container = Container::new();
        self.builder
            .pack_batch(&batch, &mut container, &self.progress)
            .await?;
        drop(batch);

        let filename = artifact_filename(base, number, total);
        let artifact = self.builder.serialize(container, filename).await?;
        let entries = artifact.entry_count;
        let size_bytes = artifact.size_bytes();
        let name = artifact.filename.clone();

        self.emitter.emit(artifact).await.map_err(|e| match e {
            ArchiverError::Emit(_) => e,
            other => ArchiverError::Emit(other.to_string()),
        })?;

        tracing::info!(
            batch = number,
            total_batches = total,
            filename = %name,
            entries,
            size_bytes,
            "Batch archive emitted"
        );

        Ok((entries, size_bytes, name))
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
