//! Integration tests for the batched export pipeline

mod common;

use article_archiver::config::{ExportConfig, ExportProfile};
use article_archiver::core::export::{ExportPipeline, PipelineState, ProgressTracker};
use article_archiver::domain::{ArchiverError, ArticleId, DownloadableArticle, ErrorKind};
use common::*;
use std::sync::Arc;
use tokio::sync::Semaphore;

fn export_config(batch_size: Option<usize>) -> ExportConfig {
    ExportConfig {
        batch_size,
        ..ExportConfig::default()
    }
}

fn pipeline_with(
    config: &ExportConfig,
    fetcher: FakeFetcher,
    packer: FakePacker,
    emitter: Arc<RecordingEmitter>,
    progress: Arc<ProgressTracker>,
) -> ExportPipeline {
    ExportPipeline::new(config, collaborators(fetcher, packer, emitter))
        .unwrap()
        .with_progress(progress)
}

fn recording(progress: &Arc<ProgressTracker>) -> Arc<RecordingEmitter> {
    Arc::new(RecordingEmitter {
        progress: Some(progress.clone()),
        ..RecordingEmitter::default()
    })
}

#[tokio::test]
async fn test_250_articles_in_batches_of_100() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(Some(100)),
        FakeFetcher::default(),
        FakePacker::default(),
        emitter.clone(),
        progress.clone(),
    );

    let summary = pipeline.download(articles(250), "blog").await.unwrap();

    assert_eq!(
        emitter.filenames(),
        vec!["blog_part1of3.zip", "blog_part2of3.zip", "blog_part3of3.zip"]
    );
    assert_eq!(emitter.packed_at_emit(), vec![100, 200, 250]);
    assert_eq!(top_level_folders(&emitter.artifact(0).bytes).len(), 100);
    assert_eq!(top_level_folders(&emitter.artifact(1).bytes).len(), 100);
    assert_eq!(top_level_folders(&emitter.artifact(2).bytes).len(), 50);

    assert_eq!(summary.total_batches, 3);
    assert_eq!(summary.packed_articles, 250);
    assert!(summary.is_complete());

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.state, PipelineState::Succeeded);
    assert_eq!(snapshot.fetched_count, 250);
    assert_eq!(snapshot.packed_count, 250);
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn test_single_batch_uses_plain_filename() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(None),
        FakeFetcher::default(),
        FakePacker::default(),
        emitter.clone(),
        progress,
    );

    pipeline.download(articles(7), "notes").await.unwrap();

    assert_eq!(emitter.filenames(), vec!["notes.zip"]);
    let folders = top_level_folders(&emitter.artifact(0).bytes);
    assert_eq!(folders.len(), 7);
    assert!(folders.contains(&"2023-11-14 Article 0".to_string()));
}

#[tokio::test]
async fn test_album_profile_batches_of_five() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let config = ExportConfig {
        profile: ExportProfile::Album,
        ..ExportConfig::default()
    };
    let pipeline = pipeline_with(
        &config,
        FakeFetcher::default(),
        FakePacker::default(),
        emitter.clone(),
        progress,
    );

    pipeline.download(articles(12), "album").await.unwrap();

    assert_eq!(emitter.packed_at_emit(), vec![5, 10, 12]);
    assert_eq!(emitter.filenames()[2], "album_part3of3.zip");
}

#[tokio::test]
async fn test_pack_failure_emits_nothing_for_batch() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(Some(100)),
        FakeFetcher::default(),
        FakePacker::failing_on(12),
        emitter.clone(),
        progress.clone(),
    );

    let err = pipeline.download(articles(20), "broken").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PackFailure);
    assert!(emitter.filenames().is_empty());

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.state, PipelineState::Failed);
    assert_eq!(snapshot.packed_count, 11);
    assert!(!snapshot.busy);
    assert!(snapshot.last_error.is_some());
}

#[tokio::test]
async fn test_fetch_failure_fails_before_packing() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(Some(2)),
        FakeFetcher {
            fail_at: Some(3),
            ..FakeFetcher::default()
        },
        FakePacker::default(),
        emitter.clone(),
        progress.clone(),
    );

    let err = pipeline.download(articles(5), "x").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FetchFailure);
    assert!(emitter.filenames().is_empty());
    let snapshot = progress.snapshot();
    assert_eq!(snapshot.fetched_count, 3);
    assert_eq!(snapshot.packed_count, 0);
    assert_eq!(snapshot.state, PipelineState::Failed);
}

#[tokio::test]
async fn test_emit_failure_keeps_earlier_artifacts() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = Arc::new(RecordingEmitter {
        progress: Some(progress.clone()),
        fail_on_emit: Some(2),
        ..RecordingEmitter::default()
    });
    let pipeline = pipeline_with(
        &export_config(Some(3)),
        FakeFetcher::default(),
        FakePacker::default(),
        emitter.clone(),
        progress.clone(),
    );

    let err = pipeline.download(articles(9), "partial").await.unwrap_err();

    assert!(matches!(err, ArchiverError::Emit(_)));
    assert_eq!(emitter.filenames(), vec!["partial_part1of3.zip"]);
    assert_eq!(progress.snapshot().state, PipelineState::Failed);
}

#[tokio::test]
async fn test_slash_in_title_never_nests() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(None),
        FakeFetcher::default(),
        FakePacker::default(),
        emitter.clone(),
        progress,
    );
    let article = DownloadableArticle::new(
        ArticleId::new("s1").unwrap(),
        "Q1/Q2 report v1.0",
        "https://blog.test/posts/s1",
        PUBLISHED_AT,
    );

    pipeline.download(vec![article], "slash").await.unwrap();

    let bytes = emitter.artifact(0).bytes;
    assert_eq!(
        top_level_folders(&bytes),
        vec!["2023-11-14 Q1_Q2 report v1.0"]
    );
    let files = file_contents(&bytes);
    assert!(files.contains_key("2023-11-14 Q1_Q2 report v1.0/Q1_Q2 report v1_0.html"));
    assert!(files.keys().all(|name| name.matches('/').count() <= 2));
}

#[tokio::test]
async fn test_duplicate_titles_get_distinct_folders() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(None),
        FakeFetcher::default(),
        FakePacker::default(),
        emitter.clone(),
        progress,
    );
    let same = |id: &str| {
        DownloadableArticle::new(ArticleId::new(id).unwrap(), "Same", "https://b.test/", 0)
    };

    pipeline
        .download(vec![same("a"), same("b")], "dupes")
        .await
        .unwrap();

    assert_eq!(
        top_level_folders(&emitter.artifact(0).bytes),
        vec!["1970-01-01 Same", "1970-01-01 Same (2)"]
    );
}

#[tokio::test]
async fn test_rerun_produces_identical_entries() {
    let run = || async {
        let progress = Arc::new(ProgressTracker::new());
        let emitter = recording(&progress);
        let pipeline = pipeline_with(
            &export_config(Some(4)),
            FakeFetcher::default(),
            FakePacker::default(),
            emitter.clone(),
            progress,
        );
        pipeline.download(articles(10), "same").await.unwrap();
        let emitted = emitter.emitted.lock().unwrap().clone();
        emitted
            .into_iter()
            .map(|e| (e.filename, file_contents(&e.bytes)))
            .collect::<Vec<_>>()
    };

    let first = run().await;
    let second = run().await;

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_empty_input_succeeds_without_artifacts() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(None),
        FakeFetcher::default(),
        FakePacker::default(),
        emitter.clone(),
        progress.clone(),
    );

    let summary = pipeline.download(Vec::new(), "nothing").await.unwrap();

    assert_eq!(summary.total_batches, 0);
    assert!(emitter.filenames().is_empty());
    assert_eq!(progress.snapshot().state, PipelineState::Succeeded);
}

#[tokio::test]
async fn test_progress_is_monotonic() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(Some(10)),
        FakeFetcher::default(),
        FakePacker::default(),
        emitter,
        progress.clone(),
    );

    let mut rx = progress.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            seen.push((snapshot.fetched_count, snapshot.packed_count));
            if snapshot.state.is_terminal() {
                break;
            }
        }
        seen
    });

    pipeline.download(articles(35), "mono").await.unwrap();
    let seen = observer.await.unwrap();

    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0 && w[0].1 <= w[1].1));
    assert_eq!(seen.last(), Some(&(35, 35)));
}

#[tokio::test]
async fn test_second_invocation_is_rejected_while_running() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let gate = Arc::new(Semaphore::new(0));
    let pipeline = Arc::new(pipeline_with(
        &export_config(None),
        FakeFetcher {
            gate: Some(gate.clone()),
            ..FakeFetcher::default()
        },
        FakePacker::default(),
        emitter.clone(),
        progress.clone(),
    ));

    let running = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.download(articles(3), "first").await })
    };
    while !progress.is_busy() {
        tokio::task::yield_now().await;
    }

    let err = pipeline.download(articles(1), "second").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    assert!(progress.is_busy());

    gate.add_permits(1);
    running.await.unwrap().unwrap();
    assert_eq!(emitter.filenames(), vec!["first.zip"]);
}

#[tokio::test]
async fn test_blank_filename_is_invalid() {
    let progress = Arc::new(ProgressTracker::new());
    let emitter = recording(&progress);
    let pipeline = pipeline_with(
        &export_config(None),
        FakeFetcher::default(),
        FakePacker::default(),
        emitter,
        progress.clone(),
    );

    let err = pipeline.download(articles(2), "").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    assert_eq!(progress.snapshot().state, PipelineState::Failed);
}

#[tokio::test]
async fn test_concurrent_packing_matches_sequential_run() {
    let run = |pack_concurrency: usize, packer: FakePacker| async move {
        let progress = Arc::new(ProgressTracker::new());
        let emitter = recording(&progress);
        let config = ExportConfig {
            batch_size: Some(4),
            pack_concurrency,
            ..ExportConfig::default()
        };
        let pipeline = pipeline_with(
            &config,
            FakeFetcher::default(),
            packer,
            emitter.clone(),
            progress.clone(),
        );
        let result = pipeline.download(articles(10), "order").await;
        let folders: Vec<Vec<String>> = emitter
            .emitted
            .lock()
            .unwrap()
            .iter()
            .map(|e| zip_folder_order(&e.bytes))
            .collect();
        (
            result.is_ok(),
            folders,
            emitter.packed_at_emit(),
            progress.snapshot().packed_count,
        )
    };

    let sequential = run(1, FakePacker::default()).await;
    let concurrent = run(4, FakePacker::reversing(None)).await;
    assert!(concurrent.0);
    assert_eq!(concurrent, sequential);
    assert_eq!(concurrent.2, vec![4, 8, 10]);
    assert_eq!(concurrent.1[0][0], "2023-11-14 Article 0");

    let sequential_failure = run(1, FakePacker::failing_on(7)).await;
    let concurrent_failure = run(4, FakePacker::reversing(Some(7))).await;
    assert!(!concurrent_failure.0);
    assert_eq!(concurrent_failure, sequential_failure);
    assert_eq!(concurrent_failure.3, 6);
    assert_eq!(concurrent_failure.2, vec![4]);
}
