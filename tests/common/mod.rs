//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use article_archiver::adapters::emitter::ArtifactEmitter;
use article_archiver::adapters::fetcher::ContentFetcher;
use article_archiver::adapters::packer::AssetPacker;
use article_archiver::adapters::Collaborators;
use article_archiver::core::export::{Artifact, ContainerFolder, ProgressTracker};
use article_archiver::domain::{
    ArchiverError, ArticleId, DownloadableArticle, FetchError, FetchedArticle, PackError, Result,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Semaphore};

/// 2023-11-14T22:13:20Z
pub const PUBLISHED_AT: i64 = 1_700_000_000;

pub fn articles(n: usize) -> Vec<DownloadableArticle> {
    (0..n)
        .map(|i| {
            DownloadableArticle::new(
                ArticleId::new(format!("article-{i}")).unwrap(),
                format!("Article {i}"),
                format!("https://blog.test/posts/{i}"),
                PUBLISHED_AT,
            )
        })
        .collect()
}

/// Returns `<p>{title}</p>` for every article
#[derive(Default)]
pub struct FakeFetcher {
    /// Fail when reaching this zero-based article index
    pub fail_at: Option<usize>,
    /// Block until a permit is added
    pub gate: Option<Arc<Semaphore>>,
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn fetch_all(
        &self,
        articles: Vec<DownloadableArticle>,
        on_progress: &(dyn Fn(usize) + Send + Sync),
    ) -> Result<Vec<FetchedArticle>> {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }

        let mut out = Vec::with_capacity(articles.len());
        for (i, article) in articles.into_iter().enumerate() {
            if Some(i) == self.fail_at {
                return Err(FetchError::ConnectionFailed(format!("{} unreachable", article.url)).into());
            }
            let content = format!("<p>{}</p>", article.title);
            out.push(FetchedArticle::from_parts(article, content));
            on_progress(i + 1);
        }
        Ok(out)
    }
}

/// Writes `{base}.html` plus one asset per article
#[derive(Default)]
pub struct FakePacker {
    /// Fail on this one-based call number
    pub fail_on_call: Option<usize>,
    /// Sleep longer on earlier calls so overlapping calls finish in reverse
    pub reverse_delay: bool,
    calls: AtomicUsize,
}

impl FakePacker {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn reversing(fail_on_call: Option<usize>) -> Self {
        Self {
            fail_on_call,
            reverse_delay: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AssetPacker for FakePacker {
    async fn pack(
        &self,
        content: &str,
        base_name: &str,
        folder: &mut ContainerFolder,
    ) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if Some(call) == self.fail_on_call {
            return Err(PackError::AssetFetchFailed {
                url: "https://img.test/broken.png".to_string(),
                reason: "status 404".to_string(),
            }
            .into());
        }
        if self.reverse_delay {
            let delay = 3 * 20u64.saturating_sub(call as u64);
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        folder.add_file(format!("{base_name}.html"), content.as_bytes().to_vec())?;
        folder.add_file("assets/cover.png", base_name.as_bytes().to_vec())
    }
}

/// An artifact as seen by the emitter
#[derive(Debug, Clone)]
pub struct Emitted {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub packed_at_emit: usize,
}

/// Stores artifacts in memory
#[derive(Default)]
pub struct RecordingEmitter {
    pub emitted: Mutex<Vec<Emitted>>,
    /// Progress to sample at each emit
    pub progress: Option<Arc<ProgressTracker>>,
    /// Fail on this one-based emit number
    pub fail_on_emit: Option<usize>,
    /// Raised after this many successful emits
    pub cancel_after: Option<(usize, watch::Sender<bool>)>,
}

impl RecordingEmitter {
    pub fn filenames(&self) -> Vec<String> {
        self.emitted
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.filename.clone())
            .collect()
    }

    pub fn packed_at_emit(&self) -> Vec<usize> {
        self.emitted
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.packed_at_emit)
            .collect()
    }

    pub fn artifact(&self, index: usize) -> Emitted {
        self.emitted.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ArtifactEmitter for RecordingEmitter {
    async fn emit(&self, artifact: Artifact) -> Result<()> {
        let mut emitted = self.emitted.lock().unwrap();
        if Some(emitted.len() + 1) == self.fail_on_emit {
            return Err(ArchiverError::Emit("disk full".to_string()));
        }
        emitted.push(Emitted {
            filename: artifact.filename,
            bytes: artifact.bytes,
            packed_at_emit: self
                .progress
                .as_ref()
                .map(|p| p.snapshot().packed_count)
                .unwrap_or_default(),
        });
        if let Some((after, tx)) = &self.cancel_after {
            if emitted.len() == *after {
                tx.send_replace(true);
            }
        }
        Ok(())
    }
}

pub fn collaborators(
    fetcher: FakeFetcher,
    packer: FakePacker,
    emitter: Arc<RecordingEmitter>,
) -> Collaborators {
    Collaborators {
        fetcher: Arc::new(fetcher),
        packer: Arc::new(packer),
        emitter,
    }
}

/// Top-level folder names in an archive, sorted
pub fn top_level_folders(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut folders: Vec<String> = archive
        .file_names()
        .filter_map(|name| {
            let trimmed = name.strip_suffix('/')?;
            (!trimmed.contains('/')).then(|| trimmed.to_string())
        })
        .collect();
    folders.sort();
    folders
}

/// Top-level folder names in archive order
pub fn zip_folder_order(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    archive
        .file_names()
        .filter_map(|name| {
            let trimmed = name.strip_suffix('/')?;
            (!trimmed.contains('/')).then(|| trimmed.to_string())
        })
        .collect()
}

/// Every file entry with its decompressed contents
pub fn file_contents(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut files = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).unwrap();
        files.insert(entry.name().to_string(), buf);
    }
    files
}
