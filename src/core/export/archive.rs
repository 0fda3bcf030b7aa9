//! Archive containers and the per-batch archive builder
//!
//! A [`Container`] is the in-memory archive for exactly one batch. It is filled
//! by the [`ArchiveBuilder`] and consumed by [`Container::into_artifact`], so its
//! memory is released as soon as the artifact bytes exist.

use crate::adapters::packer::AssetPacker;
use crate::config::CompressionMode;
use crate::core::export::batch::Batch;
use crate::core::export::naming::{entry_base_name, entry_folder_name};
use crate::core::export::progress::ProgressTracker;
use crate::domain::{ArchiverError, FetchedArticle, PackError, Result};
use chrono::FixedOffset;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One folder of a container, holding a single article and its assets
#[derive(Debug, Clone, Default)]
pub struct ContainerFolder {
    name: String,
    files: Vec<(String, Vec<u8>)>,
}

impl ContainerFolder {
    /// Create an empty folder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// Folder name inside the archive
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a file at `path`, relative to this folder
    ///
    /// `path` may contain `/` to place the file in a sub-folder. Adding the same
    /// path twice replaces the earlier contents.
    ///
    /// # Errors
    ///
    /// Rejects empty, absolute and parent-relative paths
    pub fn add_file(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let path = path.into();
        if path.is_empty()
            || path.starts_with('/')
            || path.split('/').any(|part| part.is_empty() || part == "..")
        {
            return Err(PackError::Encoding(format!("invalid entry path '{path}'")).into());
        }
        if let Some(existing) = self.files.iter_mut().find(|(p, _)| *p == path) {
            existing.1 = bytes;
        } else {
            self.files.push((path, bytes));
        }
        Ok(())
    }

    /// Whether a file exists at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|(p, _)| p == path)
    }

    /// Files in insertion order
    pub fn files(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(p, b)| (p.as_str(), b.as_slice()))
    }

    /// Number of files in this folder
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total payload bytes held by this folder
    pub fn size_bytes(&self) -> usize {
        self.files.iter().map(|(_, b)| b.len()).sum()
    }
}

/// Batch-scoped archive under construction
#[derive(Debug, Default)]
pub struct Container {
    folders: Vec<ContainerFolder>,
    names: HashSet<String>,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a packed folder, returning the name it was stored under
    ///
    /// Colliding names get a ` (2)`, ` (3)`, ... suffix so every article keeps
    /// its own folder.
    pub fn add_folder(&mut self, mut folder: ContainerFolder) -> &str {
        if self.names.contains(&folder.name) {
            let base = folder.name.clone();
            let mut n = 2;
            while self.names.contains(&format!("{base} ({n})")) {
                n += 1;
            }
            folder.name = format!("{base} ({n})");
        }
        self.names.insert(folder.name.clone());
        self.folders.push(folder);
        // Just pushed, so `last` is present.
        self.folders.last().map(|f| f.name.as_str()).unwrap_or_default()
    }

    /// Number of folders (one per article)
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the container holds no folders
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Folder names in insertion order
    pub fn folder_names(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(|f| f.name.as_str())
    }

    /// Serializes the container into a zip artifact, consuming it
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the zip writer fails
    pub fn into_artifact(
        self,
        filename: impl Into<String>,
        compression: CompressionMode,
    ) -> Result<Artifact> {
        let method = match compression {
            CompressionMode::Deflated => CompressionMethod::Deflated,
            CompressionMode::Stored => CompressionMethod::Stored,
        };
        // Fixed timestamps keep re-runs byte-identical
        let options = FileOptions::<()>::default()
            .compression_method(method)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644);
        let dir_options = options.unix_permissions(0o755);

        let entry_count = self.folders.len();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for folder in self.folders {
            writer.add_directory(format!("{}/", folder.name), dir_options)?;

            let mut created_dirs: HashSet<String> = HashSet::new();
            for (path, bytes) in folder.files {
                // Explicit directory records for nested asset folders
                let mut prefix = String::new();
                let parts: Vec<&str> = path.split('/').collect();
                for part in &parts[..parts.len() - 1] {
                    prefix.push_str(part);
                    prefix.push('/');
                    if created_dirs.insert(prefix.clone()) {
                        writer.add_directory(format!("{}/{}", folder.name, prefix), dir_options)?;
                    }
                }

                writer.start_file(format!("{}/{}", folder.name, path), options)?;
                writer
                    .write_all(&bytes)
                    .map_err(|e| ArchiverError::Serialization(e.to_string()))?;
            }
        }

        let bytes = writer.finish()?.into_inner();

        Ok(Artifact {
            filename: filename.into(),
            bytes,
            entry_count,
        })
    }
}

/// Serialized archive ready to be emitted
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Filename including extension
    pub filename: String,
    /// Zip bytes
    pub bytes: Vec<u8>,
    /// Number of article folders inside
    pub entry_count: usize,
}

impl Artifact {
    /// Size of the serialized archive
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Packs batches into containers and serializes them
pub struct ArchiveBuilder {
    packer: Arc<dyn AssetPacker>,
    compression: CompressionMode,
    utc_offset: FixedOffset,
    pack_concurrency: usize,
}

impl ArchiveBuilder {
    /// Create a new archive builder
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an out-of-range UTC offset or a zero
    /// pack concurrency
    pub fn new(
        packer: Arc<dyn AssetPacker>,
        compression: CompressionMode,
        utc_offset_minutes: i32,
        pack_concurrency: usize,
    ) -> Result<Self> {
        let utc_offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ArchiverError::InvalidConfiguration(format!(
                    "UTC offset of {utc_offset_minutes} minutes is out of range"
                ))
            })?;
        if pack_concurrency == 0 {
            return Err(ArchiverError::InvalidConfiguration(
                "pack concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            packer,
            compression,
            utc_offset,
            pack_concurrency,
        })
    }

    /// Packs every article of `batch` into `container`
    ///
    /// Articles are attached and counted in batch order. The packed count is
    /// bumped once per finished article, so it never runs ahead of the work.
    ///
    /// # Errors
    ///
    /// Stops at the first article that fails to pack
    pub async fn pack_batch(
        &self,
        batch: &Batch,
        container: &mut Container,
        progress: &ProgressTracker,
    ) -> Result<()> {
        let mut packed = stream::iter(batch.articles.iter())
            .map(|article| self.pack_article(article))
            .buffered(self.pack_concurrency)
            .boxed();

        while let Some(folder) = packed.try_next().await? {
            let stored_as = container.add_folder(folder);
            tracing::trace!(folder = %stored_as, "Article packed");
            progress.increment_packed();
        }

        Ok(())
    }

    /// Serializes a filled container on the blocking pool
    ///
    /// The container is moved in and dropped once its bytes are written.
    pub async fn serialize(&self, container: Container, filename: String) -> Result<Artifact> {
        let compression = self.compression;
        tokio::task::spawn_blocking(move || container.into_artifact(filename, compression))
            .await
            .map_err(|e| ArchiverError::Serialization(format!("serializer task failed: {e}")))?
    }

    async fn pack_article(&self, article: &FetchedArticle) -> Result<ContainerFolder> {
        let folder_name = entry_folder_name(article, self.utc_offset)?;
        let base_name = entry_base_name(&article.title);
        let mut folder = ContainerFolder::new(folder_name);

        self.packer
            .pack(&article.content, &base_name, &mut folder)
            .await
            .map_err(|e| {
                tracing::warn!(
                    article_id = %article.id,
                    title = %article.title,
                    error = %e,
                    "Failed to pack article"
                );
                match e {
                    ArchiverError::Pack(_) => e,
                    other => PackError::InvalidContent {
                        article: article.title.clone(),
                        reason: other.to_string(),
                    }
                    .into(),
                }
            })?;

        Ok(folder)
    }
}
