//! Filesystem emitter
//!
//! Writes each artifact into the configured output directory. The bytes go to a
//! `.part` file first and are renamed into place once fully written.

use super::ArtifactEmitter;
use crate::core::export::archive::Artifact;
use crate::domain::{ArchiverError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Saves artifacts as files in a directory
#[derive(Debug, Clone)]
pub struct FileSystemEmitter {
    output_dir: PathBuf,
    overwrite: bool,
}

impl FileSystemEmitter {
    /// Create an emitter writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite,
        }
    }

    /// Target directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn target_path(&self, filename: &str) -> Result<PathBuf> {
        validate_filename(filename)?;
        Ok(self.output_dir.join(filename))
    }
}

#[async_trait]
impl ArtifactEmitter for FileSystemEmitter {
    async fn emit(&self, artifact: Artifact) -> Result<()> {
        let path = self.target_path(&artifact.filename)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                ArchiverError::Emit(format!(
                    "cannot create output directory {}: {e}",
                    self.output_dir.display()
                ))
            })?;

        if !self.overwrite && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ArchiverError::Emit(format!(
                "{} already exists (set export.overwrite to replace it)",
                path.display()
            )));
        }

        let partial = path.with_extension("zip.part");
        tokio::fs::write(&partial, &artifact.bytes)
            .await
            .map_err(|e| ArchiverError::Emit(format!("cannot write {}: {e}", partial.display())))?;
        tokio::fs::rename(&partial, &path).await.map_err(|e| {
            ArchiverError::Emit(format!("cannot move archive to {}: {e}", path.display()))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = artifact.bytes.len(),
            "Archive saved"
        );
        Ok(())
    }
}

/// A filename must be a single, plain path component
fn validate_filename(filename: &str) -> Result<()> {
    let invalid = matches!(filename, "" | "." | "..")
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ArchiverError::Emit(format!(
            "refusing to write artifact with unsafe filename '{filename}'"
        )));
    }
    Ok(())
}
