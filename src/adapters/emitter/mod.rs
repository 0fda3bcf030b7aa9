//! Artifact hand-off

pub mod filesystem;

pub use filesystem::FileSystemEmitter;

use crate::core::export::archive::Artifact;
use crate::domain::Result;
use async_trait::async_trait;

/// Delivers finished artifacts
#[async_trait]
pub trait ArtifactEmitter: Send + Sync {
    /// Take ownership of `artifact` and deliver it
    ///
    /// # Errors
    ///
    /// Returns an `Emit` error if the artifact could not be delivered.
    async fn emit(&self, artifact: Artifact) -> Result<()>;
}
