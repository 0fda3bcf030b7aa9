//! External collaborators of the export pipeline.
//!
//! - [`fetcher`] - content retrieval (HTTP by default)
//! - [`packer`] - embedding an article and its assets into a container folder
//! - [`emitter`] - handing finished archives off (filesystem by default)
//!
//! # Design Pattern
//!
//! Each collaborator is an `async_trait` object so the pipeline can be driven by
//! in-memory fakes in tests. [`build_collaborators`] wires the default
//! implementations from configuration.
//!
//! ```rust,no_run
//! use article_archiver::adapters::build_collaborators;
//! use article_archiver::config::ArchiverConfig;
//!
//! # fn example() -> article_archiver::domain::Result<()> {
//! let collaborators = build_collaborators(&ArchiverConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod emitter;
pub mod fetcher;
pub mod packer;

use crate::config::ArchiverConfig;
use crate::domain::{ArchiverError, Result};
use emitter::{ArtifactEmitter, FileSystemEmitter};
use fetcher::{ContentFetcher, HttpContentFetcher};
use packer::{AssetPacker, HtmlAssetPacker};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;

/// The three collaborators one pipeline needs
#[derive(Clone)]
pub struct Collaborators {
    /// Retrieves article content
    pub fetcher: Arc<dyn ContentFetcher>,
    /// Packs each article into its folder
    pub packer: Arc<dyn AssetPacker>,
    /// Receives finished artifacts
    pub emitter: Arc<dyn ArtifactEmitter>,
}

/// Create the default collaborators from configuration
///
/// # Errors
///
/// Returns `InvalidConfiguration` if an HTTP client cannot be built
pub fn build_collaborators(config: &ArchiverConfig) -> Result<Collaborators> {
    let fetcher = HttpContentFetcher::new(&config.fetcher)?;
    let packer = HtmlAssetPacker::new(&config.packer, &config.fetcher.user_agent)?;
    let emitter = FileSystemEmitter::new(&config.export.output_dir, config.export.overwrite);

    tracing::debug!(
        fetch_concurrency = config.fetcher.concurrency,
        embed_mode = ?config.packer.embed_mode,
        output_dir = %config.export.output_dir,
        "Collaborators created"
    );

    Ok(Collaborators {
        fetcher: Arc::new(fetcher),
        packer: Arc::new(packer),
        emitter: Arc::new(emitter),
    })
}

/// HTTP client shared by the fetcher and packer
pub(crate) fn http_client(timeout_seconds: u64, user_agent: &str) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(Duration::from_secs(timeout_seconds.min(30)))
        .user_agent(user_agent)
        .build()
        .map_err(|e| {
            ArchiverError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
        })
}
