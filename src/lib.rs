// Article Archiver - batched article export to zip archives
// Copyright (c) 2025 Article Archiver Contributors
// Licensed under the MIT License

//! # Article Archiver
//!
//! Exports collections of articles into downloadable zip archives while keeping
//! peak memory bounded by a fixed batch size.
//!
//! ## Overview
//!
//! The export pipeline:
//! - **Fetches** full content for every article, reporting progress as it goes
//! - **Batches** the fetched articles into fixed-size groups
//! - **Packs** each batch into its own archive, one folder per article
//! - **Emits** each archive and releases the batch before starting the next
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The export pipeline (batching, packing, naming, progress)
//! - [`adapters`] - Content fetcher, asset packer and emitter implementations
//! - [`domain`] - Article types, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use article_archiver::adapters::build_collaborators;
//! use article_archiver::config::load_config_or_default;
//! use article_archiver::core::export::ExportPipeline;
//! use article_archiver::domain::{ArticleId, DownloadableArticle};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default(None)?;
//!     let pipeline = ExportPipeline::new(&config.export, build_collaborators(&config)?)?;
//!
//!     let articles = vec![DownloadableArticle::new(
//!         ArticleId::new("42")?,
//!         "Hello / World",
//!         "https://blog.example.com/posts/42",
//!         1_700_000_000,
//!     )];
//!
//!     let summary = pipeline.download(articles, "my-blog").await?;
//!     println!("Wrote {} archive(s)", summary.artifacts.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Progress
//!
//! Every pipeline owns a [`core::export::ProgressTracker`]. Observers either
//! poll it or subscribe to a `tokio::sync::watch` receiver:
//!
//! ```rust,no_run
//! # use article_archiver::core::export::ExportPipeline;
//! # async fn example(pipeline: &ExportPipeline) {
//! let mut rx = pipeline.progress().subscribe();
//! while rx.changed().await.is_ok() {
//!     let p = rx.borrow_and_update().clone();
//!     println!("{}: {}/{}", p.phase, p.packed_count, p.total_articles);
//! }
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::ArchiverError`]. Use
//! [`domain::ArchiverError::kind`] to branch on the failure class and
//! [`domain::ArchiverError::user_message`] for a sentence to show end users.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
