//! Core business logic.
//!
//! # Export Workflow
//!
//! 1. **Fetch**: retrieve content for every article through the content fetcher
//! 2. **Batch**: split the fetched articles into fixed-size batches
//! 3. **Pack**: build one archive container per batch, one folder per article
//! 4. **Serialize**: turn the container into a zip artifact
//! 5. **Emit**: hand the artifact off, then release the batch before the next
//!
//! # Example
//!
//! ```rust,no_run
//! use article_archiver::adapters::build_collaborators;
//! use article_archiver::config::load_config;
//! use article_archiver::core::export::ExportPipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("archiver.toml")?;
//! let pipeline = ExportPipeline::new(&config.export, build_collaborators(&config)?)?;
//!
//! let summary = pipeline.download(Vec::new(), "my-articles").await?;
//! println!("Artifacts: {}", summary.artifacts.len());
//! # Ok(())
//! # }
//! ```

pub mod export;
