//! Configuration management.
//!
//! TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - `ARCHIVER_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use article_archiver::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("archiver.toml")?;
//!
//! println!("Profile: {}", config.export.profile);
//! println!("Batch size: {}", config.export.effective_batch_size());
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [fetcher]
//! concurrency = 8
//! timeout_seconds = 30
//!
//! [packer]
//! embed_mode = "alongside"
//!
//! [export]
//! profile = "collection"
//! output_dir = "${HOME}/Downloads"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, ArchiverConfig, CompressionMode, EmbedMode, ExportConfig, ExportProfile,
    FetcherConfig, LoggingConfig, PackerConfig, RetryConfig,
};
