//! Configuration schema types
//!
//! Every section has defaults, so an empty TOML file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Batch size used by the `collection` profile
pub const COLLECTION_BATCH_SIZE: usize = 100;

/// Batch size used by the `album` profile
pub const ALBUM_BATCH_SIZE: usize = 5;

/// Pipeline profile
///
/// Both profiles run the same pipeline; they only differ in how many articles go
/// into one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportProfile {
    /// Large flat collections of mostly-text articles
    #[default]
    Collection,
    /// Smaller collections with many images per article
    Album,
}

impl ExportProfile {
    /// Batch size for this profile
    pub fn batch_size(&self) -> usize {
        match self {
            ExportProfile::Collection => COLLECTION_BATCH_SIZE,
            ExportProfile::Album => ALBUM_BATCH_SIZE,
        }
    }
}

impl FromStr for ExportProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collection" => Ok(ExportProfile::Collection),
            "album" => Ok(ExportProfile::Album),
            other => Err(format!(
                "Invalid export profile '{other}'. Must be one of: collection, album"
            )),
        }
    }
}

impl fmt::Display for ExportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportProfile::Collection => write!(f, "collection"),
            ExportProfile::Album => write!(f, "album"),
        }
    }
}

/// How the packer stores secondary assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    /// Separate files next to the article, references rewritten to relative paths
    #[default]
    Alongside,
    /// `data:` URIs inside the article body
    Inline,
}

impl FromStr for EmbedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alongside" => Ok(EmbedMode::Alongside),
            "inline" => Ok(EmbedMode::Inline),
            other => Err(format!(
                "Invalid embed mode '{other}'. Must be one of: alongside, inline"
            )),
        }
    }
}

/// Compression applied to archive entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Deflate
    #[default]
    Deflated,
    /// No compression
    Stored,
}

impl FromStr for CompressionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deflated" => Ok(CompressionMode::Deflated),
            "stored" => Ok(CompressionMode::Stored),
            other => Err(format!(
                "Invalid compression '{other}'. Must be one of: deflated, stored"
            )),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArchiverConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Content fetcher settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Asset packer settings
    #[serde(default)]
    pub packer: PackerConfig,

    /// Export pipeline settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ArchiverConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid setting
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.fetcher.validate()?;
        self.packer.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for individual HTTP requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (1 disables retrying)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "fetcher.retry.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "fetcher.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_ms(&self, attempt: usize) -> u64 {
        let factor = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let delay = (self.initial_delay_ms as f64 * factor) as u64;
        delay.min(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Content fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Maximum number of article requests in flight
    #[serde(default = "default_fetch_concurrency")]
    pub concurrency: usize,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl FetcherConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_seconds == 0 {
            return Err("fetcher.timeout_seconds must be > 0".to_string());
        }
        if self.concurrency == 0 || self.concurrency > 64 {
            return Err(format!(
                "fetcher.concurrency must be between 1 and 64, got {}",
                self.concurrency
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err("fetcher.user_agent cannot be empty".to_string());
        }
        self.retry.validate()
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            concurrency: default_fetch_concurrency(),
            user_agent: default_user_agent(),
            retry: RetryConfig::default(),
        }
    }
}

/// Asset packer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Where assets go
    #[serde(default)]
    pub embed_mode: EmbedMode,

    /// Folder for assets inside each article folder (alongside mode)
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    /// Largest single asset accepted, in bytes
    #[serde(default = "default_max_asset_bytes")]
    pub max_asset_bytes: usize,

    /// Asset request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Absolute http(s) URL that relative asset references resolve against
    ///
    /// When unset, relative references are left as they are.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl PackerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.asset_dir.trim().is_empty() {
            return Err("packer.asset_dir cannot be empty".to_string());
        }
        if self.asset_dir.contains("..") || self.asset_dir.starts_with('/') {
            return Err(format!(
                "packer.asset_dir must be a relative folder name, got '{}'",
                self.asset_dir
            ));
        }
        if self.max_asset_bytes == 0 {
            return Err("packer.max_asset_bytes must be > 0".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("packer.timeout_seconds must be > 0".to_string());
        }
        if let Some(base_url) = &self.base_url {
            let valid = url::Url::parse(base_url)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
            if !valid {
                return Err(format!(
                    "packer.base_url must be an absolute http(s) URL, got '{base_url}'"
                ));
            }
        }
        Ok(())
    }
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            embed_mode: EmbedMode::default(),
            asset_dir: default_asset_dir(),
            max_asset_bytes: default_max_asset_bytes(),
            timeout_seconds: default_timeout_seconds(),
            base_url: None,
        }
    }
}

/// Export pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Pipeline profile (collection or album)
    #[serde(default)]
    pub profile: ExportProfile,

    /// Explicit batch size, overrides the profile
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Maximum packer calls in flight within one batch
    #[serde(default = "default_pack_concurrency")]
    pub pack_concurrency: usize,

    /// Entry compression
    #[serde(default)]
    pub compression: CompressionMode,

    /// Offset applied when turning publish timestamps into dates
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Directory archives are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Replace existing archives with the same name
    #[serde(default)]
    pub overwrite: bool,
}

impl ExportConfig {
    /// Batch size actually used by the pipeline
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or_else(|| self.profile.batch_size())
    }

    fn validate(&self) -> Result<(), String> {
        if self.batch_size == Some(0) {
            return Err("export.batch_size must be > 0".to_string());
        }
        if self.pack_concurrency == 0 || self.pack_concurrency > 32 {
            return Err(format!(
                "export.pack_concurrency must be between 1 and 32, got {}",
                self.pack_concurrency
            ));
        }
        if !(-1439..=1439).contains(&self.utc_offset_minutes) {
            return Err(format!(
                "export.utc_offset_minutes must be within ±1439, got {}",
                self.utc_offset_minutes
            ));
        }
        if self.output_dir.trim().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            profile: ExportProfile::default(),
            batch_size: None,
            pack_concurrency: default_pack_concurrency(),
            compression: CompressionMode::default(),
            utc_offset_minutes: 0,
            output_dir: default_output_dir(),
            overwrite: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_fetch_concurrency() -> usize {
    8
}

fn default_user_agent() -> String {
    format!("article-archiver/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_asset_dir() -> String {
    "assets".to_string()
}

fn default_max_asset_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_pack_concurrency() -> usize {
    1
}

fn default_output_dir() -> String {
    "downloads".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
