//! Validate config command implementation
//!
//! This module implements the `validate-config` command, which loads the
//! configuration exactly as `export` would and prints the effective settings.

use crate::config::load_config_or_default;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let source = config_path.unwrap_or("<defaults>");
        tracing::info!(config_path = %source, "Validating configuration");

        println!("🔍 Validating configuration: {source}");
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Profile: {}", config.export.profile);
        println!("  Batch Size: {}", config.export.effective_batch_size());
        println!("  Pack Concurrency: {}", config.export.pack_concurrency);
        println!("  Compression: {:?}", config.export.compression);
        println!("  Output Directory: {}", config.export.output_dir);
        println!("  Overwrite: {}", config.export.overwrite);
        println!("  Fetch Concurrency: {}", config.fetcher.concurrency);
        println!("  Fetch Timeout: {}s", config.fetcher.timeout_seconds);
        println!("  Embed Mode: {:?}", config.packer.embed_mode);
        println!();
        Ok(0)
    }
}
