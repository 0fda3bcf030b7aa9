//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "archiver.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing article-archiver configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!(
                    "  2. Validate configuration: article-archiver -c {} validate-config",
                    self.output
                );
                println!(
                    "  3. Run export: article-archiver -c {} export --input articles.json --filename my-articles",
                    self.output
                );
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Sample configuration with every option and its default
    fn sample_config() -> &'static str {
        r#"# article-archiver configuration
#
# Every value below is the default. Values may reference environment
# variables as ${VAR_NAME}, and ARCHIVER_<SECTION>_<KEY> variables override
# any setting (for example ARCHIVER_EXPORT_PROFILE=album).

[application]
# trace | debug | info | warn | error
log_level = "info"

[fetcher]
timeout_seconds = 30
# Article requests in flight (1-64)
concurrency = 8
# user_agent = "article-archiver/<version>"

[fetcher.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

[packer]
# alongside: assets stored in asset_dir next to the article
# inline: assets embedded as data: URIs
embed_mode = "alongside"
asset_dir = "assets"
max_asset_bytes = 20971520
timeout_seconds = 30
# Relative image and stylesheet references resolve against this URL
# base_url = "https://blog.example.com/"

[export]
# collection: 100 articles per archive
# album: 5 articles per archive, for image-heavy content
profile = "collection"
# batch_size = 100
pack_concurrency = 1
# deflated | stored
compression = "deflated"
# Offset used for the date in folder names, e.g. 480 for UTC+8
utc_offset_minutes = 0
output_dir = "downloads"
overwrite = false

[logging]
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
    }
}
