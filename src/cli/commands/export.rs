//! Export command implementation
//!
//! This module implements the `export` command: read an article manifest, run
//! the export pipeline and print progress and a summary.

use crate::adapters::build_collaborators;
use crate::config::{load_config_or_default, ArchiverConfig, ExportProfile};
use crate::core::export::{ExportPipeline, ProgressTracker};
use crate::domain::{DownloadableArticle, ErrorKind};
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// JSON manifest holding an array of articles
    #[arg(short, long)]
    pub input: PathBuf,

    /// Base name of the produced archive(s), without extension
    #[arg(short, long)]
    pub filename: String,

    /// Override export profile (collection or album)
    #[arg(long)]
    pub profile: Option<String>,

    /// Override the number of articles per archive
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Override the directory archives are written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Replace archives that already exist
    #[arg(long)]
    pub overwrite: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{}", e.user_message());
                return Ok(2);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            eprintln!("{e}");
            return Ok(2);
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let articles = match read_manifest(&self.input).await {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(error = %e, input = %self.input.display(), "Failed to read manifest");
                eprintln!("Failed to read {}: {e:#}", self.input.display());
                return Ok(2);
            }
        };

        let pipeline = match build_collaborators(&config)
            .and_then(|collaborators| ExportPipeline::new(&config.export, collaborators))
        {
            Ok(p) => p.with_shutdown(shutdown_signal),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export pipeline");
                eprintln!("{}", e.user_message());
                return Ok(2);
            }
        };

        println!("🚀 Exporting {} article(s)", articles.len());
        println!("  Profile: {}", config.export.profile);
        println!("  Batch size: {}", pipeline.batch_size());
        println!("  Output directory: {}", config.export.output_dir);
        println!();

        let printer = spawn_progress_printer(pipeline.progress());
        let result = pipeline.download(articles, &self.filename).await;
        drop(pipeline);
        let _ = printer.await;

        let summary = match result {
            Ok(s) => s,
            Err(e) => {
                eprintln!();
                eprintln!("❌ {}", e.user_message());
                eprintln!("   {e}");
                return Ok(match e.kind() {
                    ErrorKind::InvalidConfiguration => 2,
                    _ => 1,
                });
            }
        };

        println!();
        println!("📊 Export Summary:");
        println!("  Articles: {}", summary.total_articles);
        println!("  Packed: {}", summary.packed_articles);
        println!(
            "  Archives: {} of {}",
            summary.artifacts.len(),
            summary.total_batches
        );
        for artifact in &summary.artifacts {
            println!(
                "    - {} ({} articles, {} bytes)",
                artifact.filename, artifact.entries, artifact.size_bytes
            );
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        let exit_code = if summary.interrupted {
            println!("⚠️  Export interrupted. Archives already written are complete.");
            tracing::info!("Export interrupted by user signal");
            130
        } else {
            println!("✅ Export completed successfully!");
            0
        };

        Ok(exit_code)
    }

    fn apply_overrides(&self, config: &mut ArchiverConfig) -> Result<(), String> {
        if let Some(profile) = &self.profile {
            tracing::info!(profile = %profile, "Overriding export profile from CLI");
            config.export.profile = profile.parse::<ExportProfile>()?;
        }
        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size, "Overriding batch size from CLI");
            config.export.batch_size = Some(batch_size);
        }
        if let Some(output_dir) = &self.output_dir {
            tracing::info!(output_dir = %output_dir, "Overriding output directory from CLI");
            config.export.output_dir = output_dir.clone();
        }
        if self.overwrite {
            config.export.overwrite = true;
        }
        Ok(())
    }
}

/// Reads a JSON array of articles
pub async fn read_manifest(path: &Path) -> anyhow::Result<Vec<DownloadableArticle>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .context("cannot read manifest")?;
    let articles: Vec<DownloadableArticle> =
        serde_json::from_str(&contents).context("manifest is not a valid article list")?;
    Ok(articles)
}

/// Prints each new phase label until the run ends
fn spawn_progress_printer(progress: Arc<ProgressTracker>) -> JoinHandle<()> {
    let mut rx = progress.subscribe();
    drop(progress);

    tokio::spawn(async move {
        let mut last_phase = String::new();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.phase != last_phase {
                println!("  ⏳ {}", snapshot.phase);
                last_phase = snapshot.phase;
            }
            if snapshot.state.is_terminal() {
                break;
            }
        }
    })
}
