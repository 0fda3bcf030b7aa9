//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Article Archiver - batched article export to zip archives
#[derive(Parser, Debug)]
#[command(name = "article-archiver")]
#[command(version, about, long_about = None)]
#[command(author = "Article Archiver Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, env = "ARCHIVER_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ARCHIVER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export articles from a manifest into zip archives
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
