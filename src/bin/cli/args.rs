//! CLI argument structures for the skald binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Transcript Topic-Labeling Pipeline
#[derive(Parser)]
#[command(name = "skald")]
#[command(version = VERSION)]
#[command(about = "🏷️  Skald - Topic labels for talk transcripts")]
#[command(long_about = "
Cluster a directory of STM talk transcripts by content and attach a
human-readable topic label to every file.

Common Usage:

  # Cluster transcripts with the default configuration
  skald analyze ./transcripts

  # Keep cleaned transcripts next to the mapping
  skald analyze ./transcripts --cleaned-dir ./cleaned

  # Pick the cluster count automatically
  skald analyze ./transcripts --auto-k

  # Strip STM markup without clustering
  skald clean ./transcripts --out ./cleaned

  # Start from a customizable configuration file
  skald init-config
  skald analyze ./transcripts --config skald.yml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster transcripts and write the topic mapping
    Analyze(Box<AnalyzeArgs>),

    /// Strip STM annotation markup from transcripts
    Clean(CleanArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate a skald configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Directory (or single file) of input transcripts
    pub input: PathBuf,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory for the topic mapping
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Also write cleaned transcripts into this directory
    #[arg(long)]
    pub cleaned_dir: Option<PathBuf>,

    /// Number of clusters (overrides the configuration)
    #[arg(short = 'k', long)]
    pub clusters: Option<usize>,

    /// Select the cluster count by silhouette scan
    #[arg(long)]
    pub auto_k: bool,

    /// Suppress decorative output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the clean command.
#[derive(Args)]
pub struct CleanArgs {
    /// Directory of input transcripts
    pub input: PathBuf,

    /// Directory for cleaned transcripts
    #[arg(long, default_value = "./cleaned")]
    pub out: PathBuf,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the init-config command.
#[derive(Args)]
pub struct InitConfigArgs {
    /// Output path for the configuration file
    #[arg(short, long, default_value = "skald.yml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the validate-config command.
#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    pub config: PathBuf,
}
