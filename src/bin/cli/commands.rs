//! Command execution logic for the skald binary.

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use skald_rs::core::config::SkaldConfig;
use skald_rs::io::discovery;
use skald_rs::pipeline::results::PipelineOutcome;
use skald_rs::text::stm;
use skald_rs::TopicPipeline;

use crate::cli::args::*;
use crate::cli::output::*;

/// Main analyze command implementation
pub async fn analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    if !args.quiet {
        print_header();
    }

    let mut config = load_configuration(args.config.as_deref()).await?;
    if let Some(k) = args.clusters {
        config.cluster.num_clusters = k;
    }
    if args.auto_k {
        config.cluster.auto_k = true;
    }

    if !args.input.exists() {
        eprintln!(
            "  {} {}",
            style("❌ Input path does not exist:").red(),
            args.input.display()
        );
        std::process::exit(1);
    }

    if !args.quiet {
        display_config_summary(&config);
        println!(
            "{} {}",
            style("📂 Input:").bold(),
            style(args.input.display()).cyan()
        );
        println!(
            "{} {}",
            style("📁 Output directory:").bold(),
            style(args.out.display()).cyan()
        );
        println!();
    }

    tokio::fs::create_dir_all(&args.out).await?;

    let pipeline = TopicPipeline::new(config)?;

    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
        pb.set_message("Clustering transcripts...");
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    let outcome = pipeline
        .run_with_cleaned_output(&args.input, args.cleaned_dir.as_deref())
        .await;

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    match outcome? {
        PipelineOutcome::NoInput => {
            println!(
                "{} {}",
                style("⚠️  No input found under").yellow(),
                args.input.display()
            );
            Ok(())
        }
        PipelineOutcome::Completed(results) => {
            let mapping_path = args.out.join(&pipeline.config().io.mapping_file);
            results.mapping.to_json_file(&mapping_path)?;

            if !args.quiet {
                display_results(&results);
                display_completion_summary(&results, &mapping_path);
            }
            Ok(())
        }
    }
}

/// Clean transcripts without running the clustering stages.
pub async fn clean_command(args: CleanArgs) -> anyhow::Result<()> {
    let config = load_configuration(args.config.as_deref()).await?;

    let transcripts = discovery::discover_transcripts(&args.input, &config.io)?;
    if transcripts.is_empty() {
        println!(
            "{} {}",
            style("⚠️  No input found under").yellow(),
            args.input.display()
        );
        return Ok(());
    }

    let corpus = stm::clean_directory(&args.input, &args.out, &transcripts)?;
    println!(
        "{} {} {}",
        style("✅ Cleaned").green().bold(),
        corpus.len(),
        style(format!("transcripts into {}", args.out.display())).cyan()
    );
    Ok(())
}

/// Print default configuration in YAML format
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("{}", style("# Default skald configuration").dim());
    println!(
        "{}",
        style("# Save this to a file and customize as needed").dim()
    );
    let yaml_output = serde_yaml::to_string(&SkaldConfig::default())?;
    println!("{}", yaml_output);
    Ok(())
}

/// Initialize a configuration file with defaults
pub async fn init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        eprintln!(
            "{} {}",
            style("❌ Configuration file already exists:").red(),
            args.output.display()
        );
        eprintln!("   Use --force to overwrite or choose a different name with --output");
        std::process::exit(1);
    }

    SkaldConfig::default().to_yaml_file(&args.output)?;

    println!(
        "{} {}",
        style("✅ Configuration saved to:").green().bold(),
        style(args.output.display()).cyan()
    );
    println!();
    println!("{}", style("📝 Next steps:").blue().bold());
    println!("   1. Edit the configuration file to customize the pipeline");
    println!(
        "   2. Run analysis with: {}",
        style(format!(
            "skald analyze <input> --config {}",
            args.output.display()
        ))
        .cyan()
    );
    Ok(())
}

/// Validate a skald configuration file
pub async fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        style("🔍 Validating configuration:").blue().bold(),
        style(args.config.display()).cyan()
    );
    println!();

    match SkaldConfig::from_yaml_file(&args.config) {
        Ok(config) => {
            config.validate()?;
            println!(
                "{}",
                style("✅ Configuration file is valid!").green().bold()
            );
            display_config_summary(&config);
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{} {}",
                style("❌ Configuration validation failed:").red(),
                e
            );
            std::process::exit(1);
        }
    }
}

/// Load configuration from a file, or fall back to defaults.
pub async fn load_configuration(config_path: Option<&Path>) -> anyhow::Result<SkaldConfig> {
    let config = match config_path {
        Some(path) => {
            println!(
                "{} {}",
                style("✅ Loading configuration from").green(),
                style(path.display()).cyan()
            );
            SkaldConfig::from_yaml_file(path)?
        }
        None => SkaldConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
