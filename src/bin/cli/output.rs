//! Console formatting and result display for the skald binary.

use std::path::Path;

use console::style;

use skald_rs::core::config::{ClusterMethod, SkaldConfig, VectorizerMethod};
use skald_rs::pipeline::results::PipelineResults;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Print the CLI banner.
pub fn print_header() {
    println!(
        "{} {}",
        style("🏷️  Skald").cyan().bold(),
        style(format!("v{VERSION}")).dim()
    );
    println!("{}", style("Topic labels for talk transcripts").dim());
    println!();
}

/// Show the configuration the run will use.
pub fn display_config_summary(config: &SkaldConfig) {
    let vectorizer = match config.vectorize.method {
        VectorizerMethod::Bow => "bag-of-words",
        VectorizerMethod::TfIdf => "tf-idf",
        VectorizerMethod::Embedding => "sentence embeddings",
    };
    let clusterer = match config.cluster.method {
        ClusterMethod::KMeans => "k-means",
        ClusterMethod::Lda => "lda",
        ClusterMethod::Lsa => "lsa",
    };
    let k_display = if config.cluster.auto_k {
        format!("auto [{}..{}]", config.cluster.k_min, config.cluster.k_max)
    } else {
        config.cluster.num_clusters.to_string()
    };

    println!("{}", style("⚙️  Configuration").blue().bold());
    println!("   Vectorizer: {}", style(vectorizer).cyan());
    println!("   Clustering: {}", style(clusterer).cyan());
    println!("   Clusters:   {}", style(k_display).cyan());
    if let Some(components) = config.vectorize.pca_components {
        println!("   PCA:        {} components", style(components).cyan());
    }
    if config.labeling.llm.is_some() {
        println!("   Labeling:   {}", style("remote LLM").cyan());
    }
    println!();
}

/// Show per-topic results after a completed run.
pub fn display_results(results: &PipelineResults) {
    println!("{}", style("📊 Topics").blue().bold());
    for (label, files) in results.mapping.iter() {
        println!(
            "   {} {}",
            style(label).green().bold(),
            style(format!("({} files)", files.len())).dim()
        );
        for file in files {
            println!("      {file}");
        }
    }
    println!();
}

/// Show the closing summary line.
pub fn display_completion_summary(results: &PipelineResults, mapping_path: &Path) {
    println!(
        "{} {} topics across {} documents in {:.2}s",
        style("✅ Done:").green().bold(),
        results.topic_count(),
        results.documents_processed,
        results.duration_seconds
    );
    if results.documents_skipped > 0 {
        println!(
            "   {} documents skipped (empty after preprocessing)",
            style(results.documents_skipped).yellow()
        );
    }
    if let Some(score) = results.silhouette {
        println!("   silhouette score: {score:.4}");
    }
    println!(
        "   mapping written to {}",
        style(mapping_path.display()).cyan()
    );
}
