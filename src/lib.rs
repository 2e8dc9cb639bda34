//! # Skald: Transcript Topic-Labeling Pipeline
//!
//! A batch pipeline that attaches human-readable topic labels to a corpus of
//! talk transcripts. The pipeline is strictly one-directional:
//!
//! - **Text cleaning**: strip STM annotation markup from raw transcripts
//! - **Normalization**: tokenize, remove stopwords, lemmatize, detect phrases
//! - **Vectorization**: bag-of-words, TF-IDF, or sentence embeddings
//! - **Dimensionality reduction**: optional PCA projection
//! - **Clustering**: K-Means, LDA, or LSA with silhouette-based K selection
//! - **Labeling**: representative term per cluster, merged case-insensitively
//!
//! All model state (vocabulary, centroids, topic counts) is scoped to a single
//! pipeline run. A fixed random seed makes runs reproducible.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skald_rs::{PipelineOutcome, SkaldConfig, TopicPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SkaldConfig::default();
//!     let pipeline = TopicPipeline::new(config)?;
//!
//!     if let PipelineOutcome::Completed(results) = pipeline.run("./transcripts").await? {
//!         println!(
//!             "{} topics over {} documents",
//!             results.topic_count(),
//!             results.documents_processed
//!         );
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Core data structures and configuration
pub mod core {
    //! Core entities, configuration, and error types.

    pub mod config;
    pub mod corpus;
    pub mod errors;
}

// Text cleaning and normalization stages
pub mod text {
    //! STM transcript cleaning and text normalization.

    pub mod normalize;
    pub mod phrases;
    pub mod stm;
}

// Document vectorization stages
pub mod vectorize {
    //! Document vectorization: bag-of-words, TF-IDF, embeddings, PCA.

    pub mod bow;
    pub mod embed;
    pub mod pca;
    pub mod tfidf;
}

// Clustering and topic models
pub mod cluster {
    //! Clustering backends and cluster-count selection.

    pub mod kmeans;
    pub mod lda;
    pub mod lsa;
    pub mod selection;
}

// Cluster label assignment
pub mod label;

// I/O: input discovery and output artifacts
pub mod io {
    //! Transcript discovery and topic-mapping artifacts.

    pub mod discovery;
    pub mod mapping;
}

// Pipeline orchestration
pub mod pipeline {
    //! Batch pipeline orchestration and run results.

    pub mod executor;
    pub mod results;
    pub mod services;
}

// Re-export primary types for convenience
pub use crate::core::config::SkaldConfig;
pub use crate::core::errors::{Result, ResultExt, SkaldError};
pub use crate::io::mapping::TopicMapping;
pub use crate::pipeline::executor::TopicPipeline;
pub use crate::pipeline::results::PipelineOutcome;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
