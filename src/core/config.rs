//! Configuration types and management for skald.
//!
//! The configuration tree mirrors the pipeline stages: text normalization,
//! vectorization, clustering, labeling, and I/O. Every model and tokenizer is
//! constructed from this tree at the start of a run; nothing is loaded at
//! import time or shared across runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SkaldError};

/// Validate that a value is strictly positive.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(SkaldError::config_field(
            format!("{field} must be greater than zero"),
            field,
        ));
    }
    Ok(())
}

/// Validate that a float lies in the closed unit range.
pub fn validate_unit_range(value: f64, field: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SkaldError::config_field(
            format!("{field} must be in [0.0, 1.0], got {value}"),
            field,
        ));
    }
    Ok(())
}

/// Validate that a float is strictly positive and finite.
pub fn validate_positive_f64(value: f64, field: &str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SkaldError::config_field(
            format!("{field} must be a positive finite number, got {value}"),
            field,
        ));
    }
    Ok(())
}

/// Main configuration for the skald pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkaldConfig {
    /// Text normalization settings
    #[serde(default)]
    pub text: TextConfig,

    /// Vectorization settings
    #[serde(default)]
    pub vectorize: VectorizeConfig,

    /// Clustering settings
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Label assignment settings
    #[serde(default)]
    pub labeling: LabelingConfig,

    /// Input discovery and artifact settings
    #[serde(default)]
    pub io: IoConfig,

    /// Seed for all randomized stages; a fixed seed reproduces identical
    /// cluster assignments and labels across runs
    #[serde(default = "SkaldConfig::default_random_seed")]
    pub random_seed: u64,
}

impl Default for SkaldConfig {
    fn default() -> Self {
        Self {
            text: TextConfig::default(),
            vectorize: VectorizeConfig::default(),
            cluster: ClusterConfig::default(),
            labeling: LabelingConfig::default(),
            io: IoConfig::default(),
            random_seed: Self::default_random_seed(),
        }
    }
}

impl SkaldConfig {
    /// Default random seed used across the CLI and public API.
    pub const fn default_random_seed() -> u64 {
        42
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SkaldError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            SkaldError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        self.text.validate()?;
        self.vectorize.validate()?;
        self.cluster.validate()?;
        self.labeling.validate()?;
        self.io.validate()?;

        // LDA and LSA factorize a term matrix, which embeddings do not have
        if self.vectorize.method == VectorizerMethod::Embedding
            && matches!(self.cluster.method, ClusterMethod::Lda | ClusterMethod::Lsa)
        {
            return Err(SkaldError::config_field(
                "LDA and LSA clustering require a term-based vectorizer (bow or tf_idf)",
                "cluster.method",
            ));
        }

        Ok(())
    }
}

/// Text normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Minimum token length kept after normalization (shorter tokens dropped)
    #[serde(default = "TextConfig::default_min_token_len")]
    pub min_token_len: usize,

    /// Apply rule-based lemmatization
    #[serde(default = "TextConfig::default_lemmatize")]
    pub lemmatize: bool,

    /// Corpus-specific stopwords removed in addition to the built-in English set
    #[serde(default)]
    pub extra_stopwords: Vec<String>,

    /// Merge frequent adjacent token pairs into single phrase tokens
    #[serde(default)]
    pub detect_phrases: bool,

    /// Minimum co-occurrence count for a phrase candidate
    #[serde(default = "TextConfig::default_phrase_min_count")]
    pub phrase_min_count: usize,

    /// Score threshold for accepting a phrase candidate
    #[serde(default = "TextConfig::default_phrase_threshold")]
    pub phrase_threshold: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_token_len: Self::default_min_token_len(),
            lemmatize: Self::default_lemmatize(),
            extra_stopwords: Vec::new(),
            detect_phrases: false,
            phrase_min_count: Self::default_phrase_min_count(),
            phrase_threshold: Self::default_phrase_threshold(),
        }
    }
}

impl TextConfig {
    /// Tokens of one or two characters carry no topical signal.
    const fn default_min_token_len() -> usize {
        3
    }

    const fn default_lemmatize() -> bool {
        true
    }

    const fn default_phrase_min_count() -> usize {
        5
    }

    fn default_phrase_threshold() -> f64 {
        10.0
    }

    /// Validate text configuration
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.min_token_len, "text.min_token_len")?;
        if self.detect_phrases {
            validate_positive_usize(self.phrase_min_count, "text.phrase_min_count")?;
            validate_positive_f64(self.phrase_threshold, "text.phrase_threshold")?;
        }
        Ok(())
    }
}

/// Document vectorization method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorizerMethod {
    /// Raw term counts over a fitted vocabulary
    Bow,
    /// TF-IDF weighting with L2 row normalization
    TfIdf,
    /// Sentence embeddings from a local pretrained model
    Embedding,
}

/// Vectorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizeConfig {
    /// Vectorization method
    #[serde(default = "VectorizeConfig::default_method")]
    pub method: VectorizerMethod,

    /// Smallest n-gram length included in the vocabulary
    #[serde(default = "VectorizeConfig::default_ngram_min")]
    pub ngram_min: usize,

    /// Largest n-gram length included in the vocabulary
    #[serde(default = "VectorizeConfig::default_ngram_max")]
    pub ngram_max: usize,

    /// Project the document matrix down to this many principal components
    /// before clustering (None disables PCA)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pca_components: Option<usize>,

    /// Embedding model settings (only used with the embedding method)
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Default for VectorizeConfig {
    fn default() -> Self {
        Self {
            method: Self::default_method(),
            ngram_min: Self::default_ngram_min(),
            ngram_max: Self::default_ngram_max(),
            pca_components: None,
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl VectorizeConfig {
    const fn default_method() -> VectorizerMethod {
        VectorizerMethod::TfIdf
    }

    const fn default_ngram_min() -> usize {
        1
    }

    const fn default_ngram_max() -> usize {
        1
    }

    /// Validate vectorization configuration
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.ngram_min, "vectorize.ngram_min")?;
        validate_positive_usize(self.ngram_max, "vectorize.ngram_max")?;
        if self.ngram_min > self.ngram_max {
            return Err(SkaldError::config_field(
                format!(
                    "ngram_min ({}) must not exceed ngram_max ({})",
                    self.ngram_min, self.ngram_max
                ),
                "vectorize.ngram_min",
            ));
        }
        if self.ngram_max > 3 {
            return Err(SkaldError::config_field(
                "n-grams longer than 3 are not supported",
                "vectorize.ngram_max",
            ));
        }
        if let Some(components) = self.pca_components {
            validate_positive_usize(components, "vectorize.pca_components")?;
        }
        Ok(())
    }
}

/// Pretrained embedding model selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingModelKind {
    /// all-MiniLM-L6-v2, 384 dimensions
    AllMiniLmL6V2,
    /// BGE small English v1.5, 384 dimensions
    BgeSmallEnV15,
    /// Nomic embed text v1.5, 768 dimensions
    NomicEmbedTextV15,
}

impl EmbeddingModelKind {
    /// Fixed output width of the model.
    pub const fn dimension(&self) -> usize {
        match self {
            Self::AllMiniLmL6V2 | Self::BgeSmallEnV15 => 384,
            Self::NomicEmbedTextV15 => 768,
        }
    }
}

/// Embedding vectorizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Which pretrained model to load
    #[serde(default = "EmbeddingConfig::default_model")]
    pub model: EmbeddingModelKind,

    /// Directory for downloaded model weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Show a download progress bar for model weights
    #[serde(default)]
    pub show_download_progress: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

impl EmbeddingConfig {
    const fn default_model() -> EmbeddingModelKind {
        EmbeddingModelKind::AllMiniLmL6V2
    }
}

/// Clustering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMethod {
    /// K-Means with k-means++ initialization
    KMeans,
    /// Latent Dirichlet Allocation via collapsed Gibbs sampling
    Lda,
    /// Latent Semantic Analysis via truncated SVD
    Lsa,
}

/// Clustering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Clustering backend
    #[serde(default = "ClusterConfig::default_method")]
    pub method: ClusterMethod,

    /// Target cluster count K (ignored when auto_k is set)
    #[serde(default = "ClusterConfig::default_num_clusters")]
    pub num_clusters: usize,

    /// Choose K by scanning [k_min, k_max] for the best silhouette score
    #[serde(default)]
    pub auto_k: bool,

    /// Smallest K considered by the scan
    #[serde(default = "ClusterConfig::default_k_min")]
    pub k_min: usize,

    /// Largest K considered by the scan
    #[serde(default = "ClusterConfig::default_k_max")]
    pub k_max: usize,

    /// Maximum Lloyd iterations for K-Means
    #[serde(default = "ClusterConfig::default_max_iterations")]
    pub max_iterations: usize,

    /// LDA-specific hyperparameters
    #[serde(default)]
    pub lda: LdaParams,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            method: Self::default_method(),
            num_clusters: Self::default_num_clusters(),
            auto_k: false,
            k_min: Self::default_k_min(),
            k_max: Self::default_k_max(),
            max_iterations: Self::default_max_iterations(),
            lda: LdaParams::default(),
        }
    }
}

impl ClusterConfig {
    const fn default_method() -> ClusterMethod {
        ClusterMethod::KMeans
    }

    const fn default_num_clusters() -> usize {
        8
    }

    const fn default_k_min() -> usize {
        2
    }

    const fn default_k_max() -> usize {
        10
    }

    const fn default_max_iterations() -> usize {
        100
    }

    /// Validate clustering configuration
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.max_iterations, "cluster.max_iterations")?;
        if self.auto_k {
            if self.k_min < 2 {
                return Err(SkaldError::config_field(
                    "k_min must be at least 2 for silhouette selection",
                    "cluster.k_min",
                ));
            }
            if self.k_min > self.k_max {
                return Err(SkaldError::config_field(
                    format!("k_min ({}) must not exceed k_max ({})", self.k_min, self.k_max),
                    "cluster.k_min",
                ));
            }
        } else if self.num_clusters < 2 {
            return Err(SkaldError::config_field(
                "num_clusters must be at least 2",
                "cluster.num_clusters",
            ));
        }
        self.lda.validate()
    }
}

/// Hyperparameters for the LDA Gibbs sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdaParams {
    /// Dirichlet prior on document-topic distributions
    #[serde(default = "LdaParams::default_alpha")]
    pub alpha: f64,

    /// Dirichlet prior on topic-word distributions
    #[serde(default = "LdaParams::default_beta")]
    pub beta: f64,

    /// Full Gibbs passes over the corpus
    #[serde(default = "LdaParams::default_passes")]
    pub passes: usize,
}

impl Default for LdaParams {
    fn default() -> Self {
        Self {
            alpha: Self::default_alpha(),
            beta: Self::default_beta(),
            passes: Self::default_passes(),
        }
    }
}

impl LdaParams {
    fn default_alpha() -> f64 {
        0.1
    }

    fn default_beta() -> f64 {
        0.01
    }

    const fn default_passes() -> usize {
        15
    }

    /// Validate LDA hyperparameters
    pub fn validate(&self) -> Result<()> {
        validate_positive_f64(self.alpha, "cluster.lda.alpha")?;
        validate_positive_f64(self.beta, "cluster.lda.beta")?;
        validate_positive_usize(self.passes, "cluster.lda.passes")?;
        Ok(())
    }
}

/// Label assignment configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Optional remote LLM labeler; when absent, labels come from the
    /// highest-weighted vocabulary term per cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,
}

impl LabelingConfig {
    /// Validate labeling configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(llm) = &self.llm {
            llm.validate()?;
        }
        Ok(())
    }
}

/// Remote LLM labeler settings. Requests are issued one cluster at a time
/// with no retries; a failed call aborts the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL
    pub endpoint: String,

    /// Model identifier sent with each request
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "LlmConfig::default_api_key_env")]
    pub api_key_env: String,

    /// How many top cluster terms to include in the prompt
    #[serde(default = "LlmConfig::default_top_terms")]
    pub top_terms: usize,
}

impl LlmConfig {
    fn default_api_key_env() -> String {
        "SKALD_API_KEY".to_string()
    }

    const fn default_top_terms() -> usize {
        10
    }

    /// Validate LLM configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(SkaldError::config_field(
                "LLM endpoint must not be empty",
                "labeling.llm.endpoint",
            ));
        }
        if self.model.is_empty() {
            return Err(SkaldError::config_field(
                "LLM model must not be empty",
                "labeling.llm.model",
            ));
        }
        validate_positive_usize(self.top_terms, "labeling.llm.top_terms")?;
        Ok(())
    }
}

/// Input discovery and artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    /// File extension of input transcripts
    #[serde(default = "IoConfig::default_input_extension")]
    pub input_extension: String,

    /// Glob patterns excluded from discovery
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Maximum transcript size in bytes (larger files are skipped)
    #[serde(default = "IoConfig::default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// File name of the topic-mapping artifact
    #[serde(default = "IoConfig::default_mapping_file")]
    pub mapping_file: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_extension: Self::default_input_extension(),
            exclude_patterns: Vec::new(),
            max_file_size_bytes: Self::default_max_file_size_bytes(),
            mapping_file: Self::default_mapping_file(),
        }
    }
}

impl IoConfig {
    fn default_input_extension() -> String {
        "stm".to_string()
    }

    /// Default maximum transcript size: 2MB
    pub const fn default_max_file_size_bytes() -> u64 {
        2 * 1024 * 1024
    }

    fn default_mapping_file() -> String {
        "topic_mappings.json".to_string()
    }

    /// Validate I/O configuration
    pub fn validate(&self) -> Result<()> {
        if self.input_extension.is_empty() {
            return Err(SkaldError::config_field(
                "input_extension must not be empty",
                "io.input_extension",
            ));
        }
        if self.mapping_file.is_empty() {
            return Err(SkaldError::config_field(
                "mapping_file must not be empty",
                "io.mapping_file",
            ));
        }
        Ok(())
    }
}
