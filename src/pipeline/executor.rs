//! Pipeline orchestration.
//!
//! Runs the full topic-labeling sequence: discover transcripts, clean STM
//! markup, normalize text, vectorize, optionally reduce, cluster, label, and
//! assemble the topic-to-filenames mapping.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ndarray::Array2;
use tracing::{info, warn};

use crate::cluster::kmeans::KMeans;
use crate::cluster::lda::LdaModel;
use crate::cluster::lsa::LsaModel;
use crate::cluster::selection;
use crate::core::config::{ClusterMethod, SkaldConfig, VectorizerMethod};
use crate::core::corpus::{Corpus, Document, TokenizedCorpus};
use crate::core::errors::{Result, SkaldError};
use crate::io::mapping::TopicMapping;
use crate::label;
use crate::label::llm::LlmLabeler;
use crate::pipeline::results::{PipelineOutcome, PipelineResults};
use crate::pipeline::services::{
    BatchedTranscriptReader, TranscriptBatchReader, TranscriptDiscoverer, WalkingDiscoverer,
};
use crate::text::normalize::TextNormalizer;
use crate::text::stm;
use crate::vectorize::bow::{CountVectorizer, Vocabulary};
use crate::vectorize::pca;
use crate::vectorize::tfidf::TfIdfVectorizer;

/// How many top terms to rank per cluster when no LLM labeler is configured.
const DEFAULT_TERMS_PER_CLUSTER: usize = 10;

/// Document matrix plus the term-space artifacts needed downstream.
struct VectorizedCorpus {
    matrix: Array2<f64>,
    vocabulary: Option<Vocabulary>,
    id_documents: Option<Vec<Vec<usize>>>,
}

/// Cluster assignments plus ranked label-candidate terms.
struct ClusterOutput {
    assignments: Vec<usize>,
    top_terms: Vec<Vec<String>>,
    k: usize,
    silhouette: Option<f64>,
}

/// The end-to-end topic-labeling pipeline.
pub struct TopicPipeline {
    config: SkaldConfig,
    discoverer: Arc<dyn TranscriptDiscoverer>,
    reader: Arc<dyn TranscriptBatchReader>,
}

impl TopicPipeline {
    /// Create a pipeline with default filesystem services.
    ///
    /// Fails if the configuration is invalid.
    pub fn new(config: SkaldConfig) -> Result<Self> {
        Self::with_services(
            config,
            WalkingDiscoverer::shared(),
            BatchedTranscriptReader::default_shared(),
        )
    }

    /// Create a pipeline with injected discovery and read services.
    pub fn with_services(
        config: SkaldConfig,
        discoverer: Arc<dyn TranscriptDiscoverer>,
        reader: Arc<dyn TranscriptBatchReader>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            discoverer,
            reader,
        })
    }

    /// The validated configuration this pipeline runs with.
    pub fn config(&self) -> &SkaldConfig {
        &self.config
    }

    /// Run the pipeline over the transcripts under `input_root`.
    pub async fn run(&self, input_root: impl AsRef<Path>) -> Result<PipelineOutcome> {
        self.run_with_cleaned_output(input_root.as_ref(), None).await
    }

    /// Run the pipeline, additionally writing cleaned transcripts into
    /// `cleaned_dir` when provided.
    pub async fn run_with_cleaned_output(
        &self,
        input_root: &Path,
        cleaned_dir: Option<&Path>,
    ) -> Result<PipelineOutcome> {
        let started = Instant::now();

        let transcripts = self.discoverer.discover(input_root, &self.config.io)?;
        if transcripts.is_empty() {
            warn!("No input found under {}", input_root.display());
            return Ok(PipelineOutcome::NoInput);
        }
        info!("Discovered {} transcript files", transcripts.len());

        let corpus = self.clean(&transcripts, cleaned_dir).await?;

        let normalizer = TextNormalizer::new(&self.config.text);
        let tokenized = normalizer.normalize_corpus(&corpus);
        let skipped = corpus.len() - tokenized.len();
        if tokenized.is_empty() {
            warn!(
                "No input found under {}: every transcript was empty after preprocessing",
                input_root.display()
            );
            return Ok(PipelineOutcome::NoInput);
        }
        info!(
            "Normalized {} documents ({} skipped as empty)",
            tokenized.len(),
            skipped
        );

        let VectorizedCorpus {
            matrix,
            vocabulary,
            id_documents,
        } = self.vectorize(&tokenized)?;
        let (matrix, term_columns) = self.maybe_reduce(matrix);

        let clustered = self.cluster(
            &matrix,
            vocabulary.as_ref(),
            id_documents.as_deref(),
            term_columns,
            &tokenized,
        )?;
        info!(
            "Clustered {} documents into {} topics",
            tokenized.len(),
            clustered.k
        );

        let labels = self.label_clusters(&clustered.top_terms).await?;

        let mut mapping = TopicMapping::new();
        for (doc_idx, &cluster) in clustered.assignments.iter().enumerate() {
            mapping.insert(&labels[cluster], tokenized.ids[doc_idx].clone());
        }

        let results = PipelineResults::new(
            tokenized.len(),
            skipped,
            clustered.k,
            clustered.silhouette,
            mapping,
            started.elapsed().as_secs_f64(),
        );
        info!(
            "Pipeline completed in {:.2}s: {} topics across {} documents",
            results.duration_seconds,
            results.topic_count(),
            results.documents_processed
        );
        Ok(PipelineOutcome::Completed(results))
    }

    /// Read and clean all transcripts, optionally persisting cleaned copies.
    async fn clean(
        &self,
        transcripts: &[std::path::PathBuf],
        cleaned_dir: Option<&Path>,
    ) -> Result<Corpus> {
        let contents = self.reader.read_files(transcripts).await?;

        if let Some(dir) = cleaned_dir {
            std::fs::create_dir_all(dir).map_err(|e| {
                SkaldError::io(
                    format!("Failed to create output directory {}", dir.display()),
                    e,
                )
            })?;
        }

        let mut corpus = Corpus::new();
        for (path, content) in contents {
            let document = Document::new(path, stm::clean_text(&content));
            if let Some(dir) = cleaned_dir {
                let target = dir.join(&document.file_name);
                std::fs::write(&target, &document.text).map_err(|e| {
                    SkaldError::io(format!("Failed to write {}", target.display()), e)
                })?;
            }
            corpus.push(document);
        }
        Ok(corpus)
    }

    fn vectorize(&self, tokenized: &TokenizedCorpus) -> Result<VectorizedCorpus> {
        let cfg = &self.config.vectorize;
        match cfg.method {
            VectorizerMethod::Bow => {
                let mut vectorizer = CountVectorizer::new(cfg.ngram_min, cfg.ngram_max);
                let matrix = vectorizer.fit_transform(&tokenized.documents)?;
                let id_documents = vectorizer.id_documents(&tokenized.documents);
                Ok(VectorizedCorpus {
                    matrix,
                    vocabulary: Some(vectorizer.vocabulary().clone()),
                    id_documents: Some(id_documents),
                })
            }
            VectorizerMethod::TfIdf => {
                let mut vectorizer = TfIdfVectorizer::new(cfg.ngram_min, cfg.ngram_max);
                let matrix = vectorizer.fit_transform(&tokenized.documents)?;
                let id_documents = vectorizer.id_documents(&tokenized.documents);
                Ok(VectorizedCorpus {
                    matrix,
                    vocabulary: Some(vectorizer.vocabulary().clone()),
                    id_documents: Some(id_documents),
                })
            }
            VectorizerMethod::Embedding => {
                let vectorizer =
                    crate::vectorize::embed::EmbeddingVectorizer::new(&cfg.embedding)?;
                let matrix = vectorizer.embed_documents(&tokenized.joined_texts())?;
                Ok(VectorizedCorpus {
                    matrix,
                    vocabulary: None,
                    id_documents: None,
                })
            }
        }
    }

    /// Apply PCA when configured. Reduction failures are logged and the
    /// original matrix is kept, so a degenerate matrix never kills the run.
    ///
    /// The returned flag is true while matrix columns still index the fitted
    /// vocabulary; after a reduction they are principal components instead.
    fn maybe_reduce(&self, matrix: Array2<f64>) -> (Array2<f64>, bool) {
        let Some(components) = self.config.vectorize.pca_components else {
            return (matrix, true);
        };
        match pca::project(&matrix, components) {
            Ok(reduced) => {
                info!(
                    "Reduced matrix from {} to {} dimensions",
                    matrix.ncols(),
                    reduced.ncols()
                );
                (reduced, false)
            }
            Err(e) => {
                warn!("Skipping PCA: {e}");
                (matrix, true)
            }
        }
    }

    fn cluster(
        &self,
        matrix: &Array2<f64>,
        vocabulary: Option<&Vocabulary>,
        id_documents: Option<&[Vec<usize>]>,
        term_columns: bool,
        tokenized: &TokenizedCorpus,
    ) -> Result<ClusterOutput> {
        let cfg = &self.config.cluster;
        let seed = self.config.random_seed;
        let terms_per_cluster = self
            .config
            .labeling
            .llm
            .as_ref()
            .map(|llm| llm.top_terms)
            .unwrap_or(DEFAULT_TERMS_PER_CLUSTER);

        let (k, silhouette) = if cfg.auto_k {
            let selection =
                selection::select_k(matrix, cfg.k_min, cfg.k_max, cfg.max_iterations, seed)?;
            let score = selection
                .scores
                .iter()
                .find(|(candidate, _)| *candidate == selection.chosen_k)
                .map(|(_, score)| *score);
            info!("Auto-selected k={} by silhouette scan", selection.chosen_k);
            (selection.chosen_k, score)
        } else {
            (cfg.num_clusters, None)
        };

        match cfg.method {
            ClusterMethod::KMeans => {
                let fit = KMeans::new(k, cfg.max_iterations, seed).fit(matrix)?;
                // Centroid weights only name terms while the matrix still has
                // a term axis; after PCA the clusters are labeled from the
                // token counts of their member documents
                let top_terms = match vocabulary {
                    Some(vocab) if term_columns => label::top_terms_for_clusters(
                        &fit.centroids,
                        vocab,
                        terms_per_cluster,
                        false,
                    ),
                    _ => label::top_terms_from_assignments(
                        &tokenized.documents,
                        &fit.assignments,
                        k,
                        terms_per_cluster,
                    ),
                };
                Ok(ClusterOutput {
                    assignments: fit.assignments,
                    top_terms,
                    k,
                    silhouette,
                })
            }
            ClusterMethod::Lda => {
                let vocab = vocabulary.ok_or_else(|| {
                    SkaldError::pipeline("cluster", "LDA requires a fitted vocabulary")
                })?;
                // Ids must come from the vectorizer that fitted the vocabulary,
                // otherwise topic-term columns name the wrong terms
                let id_documents = id_documents.ok_or_else(|| {
                    SkaldError::pipeline("cluster", "LDA requires id-encoded documents")
                })?;
                let model = LdaModel::new(k, cfg.lda.alpha, cfg.lda.beta, cfg.lda.passes, seed);
                let fit = model.fit(id_documents, vocab.len())?;
                let top_terms = label::top_terms_for_clusters(
                    &fit.topic_term,
                    vocab,
                    terms_per_cluster,
                    false,
                );
                Ok(ClusterOutput {
                    assignments: fit.assignments,
                    top_terms,
                    k,
                    silhouette,
                })
            }
            ClusterMethod::Lsa => {
                let fit = LsaModel::new(k).fit(matrix)?;
                // Component loadings index matrix columns, so they only name
                // terms while no reduction has replaced the term axis
                let top_terms = match vocabulary {
                    Some(vocab) if term_columns => label::top_terms_for_clusters(
                        &fit.topic_term,
                        vocab,
                        terms_per_cluster,
                        true,
                    ),
                    _ => label::top_terms_from_assignments(
                        &tokenized.documents,
                        &fit.assignments,
                        k,
                        terms_per_cluster,
                    ),
                };
                Ok(ClusterOutput {
                    assignments: fit.assignments,
                    top_terms,
                    k,
                    silhouette,
                })
            }
        }
    }

    async fn label_clusters(&self, top_terms: &[Vec<String>]) -> Result<Vec<String>> {
        match &self.config.labeling.llm {
            Some(llm_config) => {
                let labeler = LlmLabeler::new(llm_config)?;
                labeler.label_clusters(top_terms).await
            }
            None => Ok(label::term_labels(top_terms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ClusterConfig;
    use std::fs;
    use tempfile::TempDir;

    fn write_stm(dir: &Path, name: &str, lines: &[&str]) {
        let content: String = lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                format!(
                    "{name} 1 {name} {}.0 {}.0 <o,f0,male> {text}\n",
                    i * 10,
                    i * 10 + 9
                )
            })
            .collect();
        fs::write(dir.join(format!("{name}.stm")), content).unwrap();
    }

    fn test_config(k: usize) -> SkaldConfig {
        let mut config = SkaldConfig::default();
        config.text.lemmatize = false;
        config.text.detect_phrases = false;
        config.cluster = ClusterConfig {
            num_clusters: k,
            ..ClusterConfig::default()
        };
        config
    }

    #[tokio::test]
    async fn empty_directory_yields_no_input() {
        let dir = TempDir::new().unwrap();
        let pipeline = TopicPipeline::new(test_config(2)).unwrap();
        let outcome = pipeline.run(dir.path()).await.unwrap();
        assert!(!outcome.is_completed());
    }

    #[tokio::test]
    async fn transcripts_with_only_markup_are_no_input() {
        let dir = TempDir::new().unwrap();
        for i in 0..3 {
            write_stm(
                dir.path(),
                &format!("talk_{i}"),
                &["ignore_time_segment_in_scoring", "<unk>"],
            );
        }

        let pipeline = TopicPipeline::new(test_config(2)).unwrap();
        let outcome = pipeline.run(dir.path()).await.unwrap();
        assert!(matches!(outcome, PipelineOutcome::NoInput));
    }

    #[tokio::test]
    async fn two_themes_split_into_two_topics() {
        let dir = TempDir::new().unwrap();
        let cooking = ["cooking pasta recipes cooking", "pasta cooking sauce"];
        let engines = ["engine turbine engine repair", "turbine engine diesel"];
        write_stm(dir.path(), "talk_1", &cooking);
        write_stm(dir.path(), "talk_2", &cooking);
        write_stm(dir.path(), "talk_3", &engines);
        write_stm(dir.path(), "talk_4", &engines);

        let pipeline = TopicPipeline::new(test_config(2)).unwrap();
        let outcome = pipeline.run(dir.path()).await.unwrap();
        let results = outcome.results().unwrap();

        assert_eq!(results.documents_processed, 4);
        assert_eq!(results.chosen_k, 2);
        assert_eq!(results.mapping.topic_count(), 2);
        assert_eq!(results.mapping.file_count(), 4);

        // Cooking talks and engine talks must not share a topic
        let mut cooking_topic = None;
        let mut engine_topic = None;
        for (label, files) in results.mapping.iter() {
            if files.contains(&"talk_1.stm".to_string()) {
                cooking_topic = Some(label.clone());
                assert!(files.contains(&"talk_2.stm".to_string()));
            }
            if files.contains(&"talk_3.stm".to_string()) {
                engine_topic = Some(label.clone());
                assert!(files.contains(&"talk_4.stm".to_string()));
            }
        }
        assert_ne!(cooking_topic, engine_topic);
    }

    #[tokio::test]
    async fn fixed_seed_runs_are_identical() {
        let dir = TempDir::new().unwrap();
        for i in 0..6 {
            let theme = if i % 2 == 0 {
                "cooking pasta recipes sauce"
            } else {
                "engine turbine diesel repair"
            };
            write_stm(dir.path(), &format!("talk_{i}"), &[theme, theme]);
        }

        let first = TopicPipeline::new(test_config(2))
            .unwrap()
            .run(dir.path())
            .await
            .unwrap();
        let second = TopicPipeline::new(test_config(2))
            .unwrap()
            .run(dir.path())
            .await
            .unwrap();

        assert_eq!(
            first.results().unwrap().mapping,
            second.results().unwrap().mapping
        );
    }

    #[tokio::test]
    async fn too_few_documents_is_insufficient_data() {
        let dir = TempDir::new().unwrap();
        write_stm(dir.path(), "talk_1", &["cooking pasta recipes"]);

        let pipeline = TopicPipeline::new(test_config(3)).unwrap();
        let result = pipeline.run(dir.path()).await;
        assert!(matches!(result, Err(SkaldError::InsufficientData { .. })));
    }

    #[tokio::test]
    async fn cleaned_output_is_written_alongside() {
        let input = TempDir::new().unwrap();
        let cleaned = TempDir::new().unwrap();
        write_stm(input.path(), "talk_1", &["cooking pasta recipes cooking"]);
        write_stm(input.path(), "talk_2", &["engine turbine diesel repair"]);

        let pipeline = TopicPipeline::new(test_config(2)).unwrap();
        pipeline
            .run_with_cleaned_output(input.path(), Some(cleaned.path()))
            .await
            .unwrap();

        let contents = fs::read_to_string(cleaned.path().join("talk_1.stm")).unwrap();
        assert!(contents.contains("cooking pasta recipes"));
        assert!(!contents.contains("<o,f0,male>"));
    }
}
