//! Pipeline result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::io::mapping::TopicMapping;

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineOutcome {
    /// No transcript files were found under the input root.
    NoInput,
    /// The pipeline ran to completion.
    Completed(PipelineResults),
}

impl PipelineOutcome {
    /// The completed results, if any.
    pub fn results(&self) -> Option<&PipelineResults> {
        match self {
            Self::Completed(results) => Some(results),
            Self::NoInput => None,
        }
    }

    /// Whether the run produced a topic mapping.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Results and run metadata from a completed pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResults {
    /// Unique identifier for this run
    pub run_id: String,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
    /// Number of documents that entered clustering
    pub documents_processed: usize,
    /// Documents dropped because cleaning or normalization left them empty
    pub documents_skipped: usize,
    /// Number of clusters used
    pub chosen_k: usize,
    /// Silhouette score of the chosen K, when auto selection ran
    pub silhouette: Option<f64>,
    /// The topic-to-filenames mapping
    pub mapping: TopicMapping,
    /// Wall-clock duration of the run in seconds
    pub duration_seconds: f64,
}

impl PipelineResults {
    /// Create results with a fresh run id and current timestamp.
    pub fn new(
        documents_processed: usize,
        documents_skipped: usize,
        chosen_k: usize,
        silhouette: Option<f64>,
        mapping: TopicMapping,
        duration_seconds: f64,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            documents_processed,
            documents_skipped,
            chosen_k,
            silhouette,
            mapping,
            duration_seconds,
        }
    }

    /// Number of distinct topics in the mapping.
    pub fn topic_count(&self) -> usize {
        self.mapping.topic_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_input_has_no_results() {
        let outcome = PipelineOutcome::NoInput;
        assert!(!outcome.is_completed());
        assert!(outcome.results().is_none());
    }

    #[test]
    fn completed_exposes_topic_count() {
        let mut mapping = TopicMapping::new();
        mapping.insert("cooking", "a.stm");
        mapping.insert("engines", "b.stm");

        let results = PipelineResults::new(2, 0, 2, Some(0.5), mapping, 0.1);
        let outcome = PipelineOutcome::Completed(results);
        assert!(outcome.is_completed());
        assert_eq!(outcome.results().unwrap().topic_count(), 2);
    }
}
