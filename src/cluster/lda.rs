//! Latent Dirichlet Allocation via collapsed Gibbs sampling.
//!
//! Documents arrive as term-id sequences against a shared vocabulary. The
//! sampler keeps the usual count matrices (document-topic, topic-term, topic
//! totals), runs a fixed number of full passes, and reads the final counts as
//! smoothed distributions. Each document is assigned the topic with the
//! highest posterior mass.

use ndarray::Array2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::errors::{Result, SkaldError};

/// LDA model hyperparameters.
#[derive(Debug, Clone)]
pub struct LdaModel {
    /// Number of topics
    pub k: usize,
    /// Dirichlet prior on document-topic distributions
    pub alpha: f64,
    /// Dirichlet prior on topic-word distributions
    pub beta: f64,
    /// Full Gibbs passes over the corpus
    pub passes: usize,
    /// RNG seed
    pub seed: u64,
}

/// A fitted LDA model.
#[derive(Debug, Clone)]
pub struct LdaFit {
    /// Dominant topic per document, in `[0, k)`
    pub assignments: Vec<usize>,
    /// Document-topic distribution, rows sum to 1
    pub doc_topic: Array2<f64>,
    /// Topic-term distribution, rows sum to 1
    pub topic_term: Array2<f64>,
}

impl LdaModel {
    /// Create an LDA model.
    pub fn new(k: usize, alpha: f64, beta: f64, passes: usize, seed: u64) -> Self {
        Self {
            k,
            alpha,
            beta,
            passes,
            seed,
        }
    }

    /// Fit the model on id-encoded documents.
    pub fn fit(&self, documents: &[Vec<usize>], vocab_size: usize) -> Result<LdaFit> {
        if self.k < 2 {
            return Err(SkaldError::validation("LDA needs at least 2 topics"));
        }
        if documents.is_empty() {
            return Err(SkaldError::pipeline("cluster", "no documents for LDA"));
        }
        if vocab_size == 0 {
            return Err(SkaldError::pipeline("cluster", "LDA vocabulary is empty"));
        }

        let n_docs = documents.len();
        let mut rng = StdRng::seed_from_u64(self.seed);

        // Count matrices: tokens per (doc, topic), (topic, word), and topic totals
        let mut doc_topic_counts = vec![vec![0usize; self.k]; n_docs];
        let mut topic_word_counts = vec![vec![0usize; vocab_size]; self.k];
        let mut topic_totals = vec![0usize; self.k];

        // Random initial topic per token position
        let mut topics: Vec<Vec<usize>> = documents
            .iter()
            .map(|doc| doc.iter().map(|_| rng.gen_range(0..self.k)).collect())
            .collect();

        for (d, doc) in documents.iter().enumerate() {
            for (pos, &word) in doc.iter().enumerate() {
                let t = topics[d][pos];
                doc_topic_counts[d][t] += 1;
                topic_word_counts[t][word] += 1;
                topic_totals[t] += 1;
            }
        }

        let v_beta = vocab_size as f64 * self.beta;
        let mut weights = vec![0.0f64; self.k];

        for _ in 0..self.passes {
            for (d, doc) in documents.iter().enumerate() {
                for (pos, &word) in doc.iter().enumerate() {
                    let old = topics[d][pos];
                    doc_topic_counts[d][old] -= 1;
                    topic_word_counts[old][word] -= 1;
                    topic_totals[old] -= 1;

                    for t in 0..self.k {
                        let word_given_topic = (topic_word_counts[t][word] as f64 + self.beta)
                            / (topic_totals[t] as f64 + v_beta);
                        let topic_given_doc = doc_topic_counts[d][t] as f64 + self.alpha;
                        weights[t] = word_given_topic * topic_given_doc;
                    }

                    let sampler = WeightedIndex::new(&weights).map_err(|e| {
                        SkaldError::math_with_context(
                            format!("Gibbs sampling weights degenerate: {e}"),
                            "LdaModel::fit",
                        )
                    })?;
                    let new = sampler.sample(&mut rng);

                    topics[d][pos] = new;
                    doc_topic_counts[d][new] += 1;
                    topic_word_counts[new][word] += 1;
                    topic_totals[new] += 1;
                }
            }
        }

        // Smoothed, normalized distributions from the final counts
        let mut doc_topic = Array2::<f64>::zeros((n_docs, self.k));
        for (d, counts) in doc_topic_counts.iter().enumerate() {
            let total: f64 = counts.iter().sum::<usize>() as f64 + self.k as f64 * self.alpha;
            for (t, &count) in counts.iter().enumerate() {
                doc_topic[[d, t]] = (count as f64 + self.alpha) / total;
            }
        }

        let mut topic_term = Array2::<f64>::zeros((self.k, vocab_size));
        for (t, counts) in topic_word_counts.iter().enumerate() {
            let total = topic_totals[t] as f64 + v_beta;
            for (w, &count) in counts.iter().enumerate() {
                topic_term[[t, w]] = (count as f64 + self.beta) / total;
            }
        }

        let assignments = (0..n_docs)
            .map(|d| {
                let row = doc_topic.row(d);
                let mut best = 0;
                let mut best_mass = f64::NEG_INFINITY;
                for (t, &mass) in row.iter().enumerate() {
                    if mass > best_mass {
                        best_mass = mass;
                        best = t;
                    }
                }
                best
            })
            .collect();

        Ok(LdaFit {
            assignments,
            doc_topic,
            topic_term,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// id-encode a tiny corpus with two disjoint vocabularies
    fn two_topic_corpus() -> (Vec<Vec<usize>>, usize) {
        // words 0..3 = "space" topic, words 4..7 = "cooking" topic
        let docs = vec![
            vec![0, 1, 2, 0, 3, 1],
            vec![1, 0, 2, 3, 0, 2],
            vec![4, 5, 6, 4, 7, 5],
            vec![5, 4, 6, 7, 4, 6],
        ];
        (docs, 8)
    }

    #[test]
    fn partitions_all_documents() {
        let (docs, vocab) = two_topic_corpus();
        let fit = LdaModel::new(2, 0.1, 0.01, 30, 42).fit(&docs, vocab).unwrap();

        assert_eq!(fit.assignments.len(), 4);
        assert!(fit.assignments.iter().all(|&t| t < 2));
    }

    #[test]
    fn disjoint_vocabularies_separate() {
        let (docs, vocab) = two_topic_corpus();
        let fit = LdaModel::new(2, 0.1, 0.01, 50, 42).fit(&docs, vocab).unwrap();

        assert_eq!(fit.assignments[0], fit.assignments[1]);
        assert_eq!(fit.assignments[2], fit.assignments[3]);
        assert_ne!(fit.assignments[0], fit.assignments[2]);
    }

    #[test]
    fn distributions_are_normalized() {
        let (docs, vocab) = two_topic_corpus();
        let fit = LdaModel::new(2, 0.1, 0.01, 10, 42).fit(&docs, vocab).unwrap();

        for row in fit.doc_topic.rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
        for row in fit.topic_term.rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let (docs, vocab) = two_topic_corpus();
        let first = LdaModel::new(2, 0.1, 0.01, 20, 9).fit(&docs, vocab).unwrap();
        let second = LdaModel::new(2, 0.1, 0.01, 20, 9).fit(&docs, vocab).unwrap();
        assert_eq!(first.assignments, second.assignments);
    }

    #[test]
    fn empty_corpus_rejected() {
        let err = LdaModel::new(2, 0.1, 0.01, 5, 42).fit(&[], 10).unwrap_err();
        assert!(matches!(err, SkaldError::Pipeline { .. }));
    }
}
