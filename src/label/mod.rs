//! Topic label extraction.
//!
//! Every clustering backend reduces to the same labeling contract: a k×M
//! weight matrix over the vocabulary, from which the highest-weighted terms
//! per cluster become the label candidates. Embedding-space clusters have no
//! term axis, so their labels are recovered from per-cluster token counts
//! instead.

pub mod llm;

use std::collections::HashMap;

use ndarray::Array2;

use crate::vectorize::bow::Vocabulary;

/// Rank the top `per_cluster` vocabulary terms for each cluster.
///
/// `weights` is k×M (one row per cluster). With `absolute` set, terms are
/// ranked by magnitude, which is what latent-component loadings need since
/// their sign is arbitrary.
pub fn top_terms_for_clusters(
    weights: &Array2<f64>,
    vocab: &Vocabulary,
    per_cluster: usize,
    absolute: bool,
) -> Vec<Vec<String>> {
    weights
        .rows()
        .into_iter()
        .map(|row| {
            let mut ranked: Vec<(usize, f64)> = row
                .iter()
                .enumerate()
                .map(|(idx, &w)| (idx, if absolute { w.abs() } else { w }))
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            ranked
                .into_iter()
                .take(per_cluster)
                .filter_map(|(idx, _)| vocab.term(idx).map(str::to_string))
                .collect()
        })
        .collect()
}

/// Rank the top terms per cluster from raw token frequencies.
///
/// Used when documents were clustered in a space without a vocabulary axis,
/// such as dense embeddings.
pub fn top_terms_from_assignments(
    token_docs: &[Vec<String>],
    assignments: &[usize],
    k: usize,
    per_cluster: usize,
) -> Vec<Vec<String>> {
    let mut counts: Vec<HashMap<&str, usize>> = vec![HashMap::new(); k];
    for (tokens, &cluster) in token_docs.iter().zip(assignments) {
        let bucket = &mut counts[cluster];
        for token in tokens {
            *bucket.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|bucket| {
            let mut ranked: Vec<(&str, usize)> = bucket.into_iter().collect();
            // Tie-break alphabetically so labels are stable across runs
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            ranked
                .into_iter()
                .take(per_cluster)
                .map(|(term, _)| term.to_string())
                .collect()
        })
        .collect()
}

/// Produce the final label per cluster: the single top term, or a positional
/// placeholder when a cluster ended up with no terms at all.
pub fn term_labels(top_terms: &[Vec<String>]) -> Vec<String> {
    top_terms
        .iter()
        .enumerate()
        .map(|(idx, terms)| match terms.first() {
            Some(term) => term.clone(),
            None => format!("topic_{idx}"),
        })
        .collect()
}
