//! Bag-of-words vectorization over a fitted vocabulary.
//!
//! The vocabulary is fit fresh on every run (no persistence across runs) and
//! owned by the vectorizer that fitted it. Terms are n-grams joined with
//! spaces, ordered by first appearance so matrix columns are deterministic.

use std::collections::HashMap;

use ndarray::Array2;

use crate::core::errors::{Result, SkaldError};

/// A fitted term vocabulary: term ↔ column index.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Insert a term if unseen, returning its column index.
    pub fn intern(&mut self, term: &str) -> usize {
        if let Some(&idx) = self.index.get(term) {
            return idx;
        }
        let idx = self.terms.len();
        self.terms.push(term.to_string());
        self.index.insert(term.to_string(), idx);
        idx
    }

    /// Look up a term's column index.
    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Term for a column index.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// All terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if no terms have been interned.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Expand a token sequence into n-grams in `[ngram_min, ngram_max]`.
pub fn ngrams(tokens: &[String], ngram_min: usize, ngram_max: usize) -> Vec<String> {
    let mut grams = Vec::new();
    for n in ngram_min..=ngram_max {
        if n == 0 || tokens.len() < n {
            continue;
        }
        for window in tokens.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}

/// Count vectorizer: token sequences → term-count matrix.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    ngram_min: usize,
    ngram_max: usize,
    vocabulary: Vocabulary,
}

impl CountVectorizer {
    /// Create an unfitted vectorizer for the given n-gram range.
    pub fn new(ngram_min: usize, ngram_max: usize) -> Self {
        Self {
            ngram_min,
            ngram_max,
            vocabulary: Vocabulary::default(),
        }
    }

    /// Fit the vocabulary and produce the N×M count matrix in one pass.
    ///
    /// Every input document must be non-empty; the row count of the output
    /// always equals the input document count.
    pub fn fit_transform(&mut self, documents: &[Vec<String>]) -> Result<Array2<f64>> {
        if documents.is_empty() {
            return Err(SkaldError::pipeline("vectorize", "no documents to vectorize"));
        }

        // First pass: build the vocabulary in first-appearance order
        let mut doc_grams: Vec<Vec<usize>> = Vec::with_capacity(documents.len());
        for tokens in documents {
            let grams = ngrams(tokens, self.ngram_min, self.ngram_max);
            let ids: Vec<usize> = grams.iter().map(|g| self.vocabulary.intern(g)).collect();
            doc_grams.push(ids);
        }

        if self.vocabulary.is_empty() {
            return Err(SkaldError::pipeline(
                "vectorize",
                "vocabulary is empty after n-gram expansion",
            ));
        }

        let mut matrix = Array2::<f64>::zeros((documents.len(), self.vocabulary.len()));
        for (row, ids) in doc_grams.iter().enumerate() {
            for &col in ids {
                matrix[[row, col]] += 1.0;
            }
        }

        Ok(matrix)
    }

    /// Encode documents as id sequences against the fitted vocabulary
    /// (the sparse form the LDA Gibbs sampler consumes).
    pub fn id_documents(&self, documents: &[Vec<String>]) -> Vec<Vec<usize>> {
        documents
            .iter()
            .map(|tokens| {
                ngrams(tokens, self.ngram_min, self.ngram_max)
                    .iter()
                    .filter_map(|g| self.vocabulary.get(g))
                    .collect()
            })
            .collect()
    }

    /// The fitted vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Vec<String>> {
        vec![
            vec!["space".into(), "travel".into()],
            vec!["space".into(), "exploration".into()],
            vec!["cooking".into(), "pasta".into()],
        ]
    }

    #[test]
    fn row_count_matches_document_count() {
        let mut vectorizer = CountVectorizer::new(1, 1);
        let matrix = vectorizer.fit_transform(&docs()).unwrap();
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.ncols(), 5);
    }

    #[test]
    fn counts_are_correct() {
        let mut vectorizer = CountVectorizer::new(1, 1);
        let matrix = vectorizer
            .fit_transform(&[vec!["a".into(), "b".into(), "a".into()]])
            .unwrap();

        let a_col = vectorizer.vocabulary().get("a").unwrap();
        let b_col = vectorizer.vocabulary().get("b").unwrap();
        assert_eq!(matrix[[0, a_col]], 2.0);
        assert_eq!(matrix[[0, b_col]], 1.0);
    }

    #[test]
    fn bigram_expansion() {
        let grams = ngrams(
            &["space".into(), "travel".into(), "agency".into()],
            1,
            2,
        );
        assert!(grams.contains(&"space travel".to_string()));
        assert!(grams.contains(&"travel agency".to_string()));
        assert_eq!(grams.len(), 5);
    }

    #[test]
    fn empty_input_rejected() {
        let mut vectorizer = CountVectorizer::new(1, 1);
        assert!(vectorizer.fit_transform(&[]).is_err());
    }

    #[test]
    fn id_documents_align_with_vocabulary() {
        let mut vectorizer = CountVectorizer::new(1, 1);
        vectorizer.fit_transform(&docs()).unwrap();

        let ids = vectorizer.id_documents(&docs());
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0].len(), 2);
        assert_eq!(
            vectorizer.vocabulary().term(ids[0][0]).unwrap(),
            "space"
        );
    }
}
