//! TF-IDF vectorization.
//!
//! Standard smoothed formulation: `idf(t) = ln((1 + N) / (1 + df(t))) + 1`,
//! rows L2-normalized. Document frequencies and the IDF vector belong to the
//! vectorizer that fitted them and are rebuilt on every run.

use ndarray::Array2;

use crate::core::errors::Result;
use crate::vectorize::bow::{CountVectorizer, Vocabulary};

/// TF-IDF vectorizer over a fitted vocabulary.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    counter: CountVectorizer,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Create an unfitted TF-IDF vectorizer for the given n-gram range.
    pub fn new(ngram_min: usize, ngram_max: usize) -> Self {
        Self {
            counter: CountVectorizer::new(ngram_min, ngram_max),
            idf: Vec::new(),
        }
    }

    /// Fit on the documents and return the N×M weighted matrix.
    pub fn fit_transform(&mut self, documents: &[Vec<String>]) -> Result<Array2<f64>> {
        let counts = self.counter.fit_transform(documents)?;
        let (n_docs, n_terms) = (counts.nrows(), counts.ncols());

        // Document frequency per term
        let mut df = vec![0usize; n_terms];
        for row in counts.rows() {
            for (term, &count) in row.iter().enumerate() {
                if count > 0.0 {
                    df[term] += 1;
                }
            }
        }

        self.idf = df
            .iter()
            .map(|&d| ((1.0 + n_docs as f64) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let mut matrix = counts;
        for mut row in matrix.rows_mut() {
            for (term, value) in row.iter_mut().enumerate() {
                *value *= self.idf[term];
            }
            // L2 row normalization
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for value in row.iter_mut() {
                    *value /= norm;
                }
            }
        }

        Ok(matrix)
    }

    /// The fitted vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        self.counter.vocabulary()
    }

    /// Encode documents as id sequences against the fitted vocabulary.
    ///
    /// Ids index the same columns as the weighted matrix, so topic models
    /// fit on them can be read back through [`Self::vocabulary`].
    pub fn id_documents(&self, documents: &[Vec<String>]) -> Vec<Vec<usize>> {
        self.counter.id_documents(documents)
    }

    /// IDF weight for a fitted term column.
    pub fn idf(&self, term_index: usize) -> Option<f64> {
        self.idf.get(term_index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn docs() -> Vec<Vec<String>> {
        vec![
            vec!["space".into(), "travel".into()],
            vec!["space".into(), "rocket".into()],
        ]
    }

    #[test]
    fn row_count_matches_document_count() {
        let mut vectorizer = TfIdfVectorizer::new(1, 1);
        let matrix = vectorizer.fit_transform(&docs()).unwrap();
        assert_eq!(matrix.nrows(), 2);
    }

    #[test]
    fn rows_are_unit_length() {
        let mut vectorizer = TfIdfVectorizer::new(1, 1);
        let matrix = vectorizer.fit_transform(&docs()).unwrap();

        for row in matrix.rows() {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn rare_terms_outweigh_common_terms() {
        let mut vectorizer = TfIdfVectorizer::new(1, 1);
        let matrix = vectorizer.fit_transform(&docs()).unwrap();

        let space = vectorizer.vocabulary().get("space").unwrap();
        let travel = vectorizer.vocabulary().get("travel").unwrap();

        // "space" appears in both documents, "travel" only in the first
        assert!(matrix[[0, travel]] > matrix[[0, space]]);
    }

    #[test]
    fn id_documents_index_matrix_columns() {
        let mut vectorizer = TfIdfVectorizer::new(1, 2);
        let matrix = vectorizer.fit_transform(&docs()).unwrap();

        let ids = vectorizer.id_documents(&docs());
        assert_eq!(ids.len(), 2);
        // unigrams plus one bigram per document
        assert_eq!(ids[0].len(), 3);
        for &id in ids.iter().flatten() {
            assert!(id < matrix.ncols());
        }
        assert_eq!(
            vectorizer.vocabulary().term(ids[1][2]).unwrap(),
            "space rocket"
        );
    }

    #[test]
    fn smoothed_idf_values() {
        let mut vectorizer = TfIdfVectorizer::new(1, 1);
        vectorizer.fit_transform(&docs()).unwrap();

        let space = vectorizer.vocabulary().get("space").unwrap();
        // df = 2, N = 2: ln(3/3) + 1 = 1
        assert_relative_eq!(vectorizer.idf(space).unwrap(), 1.0, epsilon = 1e-9);

        let travel = vectorizer.vocabulary().get("travel").unwrap();
        // df = 1, N = 2: ln(3/2) + 1
        assert_relative_eq!(
            vectorizer.idf(travel).unwrap(),
            (3.0f64 / 2.0).ln() + 1.0,
            epsilon = 1e-9
        );
    }
}
