//! Latent Semantic Analysis via truncated SVD.
//!
//! The document-term matrix is decomposed without centering; each document is
//! assigned the latent component where it carries the largest absolute
//! weight, and each component's representative terms are read off the right
//! singular vectors.

use nalgebra::DMatrix;
use ndarray::Array2;

use crate::core::errors::{Result, SkaldError};

/// LSA model parameters.
#[derive(Debug, Clone)]
pub struct LsaModel {
    /// Number of latent topics (truncation rank)
    pub k: usize,
}

/// A fitted LSA model.
#[derive(Debug, Clone)]
pub struct LsaFit {
    /// Dominant component per document, in `[0, k)`
    pub assignments: Vec<usize>,
    /// Document weights per component (N×k, `U_k * Σ_k`)
    pub doc_topic: Array2<f64>,
    /// Term loadings per component (k×M, rows of `Vᵗ`)
    pub topic_term: Array2<f64>,
}

impl LsaModel {
    /// Create an LSA model.
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// Fit the model on an N×M document-term matrix.
    pub fn fit(&self, matrix: &Array2<f64>) -> Result<LsaFit> {
        let (n_rows, n_cols) = (matrix.nrows(), matrix.ncols());
        if self.k < 2 {
            return Err(SkaldError::validation("LSA needs at least 2 topics"));
        }
        if n_rows < self.k {
            return Err(SkaldError::insufficient_data(
                "matrix has fewer rows than topics",
                self.k,
                n_rows,
            ));
        }
        if n_cols == 0 {
            return Err(SkaldError::math_with_context(
                "document-term matrix has no columns",
                "LsaModel::fit",
            ));
        }

        let k = self.k.min(n_cols);

        let mut dense = DMatrix::<f64>::zeros(n_rows, n_cols);
        for row in 0..n_rows {
            for col in 0..n_cols {
                dense[(row, col)] = matrix[[row, col]];
            }
        }

        let svd = dense.svd(true, true);
        let u = svd
            .u
            .ok_or_else(|| SkaldError::math_with_context("SVD did not produce U", "LsaModel::fit"))?;
        let v_t = svd.v_t.ok_or_else(|| {
            SkaldError::math_with_context("SVD did not produce Vᵗ", "LsaModel::fit")
        })?;

        let mut doc_topic = Array2::<f64>::zeros((n_rows, k));
        for row in 0..n_rows {
            for comp in 0..k {
                doc_topic[[row, comp]] = u[(row, comp)] * svd.singular_values[comp];
            }
        }

        let mut topic_term = Array2::<f64>::zeros((k, n_cols));
        for comp in 0..k {
            for col in 0..n_cols {
                topic_term[[comp, col]] = v_t[(comp, col)];
            }
        }

        // The component with the largest absolute weight dominates the document
        let assignments = (0..n_rows)
            .map(|row| {
                let mut best = 0;
                let mut best_weight = f64::NEG_INFINITY;
                for comp in 0..k {
                    let weight = doc_topic[[row, comp]].abs();
                    if weight > best_weight {
                        best_weight = weight;
                        best = comp;
                    }
                }
                best
            })
            .collect();

        Ok(LsaFit {
            assignments,
            doc_topic,
            topic_term,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn block_matrix() -> Array2<f64> {
        // Two blocks of documents over disjoint term sets
        array![
            [3.0, 2.0, 0.0, 0.0],
            [2.0, 3.0, 0.0, 0.0],
            [0.0, 0.0, 3.0, 2.0],
            [0.0, 0.0, 2.0, 3.0],
        ]
    }

    #[test]
    fn partitions_all_documents() {
        let fit = LsaModel::new(2).fit(&block_matrix()).unwrap();
        assert_eq!(fit.assignments.len(), 4);
        assert!(fit.assignments.iter().all(|&t| t < 2));
    }

    #[test]
    fn block_structure_separates() {
        let fit = LsaModel::new(2).fit(&block_matrix()).unwrap();
        assert_eq!(fit.assignments[0], fit.assignments[1]);
        assert_eq!(fit.assignments[2], fit.assignments[3]);
        assert_ne!(fit.assignments[0], fit.assignments[2]);
    }

    #[test]
    fn top_terms_come_from_the_right_block() {
        let fit = LsaModel::new(2).fit(&block_matrix()).unwrap();

        // For the component that owns documents 0 and 1, the strongest
        // loading must be on one of the first two terms
        let comp = fit.assignments[0];
        let row = fit.topic_term.row(comp);
        let mut best_term = 0;
        let mut best_loading = f64::NEG_INFINITY;
        for (term, &loading) in row.iter().enumerate() {
            if loading.abs() > best_loading {
                best_loading = loading.abs();
                best_term = term;
            }
        }
        assert!(best_term < 2, "expected a block-one term, got {best_term}");
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let matrix = array![[1.0, 0.0]];
        let err = LsaModel::new(2).fit(&matrix).unwrap_err();
        assert!(matches!(err, SkaldError::InsufficientData { .. }));
    }
}
