//! PCA dimensionality reduction via singular value decomposition.
//!
//! Projects the document matrix onto its leading principal components before
//! clustering. Degenerate inputs (no rows, no columns, failed decomposition)
//! are mathematical errors; the caller logs them and skips the reduction
//! rather than aborting the batch.

use nalgebra::DMatrix;
use ndarray::Array2;
use tracing::debug;

use crate::core::errors::{Result, SkaldError};

/// Project `matrix` onto its top `n_components` principal components.
///
/// Columns are mean-centered first. If `n_components` exceeds what the matrix
/// can support it is clamped to `min(rows, cols)`.
pub fn project(matrix: &Array2<f64>, n_components: usize) -> Result<Array2<f64>> {
    let (n_rows, n_cols) = (matrix.nrows(), matrix.ncols());
    if n_rows == 0 || n_cols == 0 {
        return Err(SkaldError::math_with_context(
            "cannot run PCA on an empty matrix",
            "pca::project",
        ));
    }

    let components = n_components.min(n_rows).min(n_cols);
    if components == 0 {
        return Err(SkaldError::math_with_context(
            "PCA component count reduced to zero",
            "pca::project",
        ));
    }

    // Mean-center each column
    let mut centered = DMatrix::<f64>::zeros(n_rows, n_cols);
    for col in 0..n_cols {
        let mean = matrix.column(col).sum() / n_rows as f64;
        for row in 0..n_rows {
            centered[(row, col)] = matrix[[row, col]] - mean;
        }
    }

    let svd = centered.svd(true, false);
    let u = svd
        .u
        .ok_or_else(|| SkaldError::math_with_context("SVD did not produce U", "pca::project"))?;

    // Scores = U_k * Σ_k; singular values come back in descending order
    let mut projected = Array2::<f64>::zeros((n_rows, components));
    for row in 0..n_rows {
        for comp in 0..components {
            projected[[row, comp]] = u[(row, comp)] * svd.singular_values[comp];
        }
    }

    debug!(
        "PCA projected {}x{} matrix down to {} components",
        n_rows, n_cols, components
    );
    Ok(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn reduces_dimensionality() {
        let matrix = array![
            [1.0, 0.0, 0.0, 1.0],
            [0.9, 0.1, 0.0, 1.1],
            [0.0, 1.0, 1.0, 0.0],
            [0.1, 0.9, 1.1, 0.0],
        ];

        let projected = project(&matrix, 2).unwrap();
        assert_eq!(projected.nrows(), 4);
        assert_eq!(projected.ncols(), 2);
    }

    #[test]
    fn preserves_separation_on_first_component() {
        // Two well-separated groups must stay separated after projection
        let matrix = array![
            [5.0, 0.0],
            [5.1, 0.1],
            [0.0, 5.0],
            [0.1, 5.1],
        ];

        let projected = project(&matrix, 1).unwrap();
        let first_group = (projected[[0, 0]], projected[[1, 0]]);
        let second_group = (projected[[2, 0]], projected[[3, 0]]);

        assert_eq!(
            first_group.0.signum(),
            first_group.1.signum(),
            "group members should land on the same side"
        );
        assert_ne!(first_group.0.signum(), second_group.0.signum());
    }

    #[test]
    fn component_count_clamped() {
        let matrix = array![[1.0, 2.0], [3.0, 4.0]];
        let projected = project(&matrix, 10).unwrap();
        assert_eq!(projected.ncols(), 2);
    }

    #[test]
    fn empty_matrix_is_math_error() {
        let matrix = Array2::<f64>::zeros((0, 0));
        let err = project(&matrix, 2).unwrap_err();
        assert!(matches!(err, SkaldError::Math { .. }));
    }

    #[test]
    fn centering_removes_constant_columns() {
        // A constant column carries no variance, so projecting a 3x2 matrix
        // whose second column is constant behaves like a 1-D problem
        let matrix = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let projected = project(&matrix, 2).unwrap();

        for row in 0..3 {
            assert_relative_eq!(projected[[row, 1]], 0.0, epsilon = 1e-9);
        }
    }
}
