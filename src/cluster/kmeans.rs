//! K-Means clustering with seeded k-means++ initialization.
//!
//! Deterministic for a fixed seed: initialization draws from a seeded
//! `StdRng` and Lloyd iterations are order-stable, so re-running on unchanged
//! input reproduces identical assignments.

use ndarray::{Array1, Array2, ArrayView1};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::errors::{Result, SkaldError};

/// Number of restarts per fit; the run with the lowest inertia wins.
const DEFAULT_N_INIT: usize = 10;

/// K-Means model parameters.
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Number of clusters
    pub k: usize,
    /// Maximum Lloyd iterations
    pub max_iterations: usize,
    /// RNG seed for initialization
    pub seed: u64,
    /// Independent restarts, keeping the best inertia
    pub n_init: usize,
}

/// A fitted K-Means model.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster id per document, in `[0, k)`
    pub assignments: Vec<usize>,
    /// Cluster centroids, one row per cluster
    pub centroids: Array2<f64>,
    /// Sum of squared distances of documents to their centroid
    pub inertia: f64,
}

impl KMeans {
    /// Create a K-Means model.
    pub fn new(k: usize, max_iterations: usize, seed: u64) -> Self {
        Self {
            k,
            max_iterations,
            seed,
            n_init: DEFAULT_N_INIT,
        }
    }

    /// Override the number of restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Fit the model, assigning every row of `data` to exactly one cluster.
    ///
    /// Runs `n_init` independent initializations and keeps the fit with the
    /// lowest inertia. Deterministic for a fixed seed.
    pub fn fit(&self, data: &Array2<f64>) -> Result<KMeansFit> {
        let n = data.nrows();
        if self.k < 2 {
            return Err(SkaldError::validation("k must be at least 2"));
        }
        if n < self.k {
            return Err(SkaldError::insufficient_data(
                "matrix has fewer rows than clusters",
                self.k,
                n,
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;
        for _ in 0..self.n_init.max(1) {
            let fit = self.fit_once(data, &mut rng)?;
            match &best {
                Some(current) if current.inertia <= fit.inertia => {}
                _ => best = Some(fit),
            }
        }

        // n_init >= 1, so a fit always exists
        best.ok_or_else(|| {
            SkaldError::math_with_context("no K-Means fit produced", "KMeans::fit")
        })
    }

    fn fit_once(&self, data: &Array2<f64>, rng: &mut StdRng) -> Result<KMeansFit> {
        let n = data.nrows();
        let mut centroids = self.init_plus_plus(data, rng)?;
        let mut assignments = vec![0usize; n];

        for _ in 0..self.max_iterations {
            let mut changed = false;

            // Assignment step
            for (row_idx, row) in data.rows().into_iter().enumerate() {
                let nearest = nearest_centroid(&row, &centroids);
                if assignments[row_idx] != nearest {
                    assignments[row_idx] = nearest;
                    changed = true;
                }
            }

            // Update step
            let mut sums = Array2::<f64>::zeros((self.k, data.ncols()));
            let mut counts = vec![0usize; self.k];
            for (row_idx, row) in data.rows().into_iter().enumerate() {
                let cluster = assignments[row_idx];
                counts[cluster] += 1;
                for (col, &value) in row.iter().enumerate() {
                    sums[[cluster, col]] += value;
                }
            }

            for cluster in 0..self.k {
                if counts[cluster] == 0 {
                    // Reseed an empty cluster with the point farthest from its centroid
                    let farthest = farthest_point(data, &assignments, &centroids);
                    centroids.row_mut(cluster).assign(&data.row(farthest));
                    assignments[farthest] = cluster;
                    changed = true;
                } else {
                    for col in 0..data.ncols() {
                        centroids[[cluster, col]] = sums[[cluster, col]] / counts[cluster] as f64;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        let inertia = data
            .rows()
            .into_iter()
            .zip(&assignments)
            .map(|(row, &cluster)| squared_distance(&row, &centroids.row(cluster)))
            .sum();

        Ok(KMeansFit {
            assignments,
            centroids,
            inertia,
        })
    }

    /// k-means++ initialization: spread initial centroids by sampling points
    /// proportionally to their squared distance from the nearest centroid.
    fn init_plus_plus(&self, data: &Array2<f64>, rng: &mut StdRng) -> Result<Array2<f64>> {
        let n = data.nrows();
        let mut centroids = Array2::<f64>::zeros((self.k, data.ncols()));

        let first = rng.gen_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        let mut distances: Array1<f64> = data
            .rows()
            .into_iter()
            .map(|row| squared_distance(&row, &centroids.row(0)))
            .collect();

        for c in 1..self.k {
            let total: f64 = distances.sum();
            let next = if total > 0.0 {
                let weights = WeightedIndex::new(distances.iter()).map_err(|e| {
                    SkaldError::math_with_context(
                        format!("k-means++ weighting failed: {e}"),
                        "KMeans::init_plus_plus",
                    )
                })?;
                weights.sample(rng)
            } else {
                // All remaining points coincide with existing centroids
                rng.gen_range(0..n)
            };

            centroids.row_mut(c).assign(&data.row(next));

            for (idx, row) in data.rows().into_iter().enumerate() {
                let d = squared_distance(&row, &centroids.row(c));
                if d < distances[idx] {
                    distances[idx] = d;
                }
            }
        }

        Ok(centroids)
    }
}

/// Index of the centroid nearest to `row`.
fn nearest_centroid(row: &ArrayView1<'_, f64>, centroids: &Array2<f64>) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (idx, centroid) in centroids.rows().into_iter().enumerate() {
        let d = squared_distance(row, &centroid);
        if d < best_distance {
            best_distance = d;
            best = idx;
        }
    }
    best
}

/// Index of the point farthest from its assigned centroid.
fn farthest_point(
    data: &Array2<f64>,
    assignments: &[usize],
    centroids: &Array2<f64>,
) -> usize {
    let mut farthest = 0;
    let mut max_distance = -1.0;
    for (idx, row) in data.rows().into_iter().enumerate() {
        let d = squared_distance(&row, &centroids.row(assignments[idx]));
        if d > max_distance {
            max_distance = d;
            farthest = idx;
        }
    }
    farthest
}

/// Squared Euclidean distance between two vectors.
pub fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_group_data() -> Array2<f64> {
        array![
            [1.0, 0.0],
            [0.9, 0.1],
            [1.1, 0.0],
            [0.0, 1.0],
            [0.1, 0.9],
            [0.0, 1.1],
        ]
    }

    #[test]
    fn partitions_all_documents() {
        let fit = KMeans::new(2, 100, 42).fit(&two_group_data()).unwrap();

        assert_eq!(fit.assignments.len(), 6);
        assert!(fit.assignments.iter().all(|&c| c < 2));
        // Both cluster ids appear
        assert!(fit.assignments.contains(&0));
        assert!(fit.assignments.contains(&1));
    }

    #[test]
    fn separates_obvious_groups() {
        let fit = KMeans::new(2, 100, 42).fit(&two_group_data()).unwrap();

        assert_eq!(fit.assignments[0], fit.assignments[1]);
        assert_eq!(fit.assignments[0], fit.assignments[2]);
        assert_eq!(fit.assignments[3], fit.assignments[4]);
        assert_eq!(fit.assignments[3], fit.assignments[5]);
        assert_ne!(fit.assignments[0], fit.assignments[3]);
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let data = two_group_data();
        let first = KMeans::new(2, 100, 7).fit(&data).unwrap();
        let second = KMeans::new(2, 100, 7).fit(&data).unwrap();
        assert_eq!(first.assignments, second.assignments);
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let data = array![[1.0, 0.0], [0.0, 1.0]];
        let err = KMeans::new(3, 100, 42).fit(&data).unwrap_err();
        assert!(matches!(err, SkaldError::InsufficientData { .. }));
    }

    #[test]
    fn inertia_is_small_for_tight_clusters() {
        let fit = KMeans::new(2, 100, 42).fit(&two_group_data()).unwrap();
        assert!(fit.inertia < 0.2, "inertia was {}", fit.inertia);
    }

    #[test]
    fn identical_points_still_partition() {
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let fit = KMeans::new(2, 100, 42).fit(&data).unwrap();
        assert_eq!(fit.assignments.len(), 4);
        assert!(fit.assignments.iter().all(|&c| c < 2));
    }
}
