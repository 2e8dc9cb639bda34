//! Cluster-count selection by silhouette score.
//!
//! A pure function of the document matrix and the K range: no I/O, no shared
//! state. Scans every K in the range, fits a seeded K-Means per candidate,
//! and picks the K with the highest mean silhouette; ties go to the smallest K.

use ndarray::Array2;
use tracing::debug;

use crate::cluster::kmeans::{squared_distance, KMeans};
use crate::core::errors::{Result, SkaldError};

/// Outcome of a K scan.
#[derive(Debug, Clone)]
pub struct KSelection {
    /// The chosen cluster count
    pub chosen_k: usize,
    /// Mean silhouette score per candidate K, in scan order
    pub scores: Vec<(usize, f64)>,
}

/// Scan `[k_min, k_max]` and pick the K with the best silhouette score.
///
/// Fails with `InsufficientData` when the matrix has fewer rows than `k_min`.
/// Candidates with K ≥ row count are skipped (silhouette is undefined there).
pub fn select_k(
    data: &Array2<f64>,
    k_min: usize,
    k_max: usize,
    max_iterations: usize,
    seed: u64,
) -> Result<KSelection> {
    let n = data.nrows();
    if n < k_min {
        return Err(SkaldError::insufficient_data(
            "matrix has fewer rows than the minimum K considered",
            k_min,
            n,
        ));
    }

    let effective_max = k_max.min(n.saturating_sub(1)).max(k_min);
    let mut scores = Vec::new();
    let mut best: Option<(usize, f64)> = None;

    for k in k_min..=effective_max {
        if k >= n {
            break;
        }
        let fit = KMeans::new(k, max_iterations, seed).fit(data)?;
        let score = silhouette_score(data, &fit.assignments, k);
        debug!("silhouette for k={k}: {score:.4}");
        scores.push((k, score));

        // Strict comparison keeps the smallest K on ties
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((k, score)),
        }
    }

    let (chosen_k, _) = best.ok_or_else(|| {
        SkaldError::insufficient_data("no candidate K could be evaluated", k_min, n)
    })?;

    Ok(KSelection { chosen_k, scores })
}

/// Mean silhouette coefficient of a clustering.
///
/// For each document: `(b - a) / max(a, b)` where `a` is the mean distance to
/// its own cluster and `b` the smallest mean distance to another cluster.
/// Documents in singleton clusters contribute zero.
pub fn silhouette_score(data: &Array2<f64>, assignments: &[usize], k: usize) -> f64 {
    let n = data.nrows();
    if n == 0 || k < 2 {
        return 0.0;
    }

    let mut cluster_sizes = vec![0usize; k];
    for &c in assignments {
        cluster_sizes[c] += 1;
    }

    let mut total = 0.0;
    for i in 0..n {
        let own = assignments[i];
        if cluster_sizes[own] <= 1 {
            continue; // singleton: silhouette defined as 0
        }

        // Mean distance to each cluster
        let mut sums = vec![0.0f64; k];
        for j in 0..n {
            if i == j {
                continue;
            }
            let d = squared_distance(&data.row(i), &data.row(j)).sqrt();
            sums[assignments[j]] += d;
        }

        let a = sums[own] / (cluster_sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && cluster_sizes[c] > 0)
            .map(|c| sums[c] / cluster_sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);

        if b.is_finite() {
            let denom = a.max(b);
            if denom > 0.0 {
                total += (b - a) / denom;
            }
        }
    }

    total / n as f64
}
