//! K-Means clustering
//!
//! Lloyd's algorithm with k-means++ seeding. All randomness comes from a
//! seeded `StdRng`, so identical inputs always give identical labels.

use crate::{Error, Result, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    n_clusters: usize,
    max_iter: usize,
    tol: f32,
    seed: u64,
    centroids: Vec<Vector>,
    labels: Vec<usize>,
    inertia: f32,
    n_iter: usize,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
            centroids: Vec::new(),
            labels: Vec::new(),
            inertia: 0.0,
            n_iter: 0,
        }
    }

    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Convergence tolerance, relative to the mean per-feature variance
    #[must_use]
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, data: &[Vector]) -> Result<()> {
        let n = data.len();
        if n == 0 {
            return Err(Error::EmptyDataset);
        }
        if self.n_clusters == 0 || self.n_clusters > n {
            return Err(Error::InvalidArgument(format!(
                "cannot form {} clusters from {} rows",
                self.n_clusters, n
            )));
        }
        let dim = data[0].dim();
        if let Some(bad) = data.iter().find(|v| v.dim() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: bad.dim(),
            });
        }

        let threshold = self.tol * mean_variance(data, dim);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = init_plus_plus(data, self.n_clusters, &mut rng);
        let mut labels = assign(data, &centroids);

        self.n_iter = 0;
        for _ in 0..self.max_iter {
            self.n_iter += 1;
            let updated = update_centroids(data, &labels, &centroids, dim);
            let shift: f32 = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| old.squared_l2_distance(new))
                .sum();
            centroids = updated;
            labels = assign(data, &centroids);
            if shift <= threshold {
                break;
            }
        }

        self.inertia = data
            .iter()
            .zip(&labels)
            .map(|(v, &label)| v.squared_l2_distance(&centroids[label]))
            .sum();
        self.centroids = centroids;
        self.labels = labels;
        Ok(())
    }

    pub fn fit_predict(&mut self, data: &[Vector]) -> Result<Vec<usize>> {
        self.fit(data)?;
        Ok(self.labels.clone())
    }

    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn centroids(&self) -> &[Vector] {
        &self.centroids
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }
}

fn mean_variance(data: &[Vector], dim: usize) -> f32 {
    if dim == 0 {
        return 0.0;
    }
    let n = data.len() as f32;
    let mut total = 0.0f32;
    for d in 0..dim {
        let mean = data.iter().map(|v| v.as_slice()[d]).sum::<f32>() / n;
        total += data
            .iter()
            .map(|v| {
                let x = v.as_slice()[d] - mean;
                x * x
            })
            .sum::<f32>()
            / n;
    }
    total / dim as f32
}

/// k-means++: first centroid uniform, the rest drawn proportional to the
/// squared distance from the nearest centroid chosen so far
fn init_plus_plus(data: &[Vector], k: usize, rng: &mut StdRng) -> Vec<Vector> {
    let n = data.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..n)].clone());

    let mut closest: Vec<f32> = data
        .iter()
        .map(|v| v.squared_l2_distance(&centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f32 = closest.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.random::<f32>() * total;
            let mut acc = 0.0f32;
            closest
                .iter()
                .position(|&d| {
                    acc += d;
                    acc >= target && d > 0.0
                })
                .unwrap_or(n - 1)
        } else {
            // every row coincides with a centroid already
            rng.random_range(0..n)
        };

        let chosen = data[pick].clone();
        for (slot, v) in closest.iter_mut().zip(data) {
            *slot = slot.min(v.squared_l2_distance(&chosen));
        }
        centroids.push(chosen);
    }
    centroids
}

fn assign(data: &[Vector], centroids: &[Vector]) -> Vec<usize> {
    data.par_iter()
        .map(|v| {
            let mut best = 0;
            let mut best_dist = f32::INFINITY;
            for (idx, c) in centroids.iter().enumerate() {
                let d = v.squared_l2_distance(c);
                if d < best_dist {
                    best_dist = d;
                    best = idx;
                }
            }
            best
        })
        .collect()
}

/// Mean of each cluster's members; an empty cluster keeps its old centroid
fn update_centroids(data: &[Vector], labels: &[usize], previous: &[Vector], dim: usize) -> Vec<Vector> {
    let k = previous.len();
    let mut sums = vec![vec![0.0f32; dim]; k];
    let mut counts = vec![0usize; k];
    for (v, &label) in data.iter().zip(labels) {
        counts[label] += 1;
        for (s, x) in sums[label].iter_mut().zip(v.as_slice()) {
            *s += x;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                Vector::new(sum.into_iter().map(|s| s / count as f32).collect())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vector> {
        vec![
            Vector::new(vec![0.0, 0.1]),
            Vector::new(vec![0.2, 0.0]),
            Vector::new(vec![0.1, 0.2]),
            Vector::new(vec![10.0, 10.1]),
            Vector::new(vec![10.2, 9.9]),
            Vector::new(vec![9.9, 10.0]),
        ]
    }

    #[test]
    fn test_separates_two_blobs() {
        let mut km = KMeans::new(2);
        let labels = km.fit_predict(&blobs()).unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(km.centroids().len(), 2);
        assert!(km.inertia() < 1.0);
    }

    #[test]
    fn test_same_seed_same_labels() {
        let data = blobs();
        let a = KMeans::new(3).with_seed(7).fit_predict(&data).unwrap();
        let b = KMeans::new(3).with_seed(7).fit_predict(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_identical_rows() {
        let data = vec![Vector::new(vec![1.0, 1.0]); 4];
        let labels = KMeans::new(2).fit_predict(&data).unwrap();
        assert_eq!(labels.len(), 4);
        assert!(labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn test_invalid_cluster_count() {
        let data = blobs();
        assert!(matches!(
            KMeans::new(0).fit(&data),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            KMeans::new(7).fit(&data),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(KMeans::new(2).fit(&[]), Err(Error::EmptyDataset)));
    }
}
