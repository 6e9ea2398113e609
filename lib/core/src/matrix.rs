//! Dense pairwise similarity matrices
//!
//! Rows are computed in parallel with rayon. Each cell only depends on its two
//! input rows, so the result does not depend on thread scheduling.

use crate::vector::MIN_NORM;
use crate::{SparseVector, Vector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Square, row-major `n x n` matrix of similarities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// All-zero matrix, used when a feature family is absent
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Pairwise cosine similarity over dense rows
    pub fn cosine_dense(rows: &[Vector]) -> Self {
        let normalized: Vec<Vector> = rows.iter().map(Vector::normalized).collect();
        let nonzero: Vec<bool> = rows.iter().map(|r| r.norm() > MIN_NORM).collect();
        Self::pairwise(rows.len(), &nonzero, |i, j| {
            normalized[i].dot(&normalized[j])
        })
    }

    /// Pairwise cosine similarity over sparse rows
    pub fn cosine_sparse(rows: &[SparseVector]) -> Self {
        let normalized: Vec<SparseVector> = rows
            .iter()
            .map(|r| {
                let mut r = r.clone();
                r.normalize();
                r
            })
            .collect();
        let nonzero: Vec<bool> = rows.iter().map(|r| r.norm() > MIN_NORM).collect();
        Self::pairwise(rows.len(), &nonzero, |i, j| {
            normalized[i].dot(&normalized[j])
        })
    }

    fn pairwise<F>(n: usize, nonzero: &[bool], cell: F) -> Self
    where
        F: Fn(usize, usize) -> f32 + Sync,
    {
        let mut data = vec![0.0f32; n * n];
        data.par_chunks_mut(n.max(1))
            .enumerate()
            .for_each(|(i, row)| {
                for (j, slot) in row.iter_mut().enumerate() {
                    *slot = if !nonzero[i] || !nonzero[j] {
                        0.0
                    } else if i == j {
                        1.0
                    } else {
                        // Compute each unordered pair in a fixed orientation
                        // so (i, j) and (j, i) are bit-identical.
                        let (a, b) = if i < j { (i, j) } else { (j, i) };
                        cell(a, b).clamp(-1.0, 1.0)
                    };
                }
            });
        Self { n, data }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_diagonal_and_symmetry() {
        let rows = vec![
            Vector::new(vec![1.0, 2.0]),
            Vector::new(vec![2.0, 1.0]),
            Vector::new(vec![-1.0, 0.5]),
        ];
        let m = SimilarityMatrix::cosine_dense(&rows);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert!((m.get(0, 1) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_zero_rows_have_zero_similarity() {
        let rows = vec![Vector::zeros(2), Vector::new(vec![1.0, 0.0])];
        let m = SimilarityMatrix::cosine_dense(&rows);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn test_residue_norm_rows_count_as_zero() {
        let rows = vec![
            Vector::new(vec![1e-9, -2e-9]),
            Vector::new(vec![1.0, -1.0]),
        ];
        let m = SimilarityMatrix::cosine_dense(&rows);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get(1, 0), 0.0);
        assert_eq!(m.get(1, 1), 1.0);

        let sparse = vec![
            SparseVector::from_pairs(vec![(0, 1e-9)]),
            SparseVector::from_pairs(vec![(0, 1.0)]),
        ];
        let m = SimilarityMatrix::cosine_sparse(&sparse);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn test_sparse_matches_dense() {
        let sparse = vec![
            SparseVector::from_pairs(vec![(0, 1.0), (2, 1.0)]),
            SparseVector::from_pairs(vec![(2, 1.0)]),
        ];
        let dense: Vec<Vector> = sparse.iter().map(|s| Vector::new(s.to_dense(3))).collect();
        let a = SimilarityMatrix::cosine_sparse(&sparse);
        let b = SimilarityMatrix::cosine_dense(&dense);
        assert!((a.get(0, 1) - b.get(0, 1)).abs() < 1e-6);
        assert_eq!(a.row(1)[1], 1.0);
    }

    #[test]
    fn test_zeros() {
        let m = SimilarityMatrix::zeros(2);
        assert_eq!(m.row(1), &[0.0, 0.0]);
        assert!(SimilarityMatrix::zeros(0).is_empty());
    }
}
