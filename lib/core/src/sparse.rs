use crate::vector::MIN_NORM;
use serde::{Deserialize, Serialize};

/// Sparse vector stored as parallel, index-sorted arrays
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs. Pairs are sorted by index and
    /// explicit zeros are dropped; duplicate indices are summed.
    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_by_key(|(idx, _)| *idx);
        let mut indices: Vec<u32> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f32> = Vec::with_capacity(pairs.len());
        for (idx, value) in pairs {
            if indices.last() == Some(&idx) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
            } else {
                indices.push(idx);
                values.push(value);
            }
        }
        let (indices, values) = indices
            .into_iter()
            .zip(values)
            .filter(|(_, v)| *v != 0.0)
            .unzip();
        Self { indices, values }
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of stored (non-zero) entries
    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Dot product by merging the two sorted index lists
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > MIN_NORM {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Dense copy with `dim` columns; entries at or beyond `dim` are dropped
    pub fn to_dense(&self, dim: usize) -> Vec<f32> {
        let mut dense = vec![0.0f32; dim];
        for (&idx, &value) in self.indices.iter().zip(&self.values) {
            if let Some(slot) = dense.get_mut(idx as usize) {
                *slot = value;
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorts_and_merges() {
        let v = SparseVector::from_pairs(vec![(5, 1.0), (1, 2.0), (5, 0.5), (3, 0.0)]);
        assert_eq!(v.indices(), &[1, 5]);
        assert_eq!(v.values(), &[2.0, 1.5]);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_dot_and_normalize() {
        let mut a = SparseVector::from_pairs(vec![(0, 3.0), (2, 4.0)]);
        let b = SparseVector::from_pairs(vec![(2, 3.0), (7, 1.0)]);
        assert_eq!(a.dot(&b), 12.0);
        a.normalize();
        assert!((a.norm() - 1.0).abs() < 1e-6);

        let mut tiny = SparseVector::from_pairs(vec![(1, 1e-9)]);
        tiny.normalize();
        assert_eq!(tiny.values(), &[1e-9]);
    }

    #[test]
    fn test_to_dense() {
        let a = SparseVector::from_pairs(vec![(1, 1.0), (3, 2.0)]);
        assert_eq!(a.to_dense(4), vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(a.to_dense(2), vec![0.0, 1.0]);
    }
}
