use serde::{Deserialize, Serialize};

/// Norms at or below this count as zero: such rows are left unscaled and
/// carry no similarity
pub const MIN_NORM: f32 = f32::EPSILON;

/// A dense vector of floating point numbers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    /// Narrow an f64 feature row into a vector
    #[must_use]
    pub fn from_f64(data: &[f64]) -> Self {
        Self {
            data: data.iter().map(|&x| x as f32).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        crate::simd::norm_simd(&self.data)
    }

    #[inline]
    pub fn dot(&self, other: &Vector) -> f32 {
        crate::simd::dot_product_simd(&self.data, &other.data)
    }

    #[inline]
    pub fn squared_l2_distance(&self, other: &Vector) -> f32 {
        crate::simd::squared_l2_distance(&self.data, &other.data)
    }

    /// Normalize the vector to unit length; zero vectors are left untouched
    #[inline]
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > MIN_NORM {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x *= inv_norm;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }

    /// Horizontal concatenation of several vectors
    #[must_use]
    pub fn concat(parts: &[&[f32]]) -> Self {
        let dim = parts.iter().map(|p| p.len()).sum();
        let mut data = Vec::with_capacity(dim);
        for part in parts {
            data.extend_from_slice(part);
        }
        Self { data }
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}
