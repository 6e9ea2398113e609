use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Per-column standardization to zero mean and unit variance
///
/// Statistics are population mean and standard deviation of the fitted
/// rows. A constant column keeps a scale of 1.0, so it maps to all zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
    constant: Vec<usize>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute column statistics. Every row must have the same width.
    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        let first = rows.first().ok_or(Error::EmptyDataset)?;
        let dim = first.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                actual: bad.len(),
            });
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; dim];
        for row in rows {
            for (mean, x) in means.iter_mut().zip(row) {
                *mean += x;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut variances = vec![0.0; dim];
        for row in rows {
            for ((var, x), mean) in variances.iter_mut().zip(row).zip(&means) {
                *var += (x - mean) * (x - mean);
            }
        }

        self.constant.clear();
        self.scales = variances
            .into_iter()
            .enumerate()
            .map(|(col, v)| {
                let std = (v / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    self.constant.push(col);
                    1.0
                }
            })
            .collect();
        self.means = means;
        Ok(())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter()
            .map(|row| {
                if row.len() != self.means.len() {
                    return Err(Error::DimensionMismatch {
                        expected: self.means.len(),
                        actual: row.len(),
                    });
                }
                Ok(row
                    .iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(x, (mean, scale))| (x - mean) / scale)
                    .collect())
            })
            .collect()
    }

    pub fn fit_transform(&mut self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.fit(rows)?;
        self.transform(rows)
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Indices of columns that had zero variance at fit time
    pub fn constant_columns(&self) -> &[usize] {
        &self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardizes_columns() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&rows).unwrap();

        assert_eq!(scaler.means(), &[2.0, 20.0]);
        let std = (2.0f64 / 3.0).sqrt();
        assert!((scaler.scales()[0] - std).abs() < 1e-12);
        assert!((out[0][0] + 1.0 / std).abs() < 1e-12);
        assert!((out[2][1] - 1.0 / std).abs() < 1e-12);

        for col in 0..2 {
            let mean: f64 = out.iter().map(|r| r[col]).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let rows = vec![vec![5.0, 1.0], vec![5.0, 3.0]];
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&rows).unwrap();
        assert_eq!(out[0][0], 0.0);
        assert_eq!(out[1][0], 0.0);
        assert_eq!(scaler.constant_columns(), &[0]);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let mut scaler = StandardScaler::new();
        assert!(matches!(
            scaler.fit(&[vec![1.0, 2.0], vec![1.0]]),
            Err(Error::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(scaler.fit(&[]), Err(Error::EmptyDataset)));
    }
}
