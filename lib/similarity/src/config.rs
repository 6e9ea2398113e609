//! Engine configuration
//!
//! Every field has a serde default, so a partial JSON document (or `{}`)
//! deserializes into a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tabrec_core::{Error, Result, DEFAULT_MAX_FEATURES};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// TF-IDF vocabulary cap
    pub max_features: usize,
    /// k-means seed
    pub seed: u64,
    pub max_iter: usize,
    pub tol: f32,
    pub min_clusters: usize,
    pub max_clusters: usize,
    /// One extra cluster per this many rows, before clamping
    pub rows_per_cluster: usize,
    /// Conversation turns kept per session
    pub history_capacity: usize,
    /// Partial-ratio score (0-100) a fuzzy title match must reach
    pub fuzzy_threshold: f64,
    /// Share of identifier tokens the query must contain (0-1)
    pub overlap_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            seed: 42,
            max_iter: 300,
            tol: 1e-4,
            min_clusters: 2,
            max_clusters: 8,
            rows_per_cluster: 50,
            history_capacity: 10,
            fuzzy_threshold: 68.0,
            overlap_threshold: 0.4,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(Error::InvalidConfig("max_features must be at least 1".to_string()));
        }
        if self.min_clusters == 0 {
            return Err(Error::InvalidConfig("min_clusters must be at least 1".to_string()));
        }
        if self.min_clusters > self.max_clusters {
            return Err(Error::InvalidConfig(format!(
                "min_clusters ({}) exceeds max_clusters ({})",
                self.min_clusters, self.max_clusters
            )));
        }
        if self.rows_per_cluster == 0 {
            return Err(Error::InvalidConfig("rows_per_cluster must be at least 1".to_string()));
        }
        if self.history_capacity == 0 {
            return Err(Error::InvalidConfig("history_capacity must be at least 1".to_string()));
        }
        if !(0.0..=100.0).contains(&self.fuzzy_threshold) {
            return Err(Error::InvalidConfig(format!(
                "fuzzy_threshold must be within 0..=100, got {}",
                self.fuzzy_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(Error::InvalidConfig(format!(
                "overlap_threshold must be within 0..=1, got {}",
                self.overlap_threshold
            )));
        }
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(Error::InvalidConfig(format!("tol must be non-negative, got {}", self.tol)));
        }
        Ok(())
    }

    /// `clamp(rows / rows_per_cluster + min_clusters, min_clusters, max_clusters)`,
    /// never more than the row count
    pub fn cluster_count(&self, rows: usize) -> usize {
        let k = (rows / self.rows_per_cluster + self.min_clusters)
            .clamp(self.min_clusters, self.max_clusters);
        k.min(rows.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_features, 5000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.fuzzy_threshold, 68.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cluster_count() {
        let config = EngineConfig::default();
        assert_eq!(config.cluster_count(10), 2);
        assert_eq!(config.cluster_count(49), 2);
        assert_eq!(config.cluster_count(50), 3);
        assert_eq!(config.cluster_count(120), 4);
        assert_eq!(config.cluster_count(10_000), 8);
        assert_eq!(config.cluster_count(1), 1);
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(r#"{"seed": 7, "max_clusters": 4}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_clusters, 4);
        assert_eq!(config.max_features, 5000);
    }

    #[test]
    fn test_from_json_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"history_capacity": 3, "fuzzy_threshold": 75.0}}"#).unwrap();
        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.history_capacity, 3);
        assert_eq!(config.fuzzy_threshold, 75.0);
    }

    #[test]
    fn test_validation() {
        let bad = EngineConfig {
            min_clusters: 5,
            max_clusters: 3,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));

        let bad = EngineConfig {
            fuzzy_threshold: 120.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        assert!(EngineConfig::from_json_str(r#"{"max_features": 0}"#).is_err());
        assert!(EngineConfig::from_json_file("/nonexistent/engine.json").is_err());
        assert!(EngineConfig::from_json_str("not json").is_err());
    }
}
