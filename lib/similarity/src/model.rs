//! Hybrid similarity model
//!
//! Holds the pairwise text and numeric cosine matrices plus one k-means
//! label per row, and fuses them into rankings:
//!
//! ```text
//! score[j] = w.text * text[idx][j] + w.num * num[idx][j] + w.cluster * [label j == label idx]
//! ```
//!
//! The model is immutable once built. Rebuilding produces a new model.

use crate::config::EngineConfig;
use crate::features::{FeatureBuilder, FeatureSet};
use crate::rank::{rank, Recommendation, RecommendationResult, SignalScores};
use crate::weights::Weights;
use std::sync::Arc;
use std::time::Instant;
use tabrec_core::{Dataset, Error, KMeans, Result, SimilarityMatrix, Vector};
use tracing::{debug, info, warn};

/// Score given to the seed row so it can never rank
pub const SEED_SENTINEL: f32 = f32::NEG_INFINITY;

#[derive(Debug, Clone)]
pub struct SimilarityModel {
    dataset: Arc<Dataset>,
    id_column: String,
    features: FeatureSet,
    text_similarity: SimilarityMatrix,
    numeric_similarity: SimilarityMatrix,
    cluster_labels: Vec<usize>,
    n_clusters: usize,
    config: EngineConfig,
}

impl SimilarityModel {
    /// Build a model from already constructed features
    pub fn build(
        dataset: impl Into<Arc<Dataset>>,
        id_column: &str,
        features: FeatureSet,
        config: &EngineConfig,
    ) -> Result<Self> {
        let dataset = dataset.into();
        config.validate()?;
        let n = dataset.len();
        if n == 0 {
            return Err(Error::EmptyDataset);
        }
        dataset.require_column(id_column)?;
        if let Some(&actual) = features.row_counts().iter().find(|&&c| c != n) {
            return Err(Error::DimensionMismatch { expected: n, actual });
        }

        let start = Instant::now();
        let text_similarity = match &features.text {
            Some(text) => SimilarityMatrix::cosine_sparse(&text.rows),
            None => SimilarityMatrix::zeros(n),
        };
        let numeric_similarity = match &features.numeric {
            Some(numeric) => SimilarityMatrix::cosine_dense(&numeric.rows),
            None => SimilarityMatrix::zeros(n),
        };
        let (cluster_labels, n_clusters) = cluster(&features, n, config)?;

        info!(
            rows = n,
            vocabulary = features.text.as_ref().map_or(0, |t| t.vocabulary_size()),
            numeric_dims = features.numeric.as_ref().map_or(0, |f| f.dim()),
            clusters = n_clusters,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Similarity model built"
        );

        Ok(Self {
            dataset,
            id_column: id_column.to_string(),
            features,
            text_similarity,
            numeric_similarity,
            cluster_labels,
            n_clusters,
            config: config.clone(),
        })
    }

    #[inline]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[inline]
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    #[inline]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn text_similarity(&self) -> &SimilarityMatrix {
        &self.text_similarity
    }

    pub fn numeric_similarity(&self) -> &SimilarityMatrix {
        &self.numeric_similarity
    }

    pub fn cluster_labels(&self) -> &[usize] {
        &self.cluster_labels
    }

    /// Clusters used by k-means; 1 when no features were available
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Identifier value of a row, coerced to text
    pub fn identifier(&self, idx: usize) -> String {
        self.dataset.value(idx, &self.id_column).as_text().into_owned()
    }

    /// Every identifier in row order
    pub fn identifiers(&self) -> Vec<String> {
        (0..self.len()).map(|idx| self.identifier(idx)).collect()
    }

    /// Row index for a seed identifier
    ///
    /// Exact trimmed, case-insensitive match first; otherwise the first row
    /// whose identifier contains the trimmed, lowercased seed.
    pub fn find_index(&self, identifier: &str) -> Option<usize> {
        let needle = identifier.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let values: Vec<String> = (0..self.len())
            .map(|idx| self.identifier(idx).to_lowercase())
            .collect();

        values
            .iter()
            .position(|v| v.trim() == needle)
            .or_else(|| values.iter().position(|v| v.contains(&needle)))
    }

    /// Fused scores of every row against `idx`; the seed gets [`SEED_SENTINEL`]
    pub fn scores(&self, idx: usize, weights: &Weights) -> Result<Vec<f32>> {
        self.check_index(idx)?;
        weights.validate()?;
        Ok((0..self.len())
            .map(|j| {
                if j == idx {
                    SEED_SENTINEL
                } else {
                    self.signals(idx, j, weights).total()
                }
            })
            .collect())
    }

    pub fn recommend_by_index(&self, idx: usize, top_n: usize, weights: &Weights) -> Result<RecommendationResult> {
        self.check_index(idx)?;
        if top_n == 0 {
            return Err(Error::InvalidArgument("top_n must be at least 1".to_string()));
        }
        weights.validate()?;

        let scored: Vec<(usize, f32, SignalScores)> = (0..self.len())
            .filter(|&j| j != idx)
            .map(|j| {
                let signals = self.signals(idx, j, weights);
                (j, signals.total(), signals)
            })
            .collect();
        let candidates = scored.len();
        let ranked = rank(scored, top_n);

        debug!(
            seed = idx,
            top_n,
            returned = ranked.len(),
            best = ranked.first().map(|r| r.1),
            "Ranked recommendations"
        );

        let items = ranked
            .into_iter()
            .map(|(index, score, signals)| Recommendation {
                index,
                row: self.dataset.rows()[index].clone(),
                score,
                signals,
            })
            .collect();

        Ok(RecommendationResult {
            seed_index: idx,
            seed_identifier: self.identifier(idx),
            candidates,
            items,
        })
    }

    pub fn recommend_by_identifier(
        &self,
        identifier: &str,
        top_n: usize,
        weights: &Weights,
    ) -> Result<RecommendationResult> {
        let idx = self
            .find_index(identifier)
            .ok_or_else(|| Error::TitleNotFound(identifier.to_string()))?;
        debug!(identifier, idx, "Seed resolved");
        self.recommend_by_index(idx, top_n, weights)
    }

    fn signals(&self, idx: usize, j: usize, weights: &Weights) -> SignalScores {
        SignalScores::weighted(
            weights,
            self.text_similarity.get(idx, j),
            self.numeric_similarity.get(idx, j),
            self.cluster_labels[j] == self.cluster_labels[idx],
        )
    }

    fn check_index(&self, idx: usize) -> Result<()> {
        if idx >= self.len() {
            return Err(Error::InvalidArgument(format!(
                "row index {} out of range for {} rows",
                idx,
                self.len()
            )));
        }
        Ok(())
    }
}

/// k-means over `[numeric | densified text]`, or all zeros without features
fn cluster(features: &FeatureSet, n: usize, config: &EngineConfig) -> Result<(Vec<usize>, usize)> {
    let numeric = features.numeric.as_ref();
    let dense_text = features.text.as_ref().map(|t| t.to_dense());

    let width = numeric.map_or(0, |f| f.dim()) + features.text.as_ref().map_or(0, |t| t.vocabulary_size());
    if width == 0 {
        if features.has_features() {
            warn!("No usable feature columns for clustering; all rows share cluster 0");
        }
        return Ok((vec![0; n], 1));
    }

    let combined: Vec<Vector> = (0..n)
        .map(|i| {
            let num_part = numeric.map_or(&[][..], |f| f.rows[i].as_slice());
            let text_part = dense_text.as_ref().map_or(&[][..], |t| t[i].as_slice());
            Vector::concat(&[num_part, text_part])
        })
        .collect();

    let k = config.cluster_count(n);
    let mut kmeans = KMeans::new(k)
        .with_seed(config.seed)
        .with_max_iter(config.max_iter)
        .with_tol(config.tol);
    let labels = kmeans.fit_predict(&combined)?;
    debug!(k, iterations = kmeans.n_iter(), inertia = kmeans.inertia(), "k-means converged");
    Ok((labels, k))
}

/// Build features and a model in one step with the default configuration
pub fn build<S: AsRef<str>>(
    dataset: impl Into<Arc<Dataset>>,
    id_column: &str,
    text_columns: &[S],
    numeric_columns: &[S],
) -> Result<SimilarityModel> {
    build_with_config(dataset, id_column, text_columns, numeric_columns, &EngineConfig::default())
}

pub fn build_with_config<S: AsRef<str>>(
    dataset: impl Into<Arc<Dataset>>,
    id_column: &str,
    text_columns: &[S],
    numeric_columns: &[S],
    config: &EngineConfig,
) -> Result<SimilarityModel> {
    let dataset = dataset.into();
    config.validate()?;
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }
    dataset.require_column(id_column)?;
    let features = FeatureBuilder::new(config.clone()).build(&dataset, text_columns, numeric_columns)?;
    SimilarityModel::build(dataset, id_column, features, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NONE: &[&str] = &[];

    fn movies() -> Dataset {
        Dataset::from_records(&[
            json!({"title": "Heat", "plot": "bank heist crew los angeles", "year": 1995, "rating": 8.3}),
            json!({"title": "Inception", "plot": "dream heist crew subconscious", "year": 2010, "rating": 8.8}),
            json!({"title": "Alien", "plot": "space horror crew ship", "year": 1979, "rating": 8.5}),
            json!({"title": "Aliens", "plot": "space marines horror ship", "year": 1986, "rating": 8.4}),
            json!({"title": "Up", "plot": "balloon house adventure", "year": 2009, "rating": 8.3}),
        ])
        .unwrap()
    }

    fn model() -> SimilarityModel {
        build(movies(), "title", &["plot"], &["year", "rating"]).unwrap()
    }

    #[test]
    fn test_diagonals_and_symmetry() {
        let m = model();
        for i in 0..m.len() {
            assert_eq!(m.text_similarity().get(i, i), 1.0);
            assert_eq!(m.numeric_similarity().get(i, i), 1.0);
            for j in 0..m.len() {
                assert_eq!(m.text_similarity().get(i, j), m.text_similarity().get(j, i));
                assert_eq!(m.numeric_similarity().get(i, j), m.numeric_similarity().get(j, i));
            }
        }
    }

    #[test]
    fn test_seed_excluded_and_sorted() {
        let m = model();
        for idx in 0..m.len() {
            for top_n in 1..=6 {
                let result = m.recommend_by_index(idx, top_n, &Weights::default()).unwrap();
                assert_eq!(result.len(), top_n.min(m.len() - 1));
                assert!(!result.indices().contains(&idx));
                let scores = result.scores();
                assert!(scores.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn test_text_only_ranking() {
        let m = model();
        let result = m
            .recommend_by_identifier("Alien", 1, &Weights::new(1.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(result.identifiers("title"), vec!["Aliens"]);
    }

    #[test]
    fn test_seed_sentinel() {
        let m = model();
        let scores = m.scores(2, &Weights::default()).unwrap();
        assert_eq!(scores[2], SEED_SENTINEL);
        assert!(scores.iter().enumerate().all(|(j, &s)| j == 2 || s > SEED_SENTINEL));
    }

    #[test]
    fn test_no_features_gives_zero_model() {
        let m = build(movies(), "title", NONE, NONE).unwrap();
        assert!(m.cluster_labels().iter().all(|&l| l == 0));
        assert_eq!(m.text_similarity().get(0, 0), 0.0);

        // every candidate scores exactly the cluster weight; order is row order
        let result = m.recommend_by_index(0, 4, &Weights::default()).unwrap();
        assert_eq!(result.indices(), vec![1, 2, 3, 4]);
        assert!(result.scores().iter().all(|&s| (s - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_deterministic_builds() {
        let a = model();
        let b = model();
        assert_eq!(a.cluster_labels(), b.cluster_labels());
        let w = Weights::default();
        for idx in 0..a.len() {
            let ra = a.recommend_by_index(idx, 3, &w).unwrap();
            let rb = b.recommend_by_index(idx, 3, &w).unwrap();
            assert_eq!(ra.indices(), rb.indices());
            assert_eq!(ra.scores(), rb.scores());
        }
    }

    #[test]
    fn test_find_index() {
        let m = model();
        assert_eq!(m.find_index("  alien "), Some(2));
        assert_eq!(m.find_index("ALIENS"), Some(3));
        assert_eq!(m.find_index("incep"), Some(1));
        assert_eq!(m.find_index("lien"), Some(2));
        assert_eq!(m.find_index("Jaws"), None);
        assert_eq!(m.find_index("   "), None);
    }

    #[test]
    fn test_errors() {
        let m = model();
        assert!(matches!(
            m.recommend_by_identifier("Jaws", 3, &Weights::default()),
            Err(Error::TitleNotFound(t)) if t == "Jaws"
        ));
        assert!(matches!(
            m.recommend_by_index(0, 3, &Weights::new(0.5, -0.3, 0.2)),
            Err(Error::InvalidWeights(_))
        ));
        assert!(matches!(
            m.recommend_by_index(0, 0, &Weights::default()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            m.recommend_by_index(99, 3, &Weights::default()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            build(movies(), "name", &["plot"], NONE),
            Err(Error::InvalidColumn(c)) if c == "name"
        ));
        assert!(matches!(
            build(Dataset::default(), "title", &["plot"], NONE),
            Err(Error::EmptyDataset)
        ));
    }

    #[test]
    fn test_feature_row_mismatch() {
        let features = FeatureBuilder::default()
            .build(&movies(), NONE, &["year"])
            .unwrap();
        let smaller = Dataset::from_records(&[
            json!({"title": "Heat"}),
            json!({"title": "Inception"}),
            json!({"title": "Alien"}),
        ])
        .unwrap();
        assert!(matches!(
            SimilarityModel::build(smaller, "title", features, &EngineConfig::default()),
            Err(Error::DimensionMismatch { expected: 3, actual: 5 })
        ));
    }

    #[test]
    fn test_single_row() {
        let ds = Dataset::from_records(&[json!({"title": "Solo", "plot": "one"})]).unwrap();
        let m = build(ds, "title", &["plot"], NONE).unwrap();
        assert!(m.recommend_by_index(0, 5, &Weights::default()).unwrap().is_empty());
    }
}
