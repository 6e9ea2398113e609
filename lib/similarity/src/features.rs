//! Feature construction
//!
//! Turns the selected dataset columns into one sparse TF-IDF row and one
//! standardized numeric row per dataset row. A family with no selected
//! columns is `None`, never an empty matrix.

use crate::config::EngineConfig;
use std::time::Instant;
use tabrec_core::{Dataset, Result, SparseVector, StandardScaler, TfidfVectorizer, Vector};
use tracing::{debug, info, warn};

/// Fitted TF-IDF model plus one row per dataset row
#[derive(Debug, Clone)]
pub struct TextFeatures {
    pub columns: Vec<String>,
    pub vectorizer: TfidfVectorizer,
    pub rows: Vec<SparseVector>,
}

impl TextFeatures {
    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    /// Densified rows, used as clustering input
    pub fn to_dense(&self) -> Vec<Vec<f32>> {
        let dim = self.vocabulary_size();
        self.rows.iter().map(|r| r.to_dense(dim)).collect()
    }
}

/// Fitted scaler plus one standardized row per dataset row
#[derive(Debug, Clone)]
pub struct NumericFeatures {
    pub columns: Vec<String>,
    pub scaler: StandardScaler,
    pub rows: Vec<Vector>,
}

impl NumericFeatures {
    pub fn dim(&self) -> usize {
        self.columns.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub text: Option<TextFeatures>,
    pub numeric: Option<NumericFeatures>,
}

impl FeatureSet {
    pub fn has_features(&self) -> bool {
        self.text.is_some() || self.numeric.is_some()
    }

    /// Row count of each present family, text first
    pub fn row_counts(&self) -> Vec<usize> {
        let mut counts = Vec::new();
        if let Some(text) = &self.text {
            counts.push(text.rows.len());
        }
        if let Some(numeric) = &self.numeric {
            counts.push(numeric.rows.len());
        }
        counts
    }
}

/// Builds a [`FeatureSet`] from column selections
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    config: EngineConfig,
}

impl FeatureBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn build<S: AsRef<str>>(
        &self,
        dataset: &Dataset,
        text_columns: &[S],
        numeric_columns: &[S],
    ) -> Result<FeatureSet> {
        if dataset.is_empty() {
            return Err(tabrec_core::Error::EmptyDataset);
        }
        dataset.require_columns(text_columns)?;
        dataset.require_columns(numeric_columns)?;

        let start = Instant::now();
        let text = if text_columns.is_empty() {
            None
        } else {
            Some(self.build_text(dataset, text_columns)?)
        };
        let numeric = if numeric_columns.is_empty() {
            None
        } else {
            Some(self.build_numeric(dataset, numeric_columns)?)
        };

        info!(
            rows = dataset.len(),
            vocabulary = text.as_ref().map_or(0, TextFeatures::vocabulary_size),
            numeric_dims = numeric.as_ref().map_or(0, NumericFeatures::dim),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Features built"
        );
        Ok(FeatureSet { text, numeric })
    }

    fn build_text<S: AsRef<str>>(&self, dataset: &Dataset, columns: &[S]) -> Result<TextFeatures> {
        let documents: Vec<String> = (0..dataset.len())
            .map(|idx| combined_text(dataset, idx, columns))
            .collect();
        let mut vectorizer = TfidfVectorizer::new(self.config.max_features)?;
        let rows = vectorizer.fit_transform(&documents)?;
        debug!(vocabulary = vectorizer.vocabulary_size(), "TF-IDF fitted");
        Ok(TextFeatures {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            vectorizer,
            rows,
        })
    }

    fn build_numeric<S: AsRef<str>>(&self, dataset: &Dataset, columns: &[S]) -> Result<NumericFeatures> {
        let raw: Vec<Vec<f64>> = (0..dataset.len())
            .map(|idx| {
                columns
                    .iter()
                    .map(|c| dataset.value(idx, c.as_ref()).as_number().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&raw)?;
        for &col in scaler.constant_columns() {
            warn!(column = columns[col].as_ref(), "Numeric column has zero variance");
        }

        Ok(NumericFeatures {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            scaler,
            rows: scaled.iter().map(|r| Vector::from_f64(r)).collect(),
        })
    }
}

/// Selected columns of one row as text, joined with single spaces
pub fn combined_text<S: AsRef<str>>(dataset: &Dataset, idx: usize, columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| dataset.value(idx, c.as_ref()).as_text().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabrec_core::Error;

    fn movies() -> Dataset {
        Dataset::from_records(&[
            json!({"title": "Heat", "plot": "bank heist crew", "genre": "crime", "year": 1995, "rating": 8.3}),
            json!({"title": "Inception", "plot": "dream heist", "genre": "scifi", "year": 2010, "rating": "8.8"}),
            json!({"title": "Alien", "plot": "space horror", "genre": "horror", "year": 1979, "rating": null}),
        ])
        .unwrap()
    }

    const NONE: &[&str] = &[];

    #[test]
    fn test_absent_selections_are_none() {
        let features = FeatureBuilder::default().build(&movies(), NONE, NONE).unwrap();
        assert!(features.text.is_none());
        assert!(features.numeric.is_none());
        assert!(!features.has_features());
    }

    #[test]
    fn test_text_path() {
        let features = FeatureBuilder::default()
            .build(&movies(), &["plot", "genre"], NONE)
            .unwrap();
        let text = features.text.unwrap();
        assert_eq!(text.rows.len(), 3);
        assert!(text.vectorizer.term_index("heist").is_some());
        assert!(text.vectorizer.term_index("crime").is_some());
        assert_eq!(text.to_dense()[0].len(), text.vocabulary_size());
    }

    #[test]
    fn test_numeric_path_imputes_and_scales() {
        let features = FeatureBuilder::default()
            .build(&movies(), NONE, &["year", "rating"])
            .unwrap();
        let numeric = features.numeric.unwrap();
        assert_eq!(numeric.rows.len(), 3);
        assert_eq!(numeric.dim(), 2);
        // missing rating imputed to 0.0 before scaling
        let expected_mean = (8.3 + 8.8 + 0.0) / 3.0;
        assert!((numeric.scaler.means()[1] - expected_mean).abs() < 1e-9);
        let col_sum: f32 = numeric.rows.iter().map(|r| r.as_slice()[0]).sum();
        assert!(col_sum.abs() < 1e-4);
    }

    #[test]
    fn test_combined_text() {
        let ds = movies();
        assert_eq!(combined_text(&ds, 0, &["title", "year"]), "Heat 1995");
        assert_eq!(combined_text(&ds, 2, &["rating", "title"]), " Alien");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            FeatureBuilder::default().build(&movies(), &["plot", "budget"], NONE),
            Err(Error::InvalidColumn(c)) if c == "budget"
        ));
        assert!(matches!(
            FeatureBuilder::default().build(&movies(), NONE, &["box_office"]),
            Err(Error::InvalidColumn(_))
        ));
        assert!(matches!(
            FeatureBuilder::default().build(&Dataset::default(), &["plot"], NONE),
            Err(Error::EmptyDataset)
        ));
    }
}
