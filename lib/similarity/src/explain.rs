//! Explainability for recommendation results
//!
//! Serializable views of a [`RecommendationResult`] showing how much each
//! signal contributed to every fused score.

use crate::rank::{RecommendationResult, SignalScores};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// One recommended item with its score breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedResult {
    pub id: String,
    pub index: usize,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<JsonValue>,
    /// Weighted contribution per signal
    pub explain: SignalScores,
}

impl ExplainedResult {
    pub fn from_result(result: &RecommendationResult, id_column: &str, columns: &[String], include_row: bool) -> Vec<Self> {
        result
            .iter()
            .map(|item| Self {
                id: item.value(id_column).as_text().into_owned(),
                index: item.index,
                score: item.score,
                row: include_row.then(|| {
                    let record: Map<String, JsonValue> = columns
                        .iter()
                        .map(|c| (c.clone(), item.value(c).to_json()))
                        .collect();
                    JsonValue::Object(record)
                }),
                explain: item.signals,
            })
            .collect()
    }
}

/// Response body for a seed query
#[derive(Debug, Clone, Serialize)]
pub struct SimilarResponse {
    pub seed: String,
    pub result: Vec<ExplainedResult>,
    pub stats: SimilarityStats,
}

impl SimilarResponse {
    pub fn from_result(result: &RecommendationResult, id_column: &str, columns: &[String], include_row: bool) -> Self {
        Self {
            seed: result.seed_identifier.clone(),
            result: ExplainedResult::from_result(result, id_column, columns, include_row),
            stats: SimilarityStats::compute(result),
        }
    }
}

/// Summary statistics for one recommendation query
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimilarityStats {
    pub candidates_count: usize,
    pub results_count: usize,
    pub avg_score: f32,
    pub best_score: f32,
    /// Signal that contributed most to the best result
    pub top_contributing_signal: Option<String>,
}

impl SimilarityStats {
    pub fn compute(result: &RecommendationResult) -> Self {
        let Some(best) = result.items.first() else {
            return Self {
                candidates_count: result.candidates,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_signal: None,
            };
        };

        let avg_score = result.items.iter().map(|r| r.score).sum::<f32>() / result.len() as f32;
        Self {
            candidates_count: result.candidates,
            results_count: result.len(),
            avg_score,
            best_score: best.score,
            top_contributing_signal: Some(best.signals.dominant().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::Recommendation;
    use tabrec_core::{Row, Value};

    fn item(title: &str, index: usize, score: f32, signals: SignalScores) -> Recommendation {
        let mut row = Row::new();
        row.insert("title".to_string(), Value::from(title));
        Recommendation { index, row, score, signals }
    }

    fn result() -> RecommendationResult {
        RecommendationResult {
            seed_index: 0,
            seed_identifier: "Heat".to_string(),
            candidates: 10,
            items: vec![
                item("Ronin", 3, 0.9, SignalScores { text: 0.2, num: 0.5, cluster: 0.2 }),
                item("Thief", 5, 0.8, SignalScores { text: 0.4, num: 0.2, cluster: 0.2 }),
                item("Collateral", 1, 0.7, SignalScores { text: 0.5, num: 0.2, cluster: 0.0 }),
            ],
        }
    }

    #[test]
    fn test_stats() {
        let stats = SimilarityStats::compute(&result());
        assert_eq!(stats.candidates_count, 10);
        assert_eq!(stats.results_count, 3);
        assert!((stats.best_score - 0.9).abs() < 1e-6);
        assert!((stats.avg_score - 0.8).abs() < 1e-6);
        assert_eq!(stats.top_contributing_signal.as_deref(), Some("num"));
    }

    #[test]
    fn test_empty_stats() {
        let mut empty = result();
        empty.items.clear();
        let stats = SimilarityStats::compute(&empty);
        assert_eq!(stats.results_count, 0);
        assert_eq!(stats.best_score, 0.0);
        assert!(stats.top_contributing_signal.is_none());
    }

    #[test]
    fn test_response_serialization() {
        let columns = vec!["title".to_string()];
        let response = SimilarResponse::from_result(&result(), "title", &columns, true);
        assert_eq!(response.result[0].id, "Ronin");
        assert_eq!(response.result[0].index, 3);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"seed\":\"Heat\""));
        assert!(json.contains("\"explain\""));
        assert!(json.contains("\"row\""));

        let without_rows = ExplainedResult::from_result(&result(), "title", &columns, false);
        assert!(without_rows[0].row.is_none());
    }
}
