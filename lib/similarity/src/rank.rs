//! Ranked recommendation results
//!
//! Fused scores are computed per candidate, then sorted descending with a
//! stable sort so equal scores keep dataset row order.

use crate::weights::Weights;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::io::Write;
use tabrec_core::{Result, Row, Value};

/// Weighted contribution of each signal to a fused score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SignalScores {
    pub text: f32,
    pub num: f32,
    pub cluster: f32,
}

impl SignalScores {
    pub fn weighted(weights: &Weights, text_sim: f32, num_sim: f32, same_cluster: bool) -> Self {
        Self {
            text: weights.text * text_sim,
            num: weights.num * num_sim,
            cluster: if same_cluster { weights.cluster } else { 0.0 },
        }
    }

    pub fn total(&self) -> f32 {
        self.text + self.num + self.cluster
    }

    /// Name of the largest contribution; ties go to text, then num
    pub fn dominant(&self) -> &'static str {
        let mut best = ("text", self.text);
        for candidate in [("num", self.num), ("cluster", self.cluster)] {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best.0
    }
}

/// One recommended row
#[derive(Debug, Clone)]
pub struct Recommendation {
    /// Dataset row index
    pub index: usize,
    /// The original row
    pub row: Row,
    /// Fused score
    pub score: f32,
    pub signals: SignalScores,
}

impl Recommendation {
    pub fn value(&self, column: &str) -> &Value {
        static MISSING: Value = Value::Missing;
        self.row.get(column).unwrap_or(&MISSING)
    }
}

/// Recommendations for one seed row, best first
#[derive(Debug, Clone)]
pub struct RecommendationResult {
    pub seed_index: usize,
    pub seed_identifier: String,
    /// Rows that were scored (every row except the seed)
    pub candidates: usize,
    pub items: Vec<Recommendation>,
}

impl RecommendationResult {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recommendation> {
        self.items.iter()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.items.iter().map(|r| r.index).collect()
    }

    pub fn scores(&self) -> Vec<f32> {
        self.items.iter().map(|r| r.score).collect()
    }

    /// Identifier column of each result, coerced to text
    pub fn identifiers(&self, id_column: &str) -> Vec<String> {
        self.items
            .iter()
            .map(|r| r.value(id_column).as_text().into_owned())
            .collect()
    }

    /// Output table: every original column in order, plus `score`
    pub fn to_records(&self, columns: &[String]) -> Vec<JsonValue> {
        self.items
            .iter()
            .map(|item| {
                let mut record = Map::with_capacity(columns.len() + 1);
                for column in columns {
                    record.insert(column.clone(), item.value(column).to_json());
                }
                record.insert("score".to_string(), Value::Number(item.score as f64).to_json());
                JsonValue::Object(record)
            })
            .collect()
    }

    /// Output table as CSV: a header row of `columns` plus `score`, then one
    /// record per item. Missing cells are written empty.
    pub fn write_csv<W: Write>(&self, writer: W, columns: &[String]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(columns.iter().map(String::as_str).chain(["score"]))?;
        for item in &self.items {
            let mut record: Vec<String> = columns
                .iter()
                .map(|column| item.value(column).as_text().into_owned())
                .collect();
            record.push(item.score.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RecommendationResult {
    type Item = &'a Recommendation;
    type IntoIter = std::slice::Iter<'a, Recommendation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Stable descending sort by score, truncated to `top_n`
pub fn rank(mut scored: Vec<(usize, f32, SignalScores)>, top_n: usize) -> Vec<(usize, f32, SignalScores)> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_is_stable() {
        let s = SignalScores::default();
        let ranked = rank(vec![(0, 0.5, s), (1, 0.9, s), (2, 0.5, s), (3, 0.7, s)], 3);
        let order: Vec<usize> = ranked.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![1, 3, 0]);
    }

    #[test]
    fn test_signal_scores() {
        let w = Weights::default();
        let s = SignalScores::weighted(&w, 1.0, 0.5, true);
        assert!((s.total() - (0.5 + 0.15 + 0.2)).abs() < 1e-6);
        assert_eq!(s.dominant(), "text");
        let s = SignalScores::weighted(&w, 0.0, 0.0, true);
        assert_eq!(s.dominant(), "cluster");
        assert_eq!(SignalScores::weighted(&w, 1.0, 1.0, false).cluster, 0.0);
    }

    #[test]
    fn test_to_records_appends_score() {
        let mut row = Row::new();
        row.insert("title".to_string(), Value::from("Heat"));
        row.insert("year".to_string(), Value::from(1995.0));
        let result = RecommendationResult {
            seed_index: 1,
            seed_identifier: "Ronin".to_string(),
            candidates: 1,
            items: vec![Recommendation {
                index: 0,
                row,
                score: 0.75,
                signals: SignalScores::default(),
            }],
        };

        let columns = vec!["title".to_string(), "year".to_string(), "plot".to_string()];
        let records = result.to_records(&columns);
        let keys: Vec<&String> = records[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["title", "year", "plot", "score"]);
        assert_eq!(records[0]["score"], serde_json::json!(0.75));
        assert_eq!(records[0]["plot"], serde_json::Value::Null);
        assert_eq!(result.identifiers("title"), vec!["Heat"]);

        let mut out = Vec::new();
        result.write_csv(&mut out, &columns).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "title,year,plot,score\nHeat,1995,,0.75\n");
    }
}
