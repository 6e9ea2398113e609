//! Free-text title detection
//!
//! A query is matched against every identifier with a fixed cascade; the
//! first strategy that finds something wins:
//!
//! 1. exact (trimmed, case-folded equality)
//! 2. substring (identifier appears inside the query)
//! 3. fuzzy (partial ratio at or above the fuzzy threshold)
//! 4. word overlap (share of identifier tokens present in the query)
//!
//! "Not found" is `Ok(None)`, not an error.

use crate::matcher::{IndelMatcher, StringMatcher};
use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tabrec_core::{Dataset, Result};
use tabrec_similarity::{EngineConfig, RecommendationResult, SimilarityModel, Weights};
use tracing::debug;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w'-]+").expect("valid word regex"));

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 68.0;
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Substring,
    Fuzzy,
    WordOverlap,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Substring => "substring",
            MatchStrategy::Fuzzy => "fuzzy",
            MatchStrategy::WordOverlap => "word_overlap",
        };
        f.write_str(name)
    }
}

/// A detected identifier and how it was found
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// The identifier exactly as stored in the dataset
    pub identifier: String,
    pub index: usize,
    pub strategy: MatchStrategy,
    /// 100 for exact and substring, the partial ratio for fuzzy, the overlap
    /// share (0-1) for word overlap
    pub score: f64,
}

/// Result of a free-text recommendation request
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Found {
        identifier: String,
        result: RecommendationResult,
    },
    NotFound,
}

impl QueryOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, QueryOutcome::Found { .. })
    }
}

#[derive(Clone)]
pub struct TitleResolver {
    matcher: Arc<dyn StringMatcher>,
    fuzzy_threshold: f64,
    overlap_threshold: f64,
}

impl fmt::Debug for TitleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitleResolver")
            .field("matcher", &self.matcher.name())
            .field("fuzzy_threshold", &self.fuzzy_threshold)
            .field("overlap_threshold", &self.overlap_threshold)
            .finish()
    }
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new(Arc::new(IndelMatcher))
    }
}

impl TitleResolver {
    pub fn new(matcher: Arc<dyn StringMatcher>) -> Self {
        Self {
            matcher,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }

    /// Default matcher with thresholds taken from the engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::default().with_thresholds(config.fuzzy_threshold, config.overlap_threshold)
    }

    #[must_use]
    pub fn with_thresholds(mut self, fuzzy: f64, overlap: f64) -> Self {
        self.fuzzy_threshold = fuzzy;
        self.overlap_threshold = overlap;
        self
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    pub fn overlap_threshold(&self) -> f64 {
        self.overlap_threshold
    }

    /// Best-matching identifier for a query, as stored in the dataset
    pub fn resolve(&self, query: &str, dataset: &Dataset, id_column: &str) -> Result<Option<String>> {
        Ok(self
            .resolve_detailed(query, dataset, id_column)?
            .map(|r| r.identifier))
    }

    pub fn resolve_detailed(&self, query: &str, dataset: &Dataset, id_column: &str) -> Result<Option<Resolution>> {
        let identifiers = dataset.identifiers(id_column)?;
        let resolution = self.resolve_among(query, &identifiers);
        match &resolution {
            Some(r) => debug!(
                query,
                identifier = r.identifier.as_str(),
                strategy = %r.strategy,
                score = r.score,
                "Title resolved"
            ),
            None => debug!(query, "No title found in query"),
        }
        Ok(resolution)
    }

    /// Run the cascade over identifiers given in dataset order
    pub fn resolve_among<S: AsRef<str>>(&self, query: &str, identifiers: &[S]) -> Option<Resolution> {
        let query_folded = query.trim().to_lowercase();
        if query_folded.is_empty() {
            return None;
        }
        let folded: Vec<String> = identifiers.iter().map(|id| id.as_ref().to_lowercase()).collect();
        let found = |index: usize, strategy: MatchStrategy, score: f64| Resolution {
            identifier: identifiers[index].as_ref().to_string(),
            index,
            strategy,
            score,
        };

        if let Some(index) = folded.iter().position(|id| id.trim() == query_folded) {
            return Some(found(index, MatchStrategy::Exact, 100.0));
        }

        if let Some(index) = folded
            .iter()
            .position(|id| !id.trim().is_empty() && query_folded.contains(id.as_str()))
        {
            return Some(found(index, MatchStrategy::Substring, 100.0));
        }

        if let Some((index, score)) = self.best_fuzzy(&query_folded, &folded) {
            return Some(found(index, MatchStrategy::Fuzzy, score));
        }

        self.best_overlap(&query_folded, &folded)
            .map(|(index, score)| found(index, MatchStrategy::WordOverlap, score))
    }

    fn best_fuzzy(&self, query: &str, folded: &[String]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, id) in folded.iter().enumerate() {
            if id.trim().is_empty() {
                continue;
            }
            let score = self.matcher.partial_ratio(query, id);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((index, score));
            }
        }
        best.filter(|&(_, score)| score >= self.fuzzy_threshold)
    }

    fn best_overlap(&self, query: &str, folded: &[String]) -> Option<(usize, f64)> {
        let query_words = words(query);
        if query_words.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, id) in folded.iter().enumerate() {
            let id_words = words(id);
            if id_words.is_empty() {
                continue;
            }
            let common = id_words.intersection(&query_words).count();
            let score = common as f64 / id_words.len() as f64;
            if score >= self.overlap_threshold && best.map_or(true, |(_, b)| score > b) {
                best = Some((index, score));
            }
        }
        best
    }

    /// Detect a title in the query and recommend items similar to it
    pub fn recommend(
        &self,
        model: &SimilarityModel,
        query: &str,
        top_n: usize,
        weights: &Weights,
    ) -> Result<QueryOutcome> {
        let Some(resolution) = self.resolve_detailed(query, model.dataset(), model.id_column())? else {
            return Ok(QueryOutcome::NotFound);
        };
        let result = model.recommend_by_index(resolution.index, top_n, weights)?;
        Ok(QueryOutcome::Found {
            identifier: resolution.identifier,
            result,
        })
    }
}

fn words(text: &str) -> AHashSet<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}
