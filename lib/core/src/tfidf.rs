//! TF-IDF text vectorizer
//!
//! Fit once over the build corpus, then transform rows into L2-normalized
//! sparse vectors. Terms outside the fitted vocabulary are ignored.
//!
//! - tokens: lowercase runs of two or more word characters
//! - stop words from [`crate::stopwords`] are dropped
//! - vocabulary: the `max_features` most frequent terms (ties by term),
//!   indexed alphabetically
//! - idf(t) = ln((1 + n) / (1 + df(t))) + 1

use crate::stopwords::is_stop_word;
use crate::{Error, Result, SparseVector};
use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_FEATURES: usize = 5000;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: AHashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Result<Self> {
        if max_features == 0 {
            return Err(Error::InvalidConfig(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_features,
            vocabulary: AHashMap::new(),
            idf: Vec::new(),
        })
    }

    /// Lowercase, split into word tokens and drop stop words
    pub fn tokenize(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !is_stop_word(t))
            .map(str::to_string)
            .collect()
    }

    /// Learn the vocabulary and idf weights from a corpus
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let mut term_freq: AHashMap<String, usize> = AHashMap::new();
        let mut doc_freq: AHashMap<String, usize> = AHashMap::new();
        for doc in documents {
            let tokens = Self::tokenize(doc.as_ref());
            let mut seen: AHashSet<&str> = AHashSet::with_capacity(tokens.len());
            for token in &tokens {
                *term_freq.entry(token.clone()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f32;
        self.idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f32;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx as u32))
            .collect();

        if self.vocabulary.is_empty() {
            tracing::warn!("TF-IDF vocabulary is empty; text rows will be all zero");
        }
        Ok(())
    }

    /// Weighted, L2-normalized sparse row for one document
    pub fn transform_one(&self, document: &str) -> SparseVector {
        let mut counts: AHashMap<u32, f32> = AHashMap::new();
        for token in Self::tokenize(document) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let pairs = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx as usize]))
            .collect();
        let mut row = SparseVector::from_pairs(pairs);
        row.normalize();
        row
    }

    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents
            .iter()
            .map(|doc| self.transform_one(doc.as_ref()))
            .collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        Ok(self.transform(documents))
    }

    #[inline]
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    #[inline]
    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self) -> &[f32] {
        &self.idf
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            vocabulary: AHashMap::new(),
            idf: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        let tokens = TfidfVectorizer::tokenize("The Matrix is a 1999 sci-fi film, x y");
        assert_eq!(tokens, vec!["matrix", "1999", "sci", "fi", "film"]);
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let mut v = TfidfVectorizer::default();
        v.fit(&["zebra apple", "apple mango"]).unwrap();
        assert_eq!(v.vocabulary_size(), 3);
        assert_eq!(v.term_index("apple"), Some(0));
        assert_eq!(v.term_index("mango"), Some(1));
        assert_eq!(v.term_index("zebra"), Some(2));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut v = TfidfVectorizer::new(2).unwrap();
        v.fit(&["space space space", "ship ship", "alien"]).unwrap();
        assert_eq!(v.vocabulary_size(), 2);
        assert!(v.term_index("space").is_some());
        assert!(v.term_index("ship").is_some());
        assert!(v.term_index("alien").is_none());
    }

    #[test]
    fn test_smoothed_idf() {
        let mut v = TfidfVectorizer::default();
        v.fit(&["heist crew", "heist"]).unwrap();
        let heist = v.idf()[v.term_index("heist").unwrap() as usize];
        let crew = v.idf()[v.term_index("crew").unwrap() as usize];
        assert!((heist - 1.0).abs() < 1e-6);
        assert!((crew - ((3.0f32 / 2.0).ln() + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_rows_are_normalized_and_unknown_terms_ignored() {
        let mut v = TfidfVectorizer::default();
        let rows = v.fit_transform(&["dream heist", "space travel"]).unwrap();
        assert!((rows[0].norm() - 1.0).abs() < 1e-6);
        assert!(v.transform_one("completely unseen words").is_empty());
    }

    #[test]
    fn test_only_stop_words_gives_empty_vocabulary() {
        let mut v = TfidfVectorizer::default();
        let rows = v.fit_transform(&["the and of", "a an"]).unwrap();
        assert_eq!(v.vocabulary_size(), 0);
        assert!(rows.iter().all(SparseVector::is_empty));
    }

    #[test]
    fn test_zero_max_features_rejected() {
        assert!(matches!(TfidfVectorizer::new(0), Err(Error::InvalidConfig(_))));
    }
}
