//! Chat responses
//!
//! Turns a free-text message into something a UI can show directly. This
//! layer never fails: resolution and ranking errors become messages.

use crate::resolver::TitleResolver;
use serde_json::{json, Value as JsonValue};
use tabrec_core::Result;
use tabrec_similarity::{RecommendationResult, SimilarityModel, Weights};
use tracing::warn;

pub const DEFAULT_EXAMPLE_COUNT: usize = 5;

pub const NOT_FOUND_MESSAGE: &str = "I couldn't find a title from the dataset in your message. \
Try the exact title, or pick one of the items listed below.";

#[derive(Debug, Clone)]
pub enum ChatResponse {
    /// A title was detected and ranked
    Recommendations {
        identifier: String,
        result: RecommendationResult,
    },
    /// No title was detected
    NotFound {
        message: String,
        examples: Vec<String>,
    },
    /// A title was detected but ranking failed
    Failed {
        identifier: String,
        message: String,
    },
}

impl ChatResponse {
    /// The detected identifier, if any
    pub fn identifier(&self) -> Option<&str> {
        match self {
            ChatResponse::Recommendations { identifier, .. } | ChatResponse::Failed { identifier, .. } => {
                Some(identifier)
            }
            ChatResponse::NotFound { .. } => None,
        }
    }

    pub fn result(&self) -> Option<&RecommendationResult> {
        match self {
            ChatResponse::Recommendations { result, .. } => Some(result),
            _ => None,
        }
    }

    /// JSON rendering; recommendations use the output table layout
    pub fn to_json(&self, columns: &[String]) -> JsonValue {
        match self {
            ChatResponse::Recommendations { identifier, result } => json!({
                "title_detected": identifier,
                "recommendations": result.to_records(columns),
            }),
            ChatResponse::NotFound { message, examples } => json!({
                "title_detected": null,
                "message": message,
                "examples": examples,
            }),
            ChatResponse::Failed { identifier, message } => json!({
                "title_detected": identifier,
                "message": message,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatResponder {
    resolver: TitleResolver,
    example_count: usize,
}

impl Default for ChatResponder {
    fn default() -> Self {
        Self::new(TitleResolver::default())
    }
}

impl ChatResponder {
    pub fn new(resolver: TitleResolver) -> Self {
        Self {
            resolver,
            example_count: DEFAULT_EXAMPLE_COUNT,
        }
    }

    #[must_use]
    pub fn with_example_count(mut self, count: usize) -> Self {
        self.example_count = count;
        self
    }

    pub fn resolver(&self) -> &TitleResolver {
        &self.resolver
    }

    pub fn respond(&self, model: &SimilarityModel, query: &str, top_n: usize, weights: &Weights) -> ChatResponse {
        match self.resolver.resolve_detailed(query, model.dataset(), model.id_column()) {
            Ok(Some(resolution)) => {
                let ranked = model.recommend_by_index(resolution.index, top_n, weights);
                Self::ranked(resolution.identifier, ranked)
            }
            Ok(None) => self.not_found(model),
            Err(e) => {
                warn!(error = %e, "Title resolution failed");
                self.not_found(model)
            }
        }
    }

    /// Recommend for an identifier that is already known
    pub fn respond_to(&self, model: &SimilarityModel, identifier: String, top_n: usize, weights: &Weights) -> ChatResponse {
        let ranked = model.recommend_by_identifier(&identifier, top_n, weights);
        Self::ranked(identifier, ranked)
    }

    fn ranked(identifier: String, ranked: Result<RecommendationResult>) -> ChatResponse {
        match ranked {
            Ok(result) => ChatResponse::Recommendations { identifier, result },
            Err(e) => ChatResponse::Failed {
                message: format!("Could not build recommendations: {}", e),
                identifier,
            },
        }
    }

    /// Not-found message with the first identifiers as suggestions
    pub fn not_found(&self, model: &SimilarityModel) -> ChatResponse {
        let examples = (0..model.len().min(self.example_count))
            .map(|idx| model.identifier(idx))
            .collect();
        ChatResponse::NotFound {
            message: NOT_FOUND_MESSAGE.to_string(),
            examples,
        }
    }
}
