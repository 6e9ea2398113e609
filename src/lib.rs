//! # tabrec
//!
//! A hybrid recommender for tabular data.
//!
//! Given a table, an identifier column, and the columns that describe each
//! item, tabrec ranks the rows most similar to a seed row. Three signals are
//! fused with per-call weights:
//!
//! - **Text**: TF-IDF over the concatenated text columns, cosine similarity
//! - **Numeric**: standardized numeric columns, cosine similarity
//! - **Cluster**: k-means co-membership over the combined features
//!
//! Seeds can be named exactly or found inside a free-text message, with a
//! fuzzy fallback for misspellings.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! tabrec --data movies.json --id-column title --text-column plot \
//!     --numeric-column year recommend "Alien"
//! tabrec --data movies.csv --id-column title --text-column plot --format csv \
//!     ask "anything like heat?"
//! tabrec --data movies.json --id-column title --text-column plot chat
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use tabrec::prelude::*;
//! use serde_json::json;
//!
//! let dataset = Dataset::from_records(&[
//!     json!({"title": "Alien", "plot": "space horror ship", "year": 1979}),
//!     json!({"title": "Aliens", "plot": "space marines horror", "year": 1986}),
//!     json!({"title": "Heat", "plot": "bank heist crew", "year": 1995}),
//! ]).unwrap();
//!
//! let model = build(dataset, "title", &["plot"], &["year"]).unwrap();
//! let result = model.recommend_by_identifier("Alien", 2, &Weights::default()).unwrap();
//! assert!(!result.identifiers("title").contains(&"Alien".to_string()));
//!
//! let outcome = TitleResolver::default()
//!     .recommend(&model, "something like aliens please", 2, &Weights::default())
//!     .unwrap();
//! assert!(outcome.is_found());
//! ```
//!
//! ## Crate Structure
//!
//! - [`tabrec-core`](https://docs.rs/tabrec-core) - Datasets, TF-IDF, scaling, k-means, similarity matrices
//! - [`tabrec-similarity`](https://docs.rs/tabrec-similarity) - Feature construction, fusion, ranking, explanations
//! - [`tabrec-chat`](https://docs.rs/tabrec-chat) - Title detection, chat responses, sessions

// Re-export core types
pub use tabrec_core::{
    ColumnType, Dataset, DatasetInfo, Row, Value,
    KMeans, StandardScaler, TfidfVectorizer,
    SimilarityMatrix, SparseVector, Vector,
    Error, Result,
};

// Re-export the engine
pub use tabrec_similarity::{
    build, build_with_config,
    EngineConfig, FeatureBuilder, FeatureSet,
    SimilarityModel, Weights,
    Recommendation, RecommendationResult, SignalScores,
    ExplainedResult, SimilarResponse, SimilarityStats,
};

// Re-export chat
pub use tabrec_chat::{
    ChatResponder, ChatResponse,
    ConversationState, ConversationTurn,
    IndelMatcher, StringMatcher,
    MatchStrategy, QueryOutcome, Resolution, TitleResolver,
    Session,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        build, build_with_config,
        Dataset, Value, Error, Result,
        EngineConfig, SimilarityModel, Weights,
        RecommendationResult,
        TitleResolver, QueryOutcome,
        ChatResponder, ChatResponse, ConversationState, Session,
    };
}
