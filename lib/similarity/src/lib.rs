//! # tabrec Similarity
//!
//! The hybrid recommendation engine.
//!
//! ## Features
//!
//! - **Feature construction**: TF-IDF over concatenated text columns and
//!   standardized numeric columns
//! - **Three signals**: text cosine, numeric cosine and k-means cluster
//!   co-membership
//! - **Weighted fusion**: per-call [`Weights`] with a stable, deterministic ranking
//! - **Explainability**: per-signal contribution breakdown for every result
//!
//! ## Example
//!
//! ```rust
//! use tabrec_core::Dataset;
//! use tabrec_similarity::{build, Weights};
//! use serde_json::json;
//!
//! let dataset = Dataset::from_records(&[
//!     json!({"title": "Alien", "plot": "space horror ship", "year": 1979}),
//!     json!({"title": "Aliens", "plot": "space marines horror", "year": 1986}),
//!     json!({"title": "Heat", "plot": "bank heist crew", "year": 1995}),
//! ]).unwrap();
//!
//! let model = build(dataset, "title", &["plot"], &["year"]).unwrap();
//! let result = model.recommend_by_identifier("alien", 2, &Weights::default()).unwrap();
//! assert_eq!(result.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────────┐     ┌──────────────────┐
//! │   Dataset   │────>│ FeatureBuilder │────>│ SimilarityModel  │
//! │  (columns)  │     │ (tfidf, scale) │     │ (text/num/kmeans)│
//! └─────────────┘     └────────────────┘     └──────────────────┘
//!                                                     │
//!                                             ┌────────────────┐
//!                                             │ rank + explain │
//!                                             └────────────────┘
//! ```

pub mod config;
pub mod explain;
pub mod features;
pub mod model;
pub mod rank;
pub mod weights;

pub use config::EngineConfig;
pub use explain::{ExplainedResult, SimilarResponse, SimilarityStats};
pub use features::{FeatureBuilder, FeatureSet, NumericFeatures, TextFeatures};
pub use model::{build, build_with_config, SimilarityModel, SEED_SENTINEL};
pub use rank::{Recommendation, RecommendationResult, SignalScores};
pub use weights::Weights;
