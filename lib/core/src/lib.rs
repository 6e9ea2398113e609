//! # tabrec Core
//!
//! Core library for the tabrec item recommender.
//!
//! This crate provides the data structures and numeric building blocks:
//!
//! - [`Dataset`] - Ordered rows of dynamically typed [`Value`] cells
//! - [`Vector`] / [`SparseVector`] - Dense and sparse feature rows
//! - [`SimilarityMatrix`] - Dense pairwise cosine similarity
//! - [`TfidfVectorizer`] - Bounded-vocabulary TF-IDF text features
//! - [`StandardScaler`] - Per-column standardization
//! - [`KMeans`] - Seeded k-means++ clustering
//!
//! ## Example
//!
//! ```rust
//! use tabrec_core::{SimilarityMatrix, TfidfVectorizer};
//!
//! let mut tfidf = TfidfVectorizer::default();
//! let rows = tfidf.fit_transform(&["space opera", "space western", "courtroom drama"]).unwrap();
//! let sim = SimilarityMatrix::cosine_sparse(&rows);
//! assert_eq!(sim.get(0, 0), 1.0);
//! assert!(sim.get(0, 1) > sim.get(0, 2));
//! ```

pub mod dataset;
pub mod error;
pub mod kmeans;
pub mod matrix;
pub mod scaler;
pub mod sparse;
pub mod stopwords;
pub mod tfidf;
pub mod value;
pub mod vector;

/// Dense f32 kernels
///
/// - AVX2/FMA on x86_64
/// - Unrolled scalar fallback elsewhere
pub mod simd;

pub use dataset::{ColumnType, Dataset, DatasetInfo, Row};
pub use error::{Error, Result};
pub use kmeans::KMeans;
pub use matrix::SimilarityMatrix;
pub use scaler::StandardScaler;
pub use sparse::SparseVector;
pub use tfidf::{TfidfVectorizer, DEFAULT_MAX_FEATURES};
pub use value::Value;
pub use vector::{Vector, MIN_NORM};
