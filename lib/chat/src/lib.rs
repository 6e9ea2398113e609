//! # tabrec Chat
//!
//! Conversational access to a [`SimilarityModel`](tabrec_similarity::SimilarityModel).
//!
//! - [`TitleResolver`] finds a dataset identifier inside a free-text message
//!   (exact, substring, fuzzy, then word overlap)
//! - [`ChatResponder`] turns a message into recommendations or a not-found
//!   reply with suggestions
//! - [`ConversationState`] remembers recent turns for follow-ups
//! - [`Session`] ties a dataset, its current model and the conversation
//!   together behind locks
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use tabrec_chat::Session;
//! use tabrec_core::Dataset;
//! use tabrec_similarity::{EngineConfig, Weights};
//!
//! let dataset = Dataset::from_records(&[
//!     json!({"title": "Alien", "plot": "space horror ship"}),
//!     json!({"title": "Aliens", "plot": "space marines horror"}),
//!     json!({"title": "Heat", "plot": "bank heist crew"}),
//! ]).unwrap();
//!
//! let session = Session::new(dataset, EngineConfig::default()).unwrap();
//! session.build("title", &["plot"], &[] as &[&str]).unwrap();
//!
//! let reply = session.ask("anything like heat?", 2, &Weights::default()).unwrap();
//! assert_eq!(reply.identifier(), Some("Heat"));
//! ```

pub mod conversation;
pub mod matcher;
pub mod resolver;
pub mod respond;
pub mod session;

pub use conversation::{ConversationState, ConversationTurn, DEFAULT_HISTORY_CAPACITY};
pub use matcher::{IndelMatcher, StringMatcher};
pub use resolver::{
    MatchStrategy, QueryOutcome, Resolution, TitleResolver, DEFAULT_FUZZY_THRESHOLD,
    DEFAULT_OVERLAP_THRESHOLD,
};
pub use respond::{ChatResponder, ChatResponse, DEFAULT_EXAMPLE_COUNT, NOT_FOUND_MESSAGE};
pub use session::Session;
