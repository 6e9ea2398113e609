//! Session state
//!
//! A [`Session`] owns one dataset, the most recently built model, and the
//! conversation history. A build computes the new model without holding the
//! model lock and swaps it in afterwards, so readers see either the old model
//! or the new one, never a partial build. Builds are serialized.

use crate::conversation::{ConversationState, ConversationTurn};
use crate::resolver::{QueryOutcome, TitleResolver};
use crate::respond::{ChatResponder, ChatResponse};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tabrec_core::{Dataset, Error, Result};
use tabrec_similarity::{build_with_config, EngineConfig, RecommendationResult, SimilarityModel, Weights};
use tracing::{debug, info};

pub struct Session {
    dataset: Arc<Dataset>,
    config: EngineConfig,
    model: RwLock<Option<Arc<SimilarityModel>>>,
    build_lock: Mutex<()>,
    conversation: Mutex<ConversationState>,
    responder: ChatResponder,
}

impl Session {
    pub fn new(dataset: impl Into<Arc<Dataset>>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let responder = ChatResponder::new(TitleResolver::from_config(&config));
        Ok(Self {
            dataset: dataset.into(),
            conversation: Mutex::new(ConversationState::new(config.history_capacity)),
            config,
            model: RwLock::new(None),
            build_lock: Mutex::new(()),
            responder,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build features and a model, replacing any previous model
    pub fn build<S: AsRef<str>>(
        &self,
        id_column: &str,
        text_columns: &[S],
        numeric_columns: &[S],
    ) -> Result<Arc<SimilarityModel>> {
        let _guard = self.build_lock.lock();
        let model = Arc::new(build_with_config(
            Arc::clone(&self.dataset),
            id_column,
            text_columns,
            numeric_columns,
            &self.config,
        )?);
        *self.model.write() = Some(Arc::clone(&model));
        info!(id_column, rows = model.len(), "Session model replaced");
        Ok(model)
    }

    pub fn is_built(&self) -> bool {
        self.model.read().is_some()
    }

    /// Current model, or `ModelNotBuilt`
    pub fn model(&self) -> Result<Arc<SimilarityModel>> {
        self.model.read().clone().ok_or(Error::ModelNotBuilt)
    }

    pub fn recommend_by_seed(&self, seed: &str, top_n: usize, weights: &Weights) -> Result<RecommendationResult> {
        self.model()?.recommend_by_identifier(seed, top_n, weights)
    }

    pub fn recommend_by_query(&self, query: &str, top_n: usize, weights: &Weights) -> Result<QueryOutcome> {
        let model = self.model()?;
        self.responder.resolver().recommend(&model, query, top_n, weights)
    }

    /// Answer a chat message and record the turn
    pub fn ask(&self, query: &str, top_n: usize, weights: &Weights) -> Result<ChatResponse> {
        let model = self.model()?;
        let response = self.responder.respond(&model, query, top_n, weights);
        self.conversation
            .lock()
            .add(query, response.identifier().map(str::to_string));
        Ok(response)
    }

    /// Recommend again for the last identifier the conversation resolved
    pub fn ask_followup(&self, query: &str, top_n: usize, weights: &Weights) -> Result<ChatResponse> {
        let model = self.model()?;
        let last = self.last_resolved_identifier();
        debug!(query, last = last.as_deref(), "Follow-up request");
        let response = match last {
            Some(identifier) => self.responder.respond_to(&model, identifier, top_n, weights),
            None => self.responder.not_found(&model),
        };
        self.conversation
            .lock()
            .add(query, response.identifier().map(str::to_string));
        Ok(response)
    }

    pub fn last_resolved_identifier(&self) -> Option<String> {
        self.conversation
            .lock()
            .last_resolved_identifier()
            .map(str::to_string)
    }

    /// Conversation turns, oldest first
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.conversation.lock().history()
    }

    pub fn clear_history(&self) {
        self.conversation.lock().clear();
    }
}
