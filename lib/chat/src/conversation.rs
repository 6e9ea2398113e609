use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// One chat query and the identifier it resolved to, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    pub query: String,
    pub resolved: Option<String>,
}

/// Bounded FIFO of recent turns; the oldest turn is dropped on overflow
#[derive(Debug, Clone)]
pub struct ConversationState {
    capacity: usize,
    turns: VecDeque<ConversationTurn>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ConversationState {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, query: impl Into<String>, resolved: Option<String>) {
        self.turns.push_back(ConversationTurn {
            query: query.into(),
            resolved,
        });
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Most recent resolved identifier, skipping unresolved turns
    pub fn last_resolved_identifier(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find_map(|turn| turn.resolved.as_deref())
    }

    /// Turns, oldest first
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut state = ConversationState::new(3);
        for i in 0..5 {
            state.add(format!("q{}", i), None);
        }
        assert_eq!(state.len(), 3);
        let queries: Vec<String> = state.history().into_iter().map(|t| t.query).collect();
        assert_eq!(queries, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_last_resolved_skips_none() {
        let mut state = ConversationState::default();
        assert_eq!(state.last_resolved_identifier(), None);

        state.add("tell me about heat", Some("Heat".to_string()));
        state.add("and alien?", Some("Alien".to_string()));
        state.add("pizza", None);
        assert_eq!(state.last_resolved_identifier(), Some("Alien"));
    }

    #[test]
    fn test_resolved_turn_can_be_evicted() {
        let mut state = ConversationState::new(2);
        state.add("heat", Some("Heat".to_string()));
        state.add("a", None);
        state.add("b", None);
        assert_eq!(state.last_resolved_identifier(), None);
    }

    #[test]
    fn test_clear_and_capacity() {
        let mut state = ConversationState::new(0);
        assert_eq!(state.capacity(), 1);
        state.add("x", None);
        state.add("y", None);
        assert_eq!(state.history()[0].query, "y");
        state.clear();
        assert!(state.is_empty());
        assert_eq!(ConversationState::default().capacity(), 10);
    }
}
