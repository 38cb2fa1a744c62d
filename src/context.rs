// src/context.rs

use crate::{models::question::Difficulty, quiz::QuizAttempt};

/// Per-learner interactive state.
///
/// Owned by the caller and passed explicitly into every core operation that
/// reads or changes it. Nothing here is persisted.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub current_topic: String,
    pub current_sub_topic: String,
    pub current_difficulty: Option<Difficulty>,
    /// Set when the learner chose "don't ask again" on an auto-suggestion.
    pub auto_suggestions_disabled: bool,
    /// The quiz being generated, taken or reviewed right after submission.
    pub active_quiz: Option<QuizAttempt>,
}

impl SessionContext {
    /// Drops everything, as on logout.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
