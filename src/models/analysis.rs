// src/models/analysis.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::question::{Difficulty, QuestionKind};

/// Correct/total counts for one difficulty inside a topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyStats {
    pub correct: u32,
    pub total: u32,
}

impl DifficultyStats {
    /// Fraction correct, or `None` for an empty bucket.
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| f64::from(self.correct) / f64::from(self.total))
    }
}

/// Per topic-key performance over a trailing window. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicPerformance {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// correct / total * 100. Stays 0.0 while total is 0.
    pub accuracy: f64,
    pub difficulty_breakdown: BTreeMap<Difficulty, DifficultyStats>,
    pub needs_practice: bool,
}

/// Result of one windowed analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    pub all_topics: BTreeMap<String, TopicPerformance>,
    /// Subset of `all_topics` flagged as needing practice.
    pub weak_topics: BTreeMap<String, TopicPerformance>,
    pub analysis_period_days: i64,
}

impl TopicAnalysis {
    pub fn empty(days: i64) -> Self {
        Self {
            analysis_period_days: days,
            ..Default::default()
        }
    }
}

/// Concrete next-quiz suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedQuiz {
    pub main_topic: String,
    #[serde(default)]
    pub sub_topic: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub question_kind: QuestionKind,
    pub num_questions: u32,
    pub reason: String,
}

/// Personalized recommendation, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub has_recommendations: bool,
    pub weak_topics: Vec<String>,
    pub suggested_quiz: Option<SuggestedQuiz>,
    pub focus_areas: Vec<String>,
    pub motivation_message: String,
}

impl Recommendation {
    /// A recommendation carrying only a message.
    pub fn neutral(message: &str) -> Self {
        Self {
            has_recommendations: false,
            weak_topics: Vec::new(),
            suggested_quiz: None,
            focus_areas: Vec::new(),
            motivation_message: message.to_string(),
        }
    }
}

/// Topic flagged by the recency-based trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoSuggestion {
    pub topic_key: String,
    pub accuracy: f64,
    pub attempts: u32,
}

/// Learner's response to an auto-suggestion prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionDecision {
    /// Generate the suggested quiz now.
    Accept,
    /// Dismiss once; the trigger is evaluated again next time.
    Skip,
    /// Silence the trigger for the rest of the session.
    Disable,
}
