// src/models/question_log.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::{Difficulty, QuestionKind};

/// Raw row of the 'question_log' table.
///
/// Nullable text columns are normalized into a [`QuestionRecord`] by
/// `From<QuestionLogRow>`; consumers never see this type.
#[derive(Debug, FromRow)]
pub struct QuestionLogRow {
    pub id: i64,
    pub user_id: i64,
    pub session_id: i64,
    pub topic: String,
    pub sub_topic: Option<String>,
    pub difficulty: Option<String>,
    pub question_type: Option<String>,
    pub question_text: Option<String>,
    pub options: Option<String>,
    pub correct_answer: Option<String>,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub time_taken: Option<i64>,
    pub explanation: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One answered question. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub user_id: i64,
    pub session_id: i64,
    pub topic: String,
    /// Empty when the quiz had no sub-topic.
    pub sub_topic: String,
    pub difficulty: Difficulty,
    pub question_kind: QuestionKind,
    pub question_text: String,
    /// Empty for fill-in-the-blank questions.
    pub options: Vec<String>,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub time_taken: i64,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

impl QuestionRecord {
    /// Canonical grouping key: "topic" or "topic - sub_topic".
    pub fn topic_key(&self) -> String {
        topic_key(&self.topic, &self.sub_topic)
    }
}

/// Builds a topic-key from a topic and an optional sub-topic.
pub fn topic_key(topic: &str, sub_topic: &str) -> String {
    if sub_topic.is_empty() {
        topic.to_string()
    } else {
        format!("{} - {}", topic, sub_topic)
    }
}

/// Splits a topic-key back into (main topic, sub-topic) on the first " - ".
pub fn split_topic_key(key: &str) -> (String, String) {
    match key.split_once(" - ") {
        Some((main, sub)) => (main.to_string(), sub.to_string()),
        None => (key.to_string(), String::new()),
    }
}

impl From<QuestionLogRow> for QuestionRecord {
    fn from(row: QuestionLogRow) -> Self {
        let options = row
            .options
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_default();

        Self {
            id: row.id,
            user_id: row.user_id,
            session_id: row.session_id,
            topic: row.topic,
            sub_topic: row.sub_topic.unwrap_or_default(),
            difficulty: row
                .difficulty
                .as_deref()
                .and_then(|d| d.parse().ok())
                .unwrap_or(Difficulty::Medium),
            question_kind: row
                .question_type
                .as_deref()
                .and_then(|k| k.parse().ok())
                .unwrap_or_default(),
            question_text: row.question_text.unwrap_or_default(),
            options,
            correct_answer: row.correct_answer.unwrap_or_default(),
            user_answer: row.user_answer.unwrap_or_default(),
            is_correct: row.is_correct,
            time_taken: row.time_taken.unwrap_or(0).max(0),
            explanation: row.explanation.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// Insert payload for one graded question.
#[derive(Debug, Clone)]
pub struct NewQuestionRecord {
    pub user_id: i64,
    pub session_id: i64,
    pub topic: String,
    pub sub_topic: String,
    pub difficulty: Difficulty,
    pub question_kind: QuestionKind,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub time_taken: i64,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}
