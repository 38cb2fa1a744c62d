// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{
    question::{Difficulty, QuestionKind, QuestionResult, QuizQuestion},
    question_log::topic_key,
};

/// Raw row of the 'quiz_sessions' table.
#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub user_id: i64,
    pub topic: Option<String>,
    pub sub_topic: Option<String>,
    pub question_type: Option<String>,
    pub difficulty: Option<String>,
    pub num_questions: Option<i64>,
    pub score: Option<f64>,
    pub questions_data: Option<String>,
    pub user_answers: Option<String>,
    pub results_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One completed quiz attempt, with the snapshots needed for read-only review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub user_id: i64,
    pub topic: String,
    pub sub_topic: String,
    pub question_kind: QuestionKind,
    pub difficulty: Difficulty,
    pub num_questions: i64,
    /// Percentage, 0-100.
    pub score: f64,
    pub questions: Vec<QuizQuestion>,
    pub user_answers: Vec<String>,
    /// Empty for legacy sessions saved before results were stored.
    pub results: Vec<QuestionResult>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn display_title(&self) -> String {
        topic_key(&self.topic, &self.sub_topic)
    }
}

fn parse_snapshot<T: serde::de::DeserializeOwned>(raw: Option<&str>) -> Vec<T> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => match serde_json::from_str(raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Discarding malformed session snapshot: {}", e);
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        let topic = row
            .topic
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "General".to_string());

        Self {
            id: row.id,
            user_id: row.user_id,
            topic,
            sub_topic: row.sub_topic.unwrap_or_default(),
            question_kind: row
                .question_type
                .as_deref()
                .and_then(|k| k.parse().ok())
                .unwrap_or_default(),
            difficulty: row
                .difficulty
                .as_deref()
                .and_then(|d| d.parse().ok())
                .unwrap_or(Difficulty::Medium),
            num_questions: row.num_questions.filter(|n| *n >= 1).unwrap_or(1),
            score: row.score.unwrap_or(0.0).clamp(0.0, 100.0),
            questions: parse_snapshot(row.questions_data.as_deref()),
            user_answers: parse_snapshot(row.user_answers.as_deref()),
            results: parse_snapshot(row.results_data.as_deref()),
            created_at: row.created_at,
        }
    }
}

/// Insert payload for a completed quiz.
#[derive(Debug, Clone)]
pub struct NewSessionRecord {
    pub user_id: i64,
    pub topic: String,
    pub sub_topic: String,
    pub question_kind: QuestionKind,
    pub difficulty: Difficulty,
    pub num_questions: i64,
    pub score: f64,
    pub questions: Vec<QuizQuestion>,
    pub user_answers: Vec<String>,
    pub results: Vec<QuestionResult>,
    pub created_at: DateTime<Utc>,
}

/// Coarse score indicator shown next to each history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Strong
        } else if score >= 60.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }
}

/// History list entry (no snapshots).
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub display_title: String,
    pub topic: String,
    pub sub_topic: String,
    pub question_type: QuestionKind,
    pub difficulty: Difficulty,
    pub num_questions: i64,
    pub score: f64,
    pub band: ScoreBand,
    pub created_at: DateTime<Utc>,
    /// YYYY-MM-DD
    pub short_date: String,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id,
            display_title: record.display_title(),
            topic: record.topic.clone(),
            sub_topic: record.sub_topic.clone(),
            question_type: record.question_kind,
            difficulty: record.difficulty,
            num_questions: record.num_questions,
            score: record.score,
            band: ScoreBand::from_score(record.score),
            created_at: record.created_at,
            short_date: record.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Query parameters for listing history.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Number of sessions to return (default: 15, max: 100).
    pub limit: Option<i64>,
    /// Case-insensitive match against title or date.
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_row() -> SessionRow {
        SessionRow {
            id: 7,
            user_id: 1,
            topic: Some("  ".to_string()),
            sub_topic: None,
            question_type: None,
            difficulty: None,
            num_questions: Some(0),
            score: None,
            questions_data: None,
            user_answers: Some("[\"a\"".to_string()),
            results_data: Some(String::new()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn legacy_rows_get_boundary_defaults() {
        let record = SessionRecord::from(legacy_row());
        assert_eq!(record.topic, "General");
        assert_eq!(record.question_kind, QuestionKind::MultipleChoice);
        assert_eq!(record.difficulty, Difficulty::Medium);
        assert_eq!(record.num_questions, 1);
        assert_eq!(record.score, 0.0);
        assert!(record.questions.is_empty());
        assert!(record.user_answers.is_empty());
        assert!(record.results.is_empty());
    }

    #[test]
    fn score_bands() {
        assert_eq!(ScoreBand::from_score(80.0), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_score(60.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(59.9), ScoreBand::Weak);
    }
}
