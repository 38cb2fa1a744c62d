// src/history.rs

//! Read-only views over saved quiz sessions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
    models::{
        question::QuestionResult,
        session::{SessionRecord, SessionSummary},
    },
    quiz::grading,
};

/// A saved session laid out for review.
#[derive(Debug, Serialize)]
pub struct SessionReview {
    pub summary: SessionSummary,
    pub results: Vec<QuestionResult>,
    /// False when the record carried neither results nor questions.
    pub detailed: bool,
}

/// Builds the review for a session, re-grading legacy records that only kept
/// questions and answers.
pub fn review_session(record: &SessionRecord) -> SessionReview {
    let results = if !record.results.is_empty() {
        record.results.clone()
    } else if !record.questions.is_empty() {
        grading::grade_results(&record.questions, &record.user_answers, |_| 0)
    } else {
        Vec::new()
    };

    SessionReview {
        summary: SessionSummary::from(record),
        detailed: !results.is_empty(),
        results,
    }
}

/// Case-insensitive match on display title or short date.
pub fn search_sessions<'a>(sessions: &'a [SessionRecord], query: &str) -> Vec<&'a SessionRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return sessions.iter().collect();
    }

    sessions
        .iter()
        .filter(|s| {
            s.display_title().to_lowercase().contains(&needle)
                || s.created_at.format("%Y-%m-%d").to_string().contains(&needle)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_quizzes: usize,
    pub average_score: f64,
    pub best_score: f64,
    pub quizzes_this_week: usize,
}

pub fn dashboard_stats(sessions: &[SessionRecord], now: DateTime<Utc>) -> DashboardStats {
    if sessions.is_empty() {
        return DashboardStats {
            total_quizzes: 0,
            average_score: 0.0,
            best_score: 0.0,
            quizzes_this_week: 0,
        };
    }

    let total = sessions.len();
    let sum: f64 = sessions.iter().map(|s| s.score).sum();
    let best = sessions.iter().map(|s| s.score).fold(0.0_f64, f64::max);
    let week_ago = now - Duration::days(7);

    DashboardStats {
        total_quizzes: total,
        average_score: sum / total as f64,
        best_score: best,
        quizzes_this_week: sessions.iter().filter(|s| s.created_at >= week_ago).count(),
    }
}
