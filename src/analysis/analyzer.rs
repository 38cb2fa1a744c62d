// src/analysis/analyzer.rs

use chrono::{Duration, Utc};

use crate::{
    analysis::accuracy,
    error::AppError,
    models::{
        analysis::{TopicAnalysis, TopicPerformance},
        question_log::QuestionRecord,
    },
    store::QuestionLogStore,
};

/// A topic is weak below this accuracy (percent)...
pub const WEAK_ACCURACY_THRESHOLD: f64 = 70.0;
/// ...once it has at least this many questions in the window.
pub const WEAK_MIN_QUESTIONS: u32 = 2;

/// Windowed per-topic accuracy over the question log.
#[derive(Clone)]
pub struct TopicAnalyzer {
    logs: QuestionLogStore,
}

impl TopicAnalyzer {
    pub fn new(logs: QuestionLogStore) -> Self {
        Self { logs }
    }

    /// Analyzes the trailing `days` for a user.
    ///
    /// Advisory only: storage failures produce an empty analysis.
    pub async fn analyze(&self, user_id: i64, days: i64) -> TopicAnalysis {
        match self.try_analyze(user_id, days).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Weak topic analysis failed for user {}: {}", user_id, e);
                TopicAnalysis::empty(days)
            }
        }
    }

    pub async fn try_analyze(&self, user_id: i64, days: i64) -> Result<TopicAnalysis, AppError> {
        let since = Utc::now() - Duration::days(days.max(0));
        let records = self.logs.since(user_id, since).await?;

        tracing::debug!(
            "Analyzing {} logged questions for user {} over {} days",
            records.len(),
            user_id,
            days
        );

        Ok(summarize_topics(&records, days))
    }
}

/// Groups records by topic-key and derives accuracy and weakness.
pub fn summarize_topics(records: &[QuestionRecord], days: i64) -> TopicAnalysis {
    let mut analysis = TopicAnalysis::empty(days);

    for record in records {
        let topic = analysis.all_topics.entry(record.topic_key()).or_default();

        topic.total_questions += 1;
        if record.is_correct {
            topic.correct_answers += 1;
        } else {
            topic.wrong_answers += 1;
        }

        let bucket = topic
            .difficulty_breakdown
            .entry(record.difficulty)
            .or_default();
        bucket.total += 1;
        if record.is_correct {
            bucket.correct += 1;
        }
    }

    for (key, topic) in analysis.all_topics.iter_mut() {
        let Some(acc) = accuracy(topic.correct_answers, topic.total_questions) else {
            continue;
        };
        topic.accuracy = acc;

        if is_weak(topic) {
            topic.needs_practice = true;
            analysis.weak_topics.insert(key.clone(), topic.clone());
        }
    }

    analysis
}

fn is_weak(topic: &TopicPerformance) -> bool {
    topic.accuracy < WEAK_ACCURACY_THRESHOLD && topic.total_questions >= WEAK_MIN_QUESTIONS
}
