// src/analysis/recommendation.rs

use crate::{
    analysis::TopicAnalyzer,
    config::RECOMMENDATION_WINDOW_DAYS,
    error::AppError,
    models::{
        analysis::{Recommendation, SuggestedQuiz, TopicAnalysis, TopicPerformance},
        question::{Difficulty, QuestionKind},
        question_log::split_topic_key,
    },
};

/// Per-difficulty correctness below which that difficulty is recommended.
const STRUGGLING_RATIO: f64 = 0.5;
const MIN_SUGGESTED_QUESTIONS: u32 = 3;
const MAX_SUGGESTED_QUESTIONS: u32 = 5;
const MAX_FOCUS_AREAS: usize = 3;

pub const DOING_WELL_MESSAGE: &str =
    "Great job! You're performing well across all topics. Try exploring new areas or increasing difficulty!";
pub const UNAVAILABLE_MESSAGE: &str = "Recommendations are temporarily unavailable.";
pub const LOCKED_MESSAGE: &str = "Keep practicing to unlock personalized recommendations!";

/// Picks the weakest topic from a windowed analysis and turns it into a quiz suggestion.
#[derive(Clone)]
pub struct RecommendationEngine {
    analyzer: TopicAnalyzer,
}

impl RecommendationEngine {
    pub fn new(analyzer: TopicAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Never fails: errors degrade to a neutral "unavailable" recommendation.
    pub async fn recommend(&self, user_id: i64) -> Recommendation {
        match self.try_recommend(user_id).await {
            Ok(recommendation) => recommendation,
            Err(e) => {
                tracing::warn!("Recommendations failed for user {}: {}", user_id, e);
                Recommendation::neutral(UNAVAILABLE_MESSAGE)
            }
        }
    }

    async fn try_recommend(&self, user_id: i64) -> Result<Recommendation, AppError> {
        let analysis = self
            .analyzer
            .try_analyze(user_id, RECOMMENDATION_WINDOW_DAYS)
            .await?;

        Ok(recommend_from(&analysis))
    }
}

/// Builds a recommendation from an analysis.
pub fn recommend_from(analysis: &TopicAnalysis) -> Recommendation {
    let Some((key, weakest)) = weakest_topic(analysis) else {
        return Recommendation::neutral(DOING_WELL_MESSAGE);
    };

    let (main_topic, sub_topic) = split_topic_key(key);

    let suggested = SuggestedQuiz {
        main_topic,
        sub_topic,
        difficulty: recommended_difficulty(weakest),
        question_kind: QuestionKind::MultipleChoice,
        num_questions: suggested_question_count(weakest.wrong_answers),
        reason: format!("You have {:.0}% accuracy in this topic", weakest.accuracy),
    };

    let focus_areas = analysis
        .weak_topics
        .iter()
        .take(MAX_FOCUS_AREAS)
        .map(|(topic, data)| format!("{}: {:.0}% accuracy", topic, data.accuracy))
        .collect();

    Recommendation {
        has_recommendations: true,
        weak_topics: analysis.weak_topics.keys().cloned().collect(),
        suggested_quiz: Some(suggested),
        focus_areas,
        motivation_message: motivation_message(weakest.accuracy).to_string(),
    }
}

/// Weak topic with the lowest accuracy.
///
/// `weak_topics` iterates in lexical key order and only a strictly lower
/// accuracy replaces the current pick, so ties go to the smallest key.
fn weakest_topic(analysis: &TopicAnalysis) -> Option<(&String, &TopicPerformance)> {
    analysis
        .weak_topics
        .iter()
        .fold(None, |best, (key, data)| match best {
            Some((_, current)) if data.accuracy >= current.accuracy => best,
            _ => Some((key, data)),
        })
}

/// First difficulty, in Easy -> Medium -> Hard order, with under 50% correct.
/// Falls back to Easy.
pub fn recommended_difficulty(topic: &TopicPerformance) -> Difficulty {
    Difficulty::ALL
        .into_iter()
        .find(|difficulty| {
            topic
                .difficulty_breakdown
                .get(difficulty)
                .and_then(|stats| stats.ratio())
                .is_some_and(|ratio| ratio < STRUGGLING_RATIO)
        })
        .unwrap_or(Difficulty::Easy)
}

pub fn suggested_question_count(wrong_answers: u32) -> u32 {
    wrong_answers.clamp(MIN_SUGGESTED_QUESTIONS, MAX_SUGGESTED_QUESTIONS)
}

pub fn motivation_message(accuracy: f64) -> &'static str {
    if accuracy < 40.0 {
        "Focus time! Let's strengthen your foundation with some targeted practice."
    } else if accuracy < 60.0 {
        "You're improving! A few more practice sessions will boost your confidence."
    } else if accuracy < 80.0 {
        "Almost there! Fine-tune your knowledge with focused practice."
    } else {
        "Excellent progress! Ready to tackle more challenging questions?"
    }
}
