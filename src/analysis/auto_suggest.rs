// src/analysis/auto_suggest.rs

use crate::{
    analysis::accuracy,
    context::SessionContext,
    models::{
        analysis::{AutoSuggestion, SuggestedQuiz, SuggestionDecision},
        question::{Difficulty, QuestionKind},
        question_log::{QuestionRecord, split_topic_key},
    },
    store::QuestionLogStore,
};

/// How many of the latest answered questions are inspected.
pub const RECENT_WINDOW: i64 = 10;
/// Below this many recent questions there is not enough data to decide.
pub const MIN_RECENT_QUESTIONS: usize = 5;
/// Minimum attempts on one topic-key before it can trigger.
pub const MIN_TOPIC_ATTEMPTS: u32 = 3;
/// Accuracy (percent) below which a topic triggers.
pub const TRIGGER_ACCURACY_THRESHOLD: f64 = 50.0;

/// Questions in a quiz started from an accepted suggestion.
const ACCEPTED_QUIZ_QUESTIONS: u32 = 5;

/// Recency-based "you seem to be struggling" prompt.
///
/// Reads the raw log directly instead of the windowed analysis.
#[derive(Clone)]
pub struct AutoSuggestionTrigger {
    logs: QuestionLogStore,
}

impl AutoSuggestionTrigger {
    pub fn new(logs: QuestionLogStore) -> Self {
        Self { logs }
    }

    /// Returns the topic to interrupt the learner about, if any.
    pub async fn check(&self, user_id: i64, ctx: &SessionContext) -> Option<AutoSuggestion> {
        if ctx.auto_suggestions_disabled {
            return None;
        }

        match self.logs.recent(user_id, RECENT_WINDOW).await {
            Ok(recent) => detect_struggling_topic(&recent),
            Err(e) => {
                tracing::warn!("Auto suggestion check failed for user {}: {}", user_id, e);
                None
            }
        }
    }

    /// Applies the learner's decision.
    ///
    /// `Accept` yields the quiz to generate; `Disable` silences the trigger
    /// on this context only.
    pub fn resolve(
        decision: SuggestionDecision,
        suggestion: &AutoSuggestion,
        ctx: &mut SessionContext,
    ) -> Option<SuggestedQuiz> {
        match decision {
            SuggestionDecision::Accept => Some(accepted_quiz(suggestion)),
            SuggestionDecision::Skip => None,
            SuggestionDecision::Disable => {
                ctx.auto_suggestions_disabled = true;
                None
            }
        }
    }
}

/// First topic-key, in order of appearance, with enough attempts and low accuracy.
///
/// `recent` is expected newest first, as returned by the store.
pub fn detect_struggling_topic(recent: &[QuestionRecord]) -> Option<AutoSuggestion> {
    if recent.len() < MIN_RECENT_QUESTIONS {
        return None;
    }

    // (topic-key, correct, total) in first-seen order
    let mut groups: Vec<(String, u32, u32)> = Vec::new();
    for record in recent {
        let key = record.topic_key();
        let idx = match groups.iter().position(|(k, _, _)| *k == key) {
            Some(idx) => idx,
            None => {
                groups.push((key, 0, 0));
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.2 += 1;
        if record.is_correct {
            group.1 += 1;
        }
    }

    groups.into_iter().find_map(|(topic_key, correct, total)| {
        if total < MIN_TOPIC_ATTEMPTS {
            return None;
        }
        let accuracy = accuracy(correct, total)?;
        (accuracy < TRIGGER_ACCURACY_THRESHOLD).then_some(AutoSuggestion {
            topic_key,
            accuracy,
            attempts: total,
        })
    })
}

fn accepted_quiz(suggestion: &AutoSuggestion) -> SuggestedQuiz {
    let (main_topic, sub_topic) = split_topic_key(&suggestion.topic_key);

    SuggestedQuiz {
        main_topic,
        sub_topic,
        difficulty: Difficulty::Easy,
        question_kind: QuestionKind::MultipleChoice,
        num_questions: ACCEPTED_QUIZ_QUESTIONS,
        reason: format!("Auto-suggested due to {:.0}% accuracy", suggestion.accuracy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::tests::record;

    fn suggestion() -> AutoSuggestion {
        AutoSuggestion {
            topic_key: "DSA - Graphs".to_string(),
            accuracy: 25.0,
            attempts: 4,
        }
    }

    #[test]
    fn fires_for_dsa_all_wrong() {
        let mut recent = Vec::new();
        for _ in 0..4 {
            recent.push(record("DSA", "", Difficulty::Medium, false));
        }
        for _ in 0..6 {
            recent.push(record("OS", "", Difficulty::Medium, true));
        }

        let hit = detect_struggling_topic(&recent).unwrap();
        assert_eq!(hit.topic_key, "DSA");
        assert_eq!(hit.accuracy, 0.0);
        assert_eq!(hit.attempts, 4);
    }

    #[test]
    fn needs_five_recent_questions() {
        let recent: Vec<_> = (0..4)
            .map(|_| record("DSA", "", Difficulty::Easy, false))
            .collect();
        assert!(detect_struggling_topic(&recent).is_none());
    }

    #[test]
    fn needs_three_attempts_on_the_topic() {
        let recent = vec![
            record("DSA", "", Difficulty::Easy, false),
            record("DSA", "", Difficulty::Easy, false),
            record("OS", "", Difficulty::Easy, true),
            record("OS", "", Difficulty::Easy, true),
            record("OS", "", Difficulty::Easy, true),
        ];
        assert!(detect_struggling_topic(&recent).is_none());
    }

    #[test]
    fn fifty_percent_does_not_fire() {
        let recent = vec![
            record("DSA", "", Difficulty::Easy, false),
            record("DSA", "", Difficulty::Easy, true),
            record("DSA", "", Difficulty::Easy, false),
            record("DSA", "", Difficulty::Easy, true),
            record("OS", "", Difficulty::Easy, true),
        ];
        assert!(detect_struggling_topic(&recent).is_none());
    }

    #[test]
    fn first_seen_topic_wins_over_weakest() {
        let recent = vec![
            record("Networks", "", Difficulty::Easy, true),
            record("Networks", "", Difficulty::Easy, false),
            record("Networks", "", Difficulty::Easy, false),
            record("DSA", "", Difficulty::Easy, false),
            record("DSA", "", Difficulty::Easy, false),
            record("DSA", "", Difficulty::Easy, false),
        ];
        let hit = detect_struggling_topic(&recent).unwrap();
        assert_eq!(hit.topic_key, "Networks");
        assert_eq!(hit.attempts, 3);
    }

    #[test]
    fn sixty_percent_stays_quiet() {
        // 60% counts as weak for the windowed analysis, not for the trigger.
        let recent = vec![
            record("OS", "", Difficulty::Easy, false),
            record("OS", "", Difficulty::Easy, false),
            record("OS", "", Difficulty::Easy, true),
            record("OS", "", Difficulty::Easy, true),
            record("OS", "", Difficulty::Easy, true),
        ];
        assert!(detect_struggling_topic(&recent).is_none());
    }

    #[test]
    fn accept_builds_easy_five_question_quiz() {
        let mut ctx = SessionContext::default();
        let quiz = AutoSuggestionTrigger::resolve(SuggestionDecision::Accept, &suggestion(), &mut ctx)
            .unwrap();
        assert_eq!(quiz.main_topic, "DSA");
        assert_eq!(quiz.sub_topic, "Graphs");
        assert_eq!(quiz.difficulty, Difficulty::Easy);
        assert_eq!(quiz.question_kind, QuestionKind::MultipleChoice);
        assert_eq!(quiz.num_questions, 5);
        assert_eq!(quiz.reason, "Auto-suggested due to 25% accuracy");
        assert!(!ctx.auto_suggestions_disabled);
    }

    #[test]
    fn skip_leaves_context_alone_and_disable_sets_flag() {
        let mut ctx = SessionContext::default();
        assert!(AutoSuggestionTrigger::resolve(SuggestionDecision::Skip, &suggestion(), &mut ctx).is_none());
        assert!(!ctx.auto_suggestions_disabled);

        assert!(AutoSuggestionTrigger::resolve(SuggestionDecision::Disable, &suggestion(), &mut ctx).is_none());
        assert!(ctx.auto_suggestions_disabled);
    }
}
