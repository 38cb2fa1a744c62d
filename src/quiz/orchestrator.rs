// src/quiz/orchestrator.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    analysis::{AutoSuggestionTrigger, RecommendationEngine, TopicAnalyzer, recommendation::LOCKED_MESSAGE},
    config::MAX_QUESTIONS_PER_QUIZ,
    context::SessionContext,
    error::AppError,
    generator::{QuestionGenerator, ensure_option_count},
    models::{
        analysis::{AutoSuggestion, Recommendation, SuggestedQuiz, TopicAnalysis},
        question::{
            Difficulty, GeneratedQuestion, PublicQuestion, QuestionKind, QuestionResult, QuizQuestion,
        },
        question_log::{NewQuestionRecord, topic_key},
        session::NewSessionRecord,
    },
    quiz::grading,
    store::{CredentialStore, QuestionLogStore, SessionStore},
};

/// Lifecycle of a single quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    Configured,
    Generating,
    Ready,
    InProgress,
    Submitted,
}

/// What the learner asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct QuizConfig {
    #[validate(length(min = 1, max = 200, message = "Topic must be between 1 and 200 characters"))]
    pub topic: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub sub_topic: String,
    #[serde(default)]
    pub question_kind: QuestionKind,
    pub difficulty: Difficulty,
    #[validate(range(min = 1, max = MAX_QUESTIONS_PER_QUIZ))]
    pub num_questions: u32,
}

impl QuizConfig {
    /// Topic string handed to the generator.
    pub fn full_topic(&self) -> String {
        topic_key(&self.topic, &self.sub_topic)
    }
}

impl From<SuggestedQuiz> for QuizConfig {
    fn from(suggested: SuggestedQuiz) -> Self {
        Self {
            topic: suggested.main_topic,
            sub_topic: suggested.sub_topic,
            question_kind: suggested.question_kind,
            difficulty: suggested.difficulty,
            num_questions: suggested.num_questions,
        }
    }
}

/// One quiz from generation through grading.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    pub config: QuizConfig,
    pub state: QuizState,
    pub questions: Vec<QuizQuestion>,
    answers: Vec<Option<String>>,
    presented_at: Vec<Option<DateTime<Utc>>>,
    results: Vec<QuestionResult>,
    session_id: Option<i64>,
}

/// Client-facing snapshot of an attempt. Answers and explanations are only
/// included once the attempt is submitted.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub state: QuizState,
    pub topic: String,
    pub sub_topic: String,
    pub difficulty: Difficulty,
    pub question_kind: QuestionKind,
    pub questions: Vec<PublicQuestion>,
    pub answers: Vec<Option<String>>,
    pub results: Option<Vec<QuestionResult>>,
}

impl QuizAttempt {
    pub fn new(config: QuizConfig) -> Self {
        Self {
            config,
            state: QuizState::Configured,
            questions: Vec::new(),
            answers: Vec::new(),
            presented_at: Vec::new(),
            results: Vec::new(),
            session_id: None,
        }
    }

    fn load(&mut self, questions: Vec<QuizQuestion>) {
        let n = questions.len();
        self.questions = questions;
        self.answers = vec![None; n];
        self.presented_at = vec![None; n];
        self.state = QuizState::Ready;
    }

    fn ensure_open(&self) -> Result<(), AppError> {
        match self.state {
            QuizState::Ready | QuizState::InProgress => Ok(()),
            QuizState::Submitted => Err(AppError::BadRequest("Quiz already submitted".to_string())),
            QuizState::Configured | QuizState::Generating => {
                Err(AppError::BadRequest("Quiz is not ready yet".to_string()))
            }
        }
    }

    /// Generated and not yet submitted.
    pub fn is_open(&self) -> bool {
        matches!(self.state, QuizState::Ready | QuizState::InProgress)
    }

    fn check_index(&self, index: usize) -> Result<(), AppError> {
        if index >= self.questions.len() {
            return Err(AppError::BadRequest(format!(
                "Question index {} out of range (quiz has {} questions)",
                index,
                self.questions.len()
            )));
        }
        Ok(())
    }

    /// Records when a question was first shown. Later calls keep the first time.
    pub fn present(&mut self, index: usize, now: DateTime<Utc>) -> Result<(), AppError> {
        self.ensure_open()?;
        self.check_index(index)?;
        self.presented_at[index].get_or_insert(now);
        Ok(())
    }

    pub fn present_all(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        for index in 0..self.questions.len() {
            self.present(index, now)?;
        }
        Ok(())
    }

    /// Stores or overwrites the answer for one question.
    pub fn answer(&mut self, index: usize, answer: String) -> Result<(), AppError> {
        self.ensure_open()?;
        self.check_index(index)?;
        self.answers[index] = Some(answer);
        self.state = QuizState::InProgress;
        Ok(())
    }

    /// Grades the attempt exactly once.
    pub fn grade(&mut self, now: DateTime<Utc>) -> Result<&[QuestionResult], AppError> {
        self.ensure_open()?;

        let answers = self.submitted_answers();
        let presented_at = &self.presented_at;
        self.results = grading::grade_results(&self.questions, &answers, |i| {
            presented_at
                .get(i)
                .copied()
                .flatten()
                .map(|start| (now - start).num_seconds())
                .unwrap_or(0)
        });
        self.state = QuizState::Submitted;

        Ok(&self.results)
    }

    /// Answers as submitted; unanswered questions are empty strings.
    pub fn submitted_answers(&self) -> Vec<String> {
        self.answers
            .iter()
            .map(|a| a.clone().unwrap_or_default())
            .collect()
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    pub fn public_questions(&self) -> Vec<PublicQuestion> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, q)| PublicQuestion {
                index,
                kind: q.kind,
                question: q.question.clone(),
                options: q.options.clone(),
            })
            .collect()
    }

    pub fn view(&self) -> QuizView {
        QuizView {
            state: self.state,
            topic: self.config.topic.clone(),
            sub_topic: self.config.sub_topic.clone(),
            difficulty: self.config.difficulty,
            question_kind: self.config.question_kind,
            questions: self.public_questions(),
            answers: self.answers.clone(),
            results: (self.state == QuizState::Submitted).then(|| self.results.clone()),
        }
    }
}

/// Result of submitting a quiz.
#[derive(Debug, Clone, Serialize)]
pub struct QuizOutcome {
    /// `None` when the session could not be saved.
    pub session_id: Option<i64>,
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: f64,
    pub results: Vec<QuestionResult>,
}

/// Drives generation, answering and grading, and fans results out to storage.
#[derive(Clone)]
pub struct QuizOrchestrator {
    sessions: SessionStore,
    users: CredentialStore,
    /// Question logging capability, resolved once at construction.
    logs: Option<QuestionLogStore>,
}

impl QuizOrchestrator {
    pub fn new(sessions: SessionStore, users: CredentialStore, logs: Option<QuestionLogStore>) -> Self {
        if logs.is_none() {
            tracing::warn!("Question logging unavailable; personalized insights are disabled");
        }
        Self { sessions, users, logs }
    }

    pub fn has_analytics(&self) -> bool {
        self.logs.is_some()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Generates a fresh quiz into the context.
    ///
    /// The first generator failure aborts the batch and leaves the context's
    /// previous quiz untouched.
    pub async fn generate(
        &self,
        ctx: &mut SessionContext,
        config: QuizConfig,
        generator: &dyn QuestionGenerator,
    ) -> Result<Vec<PublicQuestion>, AppError> {
        config.validate()?;

        let mut attempt = QuizAttempt::new(config);
        attempt.state = QuizState::Generating;

        let topic = attempt.config.full_topic();
        let kind = attempt.config.question_kind;
        let difficulty = attempt.config.difficulty;
        let total = attempt.config.num_questions as usize;

        tracing::info!(
            "Generating {} {} questions on '{}' at {}",
            total,
            kind,
            topic,
            difficulty
        );

        let mut questions = Vec::with_capacity(total);
        for i in 0..total {
            let generated = generator
                .generate(&topic, difficulty, kind)
                .await
                .map_err(|e| {
                    tracing::warn!("Generation of question {} of {} failed: {}", i + 1, total, e);
                    match e {
                        AppError::GenerationFailed(msg) => AppError::GenerationFailed(msg),
                        other => AppError::GenerationFailed(other.to_string()),
                    }
                })?;
            check_generated(kind, &generated)?;
            questions.push(QuizQuestion::from_generated(kind, generated));
        }

        attempt.load(questions);
        let public = attempt.public_questions();

        ctx.current_topic = attempt.config.topic.clone();
        ctx.current_sub_topic = attempt.config.sub_topic.clone();
        ctx.current_difficulty = Some(difficulty);
        ctx.active_quiz = Some(attempt);

        Ok(public)
    }

    fn active(ctx: &mut SessionContext) -> Result<&mut QuizAttempt, AppError> {
        ctx.active_quiz
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("No quiz in progress".to_string()))
    }

    pub fn present(&self, ctx: &mut SessionContext, index: usize, now: DateTime<Utc>) -> Result<(), AppError> {
        Self::active(ctx)?.present(index, now)
    }

    pub fn answer(&self, ctx: &mut SessionContext, index: usize, answer: String) -> Result<(), AppError> {
        Self::active(ctx)?.answer(index, answer)
    }

    /// Current quiz as the learner sees it; marks every question as presented.
    pub fn current(&self, ctx: &mut SessionContext, now: DateTime<Utc>) -> Result<QuizView, AppError> {
        let attempt = Self::active(ctx)?;
        if attempt.state != QuizState::Submitted {
            attempt.present_all(now)?;
        }
        Ok(attempt.view())
    }

    /// Grades the active quiz and persists it.
    ///
    /// Storage failures are logged and never fail the submission.
    pub async fn submit(
        &self,
        ctx: &mut SessionContext,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<QuizOutcome, AppError> {
        let attempt = Self::active(ctx)?;
        attempt.grade(now)?;
        let (correct_count, score) = grading::score(attempt.results());

        let session = NewSessionRecord {
            user_id,
            topic: attempt.config.topic.clone(),
            sub_topic: attempt.config.sub_topic.clone(),
            question_kind: attempt.config.question_kind,
            difficulty: attempt.config.difficulty,
            num_questions: attempt.questions.len() as i64,
            score,
            questions: attempt.questions.clone(),
            user_answers: attempt.submitted_answers(),
            results: attempt.results.clone(),
            created_at: now,
        };

        let session_id = match self.sessions.insert(&session).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Quiz graded but session was not saved: {}", e);
                None
            }
        };
        attempt.session_id = session_id;

        if let Some(session_id) = session_id {
            if let Some(logs) = &self.logs {
                log_questions(logs, user_id, session_id, attempt, now).await;
            }
            if let Err(e) = self.users.record_quiz(user_id, score).await {
                tracing::warn!("Failed to update quiz totals for user {}: {}", user_id, e);
            }
        }

        tracing::info!(
            "User {} scored {:.1}% ({}/{}) on '{}'",
            user_id,
            score,
            correct_count,
            attempt.results.len(),
            attempt.config.full_topic()
        );

        Ok(QuizOutcome {
            session_id,
            correct_count,
            total_questions: attempt.results.len(),
            score,
            results: attempt.results.clone(),
        })
    }

    /// Windowed weak-topic analysis, empty without question logging.
    pub async fn weak_topics(&self, user_id: i64, days: i64) -> TopicAnalysis {
        match &self.logs {
            Some(logs) => TopicAnalyzer::new(logs.clone()).analyze(user_id, days).await,
            None => TopicAnalysis::empty(days),
        }
    }

    pub async fn recommendations(&self, user_id: i64) -> Recommendation {
        match &self.logs {
            Some(logs) => {
                RecommendationEngine::new(TopicAnalyzer::new(logs.clone()))
                    .recommend(user_id)
                    .await
            }
            None => Recommendation::neutral(LOCKED_MESSAGE),
        }
    }

    /// Nothing is offered while a quiz is still open, so accepting cannot
    /// replace an attempt in progress.
    pub async fn auto_suggestion(&self, user_id: i64, ctx: &SessionContext) -> Option<AutoSuggestion> {
        if ctx.active_quiz.as_ref().is_some_and(QuizAttempt::is_open) {
            return None;
        }
        match &self.logs {
            Some(logs) => AutoSuggestionTrigger::new(logs.clone()).check(user_id, ctx).await,
            None => None,
        }
    }
}

/// Rejects generated questions the quiz cannot use.
fn check_generated(kind: QuestionKind, generated: &GeneratedQuestion) -> Result<(), AppError> {
    if generated.question.trim().is_empty() || generated.correct_answer.trim().is_empty() {
        return Err(AppError::GenerationFailed(
            "generated question is missing text or answer".to_string(),
        ));
    }
    if kind == QuestionKind::MultipleChoice {
        ensure_option_count(&generated.options)?;
    }
    Ok(())
}

async fn log_questions(
    logs: &QuestionLogStore,
    user_id: i64,
    session_id: i64,
    attempt: &QuizAttempt,
    now: DateTime<Utc>,
) {
    for (question, result) in attempt.questions.iter().zip(attempt.results()) {
        let record = NewQuestionRecord {
            user_id,
            session_id,
            topic: attempt.config.topic.clone(),
            sub_topic: attempt.config.sub_topic.clone(),
            difficulty: attempt.config.difficulty,
            question_kind: question.kind,
            question_text: question.question.clone(),
            options: question.options.clone(),
            correct_answer: question.correct_answer.clone(),
            user_answer: result.user_answer.clone(),
            is_correct: result.is_correct,
            time_taken: result.time_taken,
            explanation: question.explanation.clone(),
            created_at: now,
        };

        if let Err(e) = logs.insert(&record).await {
            tracing::warn!("Error logging question {}: {}", result.question_number, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config(kind: QuestionKind, n: u32) -> QuizConfig {
        QuizConfig {
            topic: "Geography".to_string(),
            sub_topic: "Europe".to_string(),
            question_kind: kind,
            difficulty: Difficulty::Easy,
            num_questions: n,
        }
    }

    fn ready_attempt() -> QuizAttempt {
        let mut attempt = QuizAttempt::new(config(QuestionKind::MultipleChoice, 2));
        attempt.load(vec![
            QuizQuestion {
                kind: QuestionKind::MultipleChoice,
                question: "Capital of France?".to_string(),
                options: vec!["Paris".into(), "Lyon".into(), "Nice".into(), "Lille".into()],
                correct_answer: "Paris".to_string(),
                explanation: String::new(),
            },
            QuizQuestion {
                kind: QuestionKind::FillBlank,
                question: "Capital of Italy is ___".to_string(),
                options: Vec::new(),
                correct_answer: "Rome".to_string(),
                explanation: String::new(),
            },
        ]);
        attempt
    }

    #[test]
    fn answering_overwrites_and_moves_to_in_progress() {
        let mut attempt = ready_attempt();
        assert_eq!(attempt.state, QuizState::Ready);

        attempt.answer(0, "Lyon".to_string()).unwrap();
        attempt.answer(0, "Paris".to_string()).unwrap();
        assert_eq!(attempt.state, QuizState::InProgress);
        assert_eq!(attempt.submitted_answers(), vec!["Paris".to_string(), String::new()]);
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let mut attempt = ready_attempt();
        assert!(matches!(attempt.answer(5, "x".to_string()), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn grading_happens_once_and_freezes_results() {
        let mut attempt = ready_attempt();
        let start = Utc::now();
        attempt.present(0, start).unwrap();
        attempt.present(0, start + Duration::seconds(30)).unwrap();
        attempt.answer(0, "Paris".to_string()).unwrap();
        attempt.answer(1, " rome ".to_string()).unwrap();

        let results = attempt.grade(start + Duration::seconds(42)).unwrap().to_vec();
        assert!(results.iter().all(|r| r.is_correct));
        assert_eq!(results[0].time_taken, 42);
        // never presented
        assert_eq!(results[1].time_taken, 0);

        assert!(attempt.grade(Utc::now()).is_err());
        assert!(attempt.answer(0, "Lyon".to_string()).is_err());
        assert_eq!(attempt.results(), results.as_slice());
    }

    #[test]
    fn attempt_is_open_until_graded() {
        let mut attempt = QuizAttempt::new(config(QuestionKind::MultipleChoice, 2));
        assert!(!attempt.is_open());
        attempt = ready_attempt();
        assert!(attempt.is_open());
        attempt.answer(0, "Paris".to_string()).unwrap();
        assert!(attempt.is_open());
        attempt.grade(Utc::now()).unwrap();
        assert!(!attempt.is_open());
    }

    #[test]
    fn view_hides_results_until_submitted() {
        let mut attempt = ready_attempt();
        assert!(attempt.view().results.is_none());
        attempt.grade(Utc::now()).unwrap();
        assert_eq!(attempt.view().results.unwrap().len(), 2);
    }

    #[test]
    fn config_limits_question_count() {
        assert!(config(QuestionKind::MultipleChoice, 0).validate().is_err());
        assert!(config(QuestionKind::MultipleChoice, 21).validate().is_err());
        assert!(config(QuestionKind::MultipleChoice, 5).validate().is_ok());
        assert_eq!(config(QuestionKind::MultipleChoice, 5).full_topic(), "Geography - Europe");
    }

    #[test]
    fn mcq_needs_four_options() {
        let generated = GeneratedQuestion {
            question: "q".to_string(),
            correct_answer: "a".to_string(),
            explanation: String::new(),
            options: vec!["a".to_string(), "b".to_string()],
        };
        assert!(check_generated(QuestionKind::MultipleChoice, &generated).is_err());
        assert!(check_generated(QuestionKind::FillBlank, &generated).is_ok());
    }
}
