// tests/insights_tests.rs

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use smartprep::{
    analysis::{
        AutoSuggestionTrigger, RecommendationEngine, TopicAnalyzer,
        recommendation::{LOCKED_MESSAGE, UNAVAILABLE_MESSAGE},
    },
    context::SessionContext,
    error::AppError,
    generator::QuestionGenerator,
    models::{
        analysis::SuggestionDecision,
        question::{Difficulty, GeneratedQuestion, QuestionKind},
        question_log::NewQuestionRecord,
        session::NewSessionRecord,
        user::CreateUserRequest,
    },
    quiz::{QuizConfig, QuizOrchestrator},
    store::{CredentialStore, QuestionLogStore, SessionStore},
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

/// Fill-blank questions whose answer is always "A".
struct FixedAnswers;

#[async_trait]
impl QuestionGenerator for FixedAnswers {
    async fn generate(
        &self,
        topic: &str,
        _difficulty: Difficulty,
        _kind: QuestionKind,
    ) -> Result<GeneratedQuestion, AppError> {
        Ok(GeneratedQuestion {
            question: format!("___ is the first letter of {}", topic),
            correct_answer: "A".to_string(),
            explanation: String::new(),
            options: Vec::new(),
        })
    }
}

async fn register(pool: &SqlitePool, name: &str) -> i64 {
    CredentialStore::new(pool.clone())
        .register(&CreateUserRequest {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "password123".to_string(),
        })
        .await
        .expect("register")
        .id
}

/// Generates three fill-blank questions and answers only the first correctly.
async fn one_of_three(orchestrator: &QuizOrchestrator, ctx: &mut SessionContext) {
    let config = QuizConfig {
        topic: "Algebra".to_string(),
        sub_topic: String::new(),
        question_kind: QuestionKind::FillBlank,
        difficulty: Difficulty::Medium,
        num_questions: 3,
    };
    orchestrator.generate(ctx, config, &FixedAnswers).await.expect("generate");
    orchestrator.answer(ctx, 0, " a ".to_string()).expect("answer");
    orchestrator.answer(ctx, 1, "B".to_string()).expect("answer");
}

async fn logged_questions(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM question_log")
        .fetch_one(pool)
        .await
        .expect("count question_log")
}

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

/// A user with one saved session to hang question records on.
struct Learner {
    user_id: i64,
    session_id: i64,
    logs: QuestionLogStore,
}

impl Learner {
    async fn new(pool: &SqlitePool, name: &str) -> Self {
        let user = CredentialStore::new(pool.clone())
            .register(&CreateUserRequest {
                username: name.to_string(),
                email: format!("{}@example.com", name),
                password: "password123".to_string(),
            })
            .await
            .expect("register");

        let session_id = SessionStore::new(pool.clone())
            .insert(&NewSessionRecord {
                user_id: user.id,
                topic: "Mixed".to_string(),
                sub_topic: String::new(),
                question_kind: QuestionKind::MultipleChoice,
                difficulty: Difficulty::Medium,
                num_questions: 1,
                score: 0.0,
                questions: Vec::new(),
                user_answers: Vec::new(),
                results: Vec::new(),
                created_at: Utc::now(),
            })
            .await
            .expect("session");

        let logs = QuestionLogStore::connect(pool.clone()).await.expect("log store");

        Self {
            user_id: user.id,
            session_id,
            logs,
        }
    }

    async fn log(
        &self,
        topic: &str,
        sub_topic: &str,
        difficulty: Difficulty,
        is_correct: bool,
        created_at: DateTime<Utc>,
    ) {
        self.logs
            .insert(&NewQuestionRecord {
                user_id: self.user_id,
                session_id: self.session_id,
                topic: topic.to_string(),
                sub_topic: sub_topic.to_string(),
                difficulty,
                question_kind: QuestionKind::MultipleChoice,
                question_text: format!("{} question", topic),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: "A".to_string(),
                user_answer: if is_correct { "A" } else { "B" }.to_string(),
                is_correct,
                time_taken: 12,
                explanation: String::new(),
                created_at,
            })
            .await
            .expect("log question");
    }
}

#[tokio::test]
async fn networks_weak_operating_systems_fine() {
    let pool = test_pool().await;
    let learner = Learner::new(&pool, "networks_learner").await;
    let now = Utc::now();

    for correct in [true, false, false] {
        learner.log("Networks", "TCP", Difficulty::Medium, correct, now).await;
    }
    for correct in [true, true, true, false] {
        learner.log("Operating Systems", "", Difficulty::Hard, correct, now).await;
    }

    let analyzer = TopicAnalyzer::new(learner.logs.clone());
    let analysis = analyzer.analyze(learner.user_id, 7).await;

    assert_eq!(analysis.all_topics.len(), 2);
    assert_eq!(analysis.weak_topics.len(), 1);
    let networks = &analysis.weak_topics["Networks - TCP"];
    assert_eq!(networks.total_questions, 3);
    assert_eq!(networks.wrong_answers, 2);
    assert!((networks.accuracy - 100.0 / 3.0).abs() < 1e-9);
    assert!(!analysis.all_topics["Operating Systems"].needs_practice);

    let recommendation = RecommendationEngine::new(analyzer).recommend(learner.user_id).await;
    assert!(recommendation.has_recommendations);
    assert_eq!(recommendation.weak_topics, vec!["Networks - TCP".to_string()]);
    let quiz = recommendation.suggested_quiz.expect("suggested quiz");
    assert_eq!(quiz.main_topic, "Networks");
    assert_eq!(quiz.sub_topic, "TCP");
    assert_eq!(quiz.difficulty, Difficulty::Medium);
    assert_eq!(quiz.num_questions, 3);
    assert_eq!(quiz.reason, "You have 33% accuracy in this topic");
}

#[tokio::test]
async fn old_records_fall_outside_the_window() {
    let pool = test_pool().await;
    let learner = Learner::new(&pool, "window_learner").await;
    let now = Utc::now();

    for _ in 0..3 {
        learner
            .log("Databases", "", Difficulty::Easy, false, now - Duration::days(20))
            .await;
    }
    learner.log("Databases", "", Difficulty::Easy, true, now).await;

    let analyzer = TopicAnalyzer::new(learner.logs.clone());

    let week = analyzer.analyze(learner.user_id, 7).await;
    assert_eq!(week.all_topics["Databases"].total_questions, 1);
    assert!(week.weak_topics.is_empty());

    let month = analyzer.analyze(learner.user_id, 30).await;
    assert_eq!(month.all_topics["Databases"].total_questions, 4);
    assert!(month.weak_topics.contains_key("Databases"));

    let recommendation = RecommendationEngine::new(analyzer).recommend(learner.user_id).await;
    assert!(!recommendation.has_recommendations);
}

#[tokio::test]
async fn struggling_dsa_triggers_suggestion() {
    let pool = test_pool().await;
    let learner = Learner::new(&pool, "dsa_learner").await;
    let now = Utc::now();

    learner.log("Networks", "", Difficulty::Easy, true, now - Duration::minutes(10)).await;
    for i in 0..4 {
        learner
            .log("DSA", "Graphs", Difficulty::Medium, false, now - Duration::minutes(4 - i))
            .await;
    }

    let trigger = AutoSuggestionTrigger::new(learner.logs.clone());
    let mut ctx = SessionContext::default();

    let suggestion = trigger.check(learner.user_id, &ctx).await.expect("should fire");
    assert_eq!(suggestion.topic_key, "DSA - Graphs");
    assert_eq!(suggestion.attempts, 4);
    assert_eq!(suggestion.accuracy, 0.0);

    let quiz = AutoSuggestionTrigger::resolve(SuggestionDecision::Accept, &suggestion, &mut ctx)
        .expect("accepted quiz");
    assert_eq!(quiz.main_topic, "DSA");
    assert_eq!(quiz.sub_topic, "Graphs");
    assert_eq!(quiz.difficulty, Difficulty::Easy);
    assert_eq!(quiz.num_questions, 5);
    assert_eq!(quiz.reason, "Auto-suggested due to 0% accuracy");

    assert!(AutoSuggestionTrigger::resolve(SuggestionDecision::Disable, &suggestion, &mut ctx).is_none());
    assert!(trigger.check(learner.user_id, &ctx).await.is_none());
}

#[tokio::test]
async fn too_little_history_stays_quiet() {
    let pool = test_pool().await;
    let learner = Learner::new(&pool, "new_learner").await;

    for _ in 0..4 {
        learner.log("DSA", "", Difficulty::Easy, false, Utc::now()).await;
    }

    let trigger = AutoSuggestionTrigger::new(learner.logs.clone());
    assert!(trigger.check(learner.user_id, &SessionContext::default()).await.is_none());
}

#[tokio::test]
async fn storage_failure_degrades_to_neutral() {
    let pool = test_pool().await;
    let learner = Learner::new(&pool, "offline_learner").await;
    learner.log("DSA", "", Difficulty::Easy, false, Utc::now()).await;

    pool.close().await;

    let analyzer = TopicAnalyzer::new(learner.logs.clone());
    let analysis = analyzer.analyze(learner.user_id, 7).await;
    assert!(analysis.all_topics.is_empty());
    assert_eq!(analysis.analysis_period_days, 7);

    let recommendation = RecommendationEngine::new(analyzer).recommend(learner.user_id).await;
    assert!(!recommendation.has_recommendations);
    assert_eq!(recommendation.motivation_message, UNAVAILABLE_MESSAGE);

    let trigger = AutoSuggestionTrigger::new(learner.logs.clone());
    assert!(trigger.check(learner.user_id, &SessionContext::default()).await.is_none());

    assert!(QuestionLogStore::connect(pool).await.is_err());
}

#[tokio::test]
async fn quiz_without_question_logging_still_saves_session() {
    let pool = test_pool().await;
    let user_id = register(&pool, "unlogged_learner").await;
    let credentials = CredentialStore::new(pool.clone());
    let orchestrator = QuizOrchestrator::new(SessionStore::new(pool.clone()), credentials.clone(), None);
    assert!(!orchestrator.has_analytics());

    let mut ctx = SessionContext::default();
    one_of_three(&orchestrator, &mut ctx).await;
    let outcome = orchestrator.submit(&mut ctx, user_id, Utc::now()).await.expect("submit");

    let session_id = outcome.session_id.expect("session saved");
    assert_eq!(outcome.correct_count, 1);
    assert_eq!(outcome.total_questions, 3);
    assert!((outcome.score - 100.0 / 3.0).abs() < 1e-9);

    let saved = orchestrator
        .sessions()
        .list_for_user(user_id, 10)
        .await
        .expect("history");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, session_id);

    assert_eq!(logged_questions(&pool).await, 0);
    assert_eq!(credentials.get(user_id).await.unwrap().unwrap().total_quizzes, 1);

    let recommendation = orchestrator.recommendations(user_id).await;
    assert!(!recommendation.has_recommendations);
    assert_eq!(recommendation.motivation_message, LOCKED_MESSAGE);
    assert!(orchestrator.weak_topics(user_id, 7).await.all_topics.is_empty());
    assert!(orchestrator.auto_suggestion(user_id, &ctx).await.is_none());
}

#[tokio::test]
async fn unsaved_session_still_returns_grades() {
    let pool = test_pool().await;
    let user_id = register(&pool, "unsaved_learner").await;
    let credentials = CredentialStore::new(pool.clone());
    let logs = QuestionLogStore::connect(pool.clone()).await.expect("log store");
    let orchestrator =
        QuizOrchestrator::new(SessionStore::new(pool.clone()), credentials.clone(), Some(logs));

    let mut ctx = SessionContext::default();
    one_of_three(&orchestrator, &mut ctx).await;

    sqlx::query("DROP TABLE quiz_sessions")
        .execute(&pool)
        .await
        .expect("drop quiz_sessions");

    let outcome = orchestrator.submit(&mut ctx, user_id, Utc::now()).await.expect("submit");

    assert_eq!(outcome.session_id, None);
    assert_eq!(outcome.correct_count, 1);
    assert!((outcome.score - 100.0 / 3.0).abs() < 1e-9);
    let verdicts: Vec<bool> = outcome.results.iter().map(|r| r.is_correct).collect();
    assert_eq!(verdicts, vec![true, false, false]);
    assert_eq!(outcome.results[2].user_answer, "");

    assert_eq!(logged_questions(&pool).await, 0);
    let user = credentials.get(user_id).await.unwrap().unwrap();
    assert_eq!(user.total_quizzes, 0);
    assert_eq!(user.total_score, 0.0);

    // graded exactly once even though nothing was stored
    assert!(orchestrator.submit(&mut ctx, user_id, Utc::now()).await.is_err());
}
