// src/store/session.rs

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::session::{NewSessionRecord, SessionRecord, SessionRow},
};

const SELECT_SESSION: &str = r#"
    SELECT
        id, user_id, topic, sub_topic, question_type, difficulty, num_questions,
        score, questions_data, user_answers, results_data, created_at
    FROM quiz_sessions
"#;

/// Durable record of completed quiz attempts.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Saves a completed quiz with its snapshots and returns the session id.
    pub async fn insert(&self, session: &NewSessionRecord) -> Result<i64, AppError> {
        let questions = serde_json::to_string(&session.questions)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        let answers = serde_json::to_string(&session.user_answers)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        let results = serde_json::to_string(&session.results)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO quiz_sessions (
                user_id, topic, sub_topic, question_type, difficulty,
                num_questions, score, questions_data, user_answers, results_data,
                created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.user_id)
        .bind(&session.topic)
        .bind(&session.sub_topic)
        .bind(session.question_kind.as_str())
        .bind(session.difficulty.as_str())
        .bind(session.num_questions.max(1))
        .bind(session.score)
        .bind(questions)
        .bind(answers)
        .bind(results)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save quiz session: {:?}", e);
            AppError::from(e)
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent sessions for a user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<SessionRecord>, AppError> {
        let sql = format!(
            "{} WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
            SELECT_SESSION
        );

        let rows = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SessionRecord::from).collect())
    }

    /// Loads one session, scoped to its owner.
    pub async fn get(&self, session_id: i64, user_id: i64) -> Result<Option<SessionRecord>, AppError> {
        let sql = format!("{} WHERE id = ? AND user_id = ?", SELECT_SESSION);

        let row = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SessionRecord::from))
    }
}
