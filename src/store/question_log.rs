// src/store/question_log.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::question_log::{NewQuestionRecord, QuestionLogRow, QuestionRecord},
};

const SELECT_QUESTION_LOG: &str = r#"
    SELECT
        id, user_id, session_id, topic, sub_topic, difficulty, question_type,
        question_text, options, correct_answer, user_answer, is_correct,
        time_taken, explanation, created_at
    FROM question_log
"#;

/// Durable record of every graded question.
#[derive(Clone)]
pub struct QuestionLogStore {
    pool: SqlitePool,
}

impl QuestionLogStore {
    /// Opens the store, probing the 'question_log' table once.
    ///
    /// Callers treat an error here as "question logging unavailable".
    pub async fn connect(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::query("SELECT 1 FROM question_log LIMIT 1")
            .fetch_optional(&pool)
            .await?;

        Ok(Self { pool })
    }

    /// Appends one graded question and returns its id.
    pub async fn insert(&self, record: &NewQuestionRecord) -> Result<i64, AppError> {
        let options = serde_json::to_string(&record.options)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO question_log (
                user_id, session_id, topic, sub_topic, difficulty, question_type,
                question_text, options, correct_answer, user_answer, is_correct,
                time_taken, explanation, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.user_id)
        .bind(record.session_id)
        .bind(&record.topic)
        .bind(&record.sub_topic)
        .bind(record.difficulty.as_str())
        .bind(record.question_kind.as_str())
        .bind(&record.question_text)
        .bind(options)
        .bind(&record.correct_answer)
        .bind(&record.user_answer)
        .bind(record.is_correct)
        .bind(record.time_taken.max(0))
        .bind(&record.explanation)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to log question: {:?}", e);
            AppError::from(e)
        })?;

        Ok(result.last_insert_rowid())
    }

    /// The `limit` most recent records for a user, newest first.
    pub async fn recent(&self, user_id: i64, limit: i64) -> Result<Vec<QuestionRecord>, AppError> {
        let sql = format!(
            "{} WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
            SELECT_QUESTION_LOG
        );

        let rows = sqlx::query_as::<_, QuestionLogRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(QuestionRecord::from).collect())
    }

    /// All records for a user created at or after `since`, oldest first.
    pub async fn since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<QuestionRecord>, AppError> {
        let sql = format!(
            "{} WHERE user_id = ? AND created_at >= ? ORDER BY created_at ASC, id ASC",
            SELECT_QUESTION_LOG
        );

        let rows = sqlx::query_as::<_, QuestionLogRow>(&sql)
            .bind(user_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(QuestionRecord::from).collect())
    }
}
