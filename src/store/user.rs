// src/store/user.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::user::{CreateUserRequest, User, UserIdentity},
    utils::hash::{hash_password, verify_password},
};

/// Username/password credentials and per-user quiz aggregates.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers a new user. Duplicate username or email yields `Conflict`.
    pub async fn register(&self, payload: &CreateUserRequest) -> Result<UserIdentity, AppError> {
        let password_hash = hash_password(&payload.password)?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::Conflict("Username or email already exists".to_string())
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(UserIdentity {
            id: result.last_insert_rowid(),
            username: payload.username.clone(),
            email: payload.email.clone(),
            total_quizzes: 0,
            total_score: 0.0,
        })
    }

    /// Verifies credentials.
    ///
    /// Unknown usernames and wrong passwords both yield `Ok(None)`; only
    /// storage failures surface as errors.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<UserIdentity>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, total_quizzes, total_score
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Login DB error: {:?}", e);
            AppError::from(e)
        })?;

        let Some(user) = user else {
            return Ok(None);
        };

        // An unparsable stored hash is treated like a wrong password.
        if !verify_password(password, &user.password_hash).unwrap_or(false) {
            return Ok(None);
        }

        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        Ok(Some(UserIdentity::from(user)))
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<UserIdentity>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, total_quizzes, total_score
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(UserIdentity::from))
    }

    /// Folds one more quiz score into the user's running average.
    pub async fn record_quiz(&self, user_id: i64, score: f64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET total_score = (total_score * total_quizzes + ?) / (total_quizzes + 1),
                total_quizzes = total_quizzes + 1
            WHERE id = ?
            "#,
        )
        .bind(score)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
