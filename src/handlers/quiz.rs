// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::AppError,
    quiz::{QuizConfig, QuizView},
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Generates a new quiz for the caller and returns it without answers.
pub async fn generate_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(config): Json<QuizConfig>,
) -> Result<impl IntoResponse, AppError> {
    let view = start_quiz(&state, &claims, config).await?;
    Ok(Json(view))
}

/// Shared by direct generation and accepted suggestions.
pub(crate) async fn start_quiz(
    state: &AppState,
    claims: &Claims,
    config: QuizConfig,
) -> Result<QuizView, AppError> {
    let ctx = state.contexts.for_claims(claims).await?;
    let mut ctx = ctx.lock().await;

    state
        .orchestrator
        .generate(&mut ctx, config, state.generator.as_ref())
        .await?;

    state.orchestrator.current(&mut ctx, Utc::now())
}

pub async fn current_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = state.contexts.for_claims(&claims).await?;
    let mut ctx = ctx.lock().await;

    let view = state.orchestrator.current(&mut ctx, Utc::now())?;
    Ok(Json(view))
}

/// Stores or overwrites the answer to one question.
pub async fn answer_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<usize>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = state.contexts.for_claims(&claims).await?;
    let mut ctx = ctx.lock().await;

    state.orchestrator.answer(&mut ctx, index, payload.answer)?;
    let view = state.orchestrator.current(&mut ctx, Utc::now())?;
    Ok(Json(view))
}

/// Grades the active quiz. Saving is best-effort and never fails the request.
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let ctx = state.contexts.for_claims(&claims).await?;
    let mut ctx = ctx.lock().await;

    let outcome = state.orchestrator.submit(&mut ctx, user_id, Utc::now()).await?;
    Ok(Json(outcome))
}
