// src/handlers/insights.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    analysis::AutoSuggestionTrigger,
    config::DEFAULT_ANALYSIS_WINDOW_DAYS,
    error::AppError,
    handlers::quiz::start_quiz,
    models::analysis::SuggestionDecision,
    quiz::QuizConfig,
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Deserialize)]
pub struct WindowParams {
    /// Trailing window in days (default: 7, clamped to 1..=365).
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: SuggestionDecision,
}

pub async fn weak_topics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, AppError> {
    let days = params
        .days
        .unwrap_or(DEFAULT_ANALYSIS_WINDOW_DAYS)
        .clamp(1, 365);

    let analysis = state.orchestrator.weak_topics(claims.user_id()?, days).await;
    Ok(Json(analysis))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let recommendation = state.orchestrator.recommendations(claims.user_id()?).await;
    Ok(Json(recommendation))
}

/// Starts the quiz the recommendation engine currently suggests.
pub async fn accept_recommendation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let suggested = state
        .orchestrator
        .recommendations(user_id)
        .await
        .suggested_quiz
        .ok_or_else(|| AppError::BadRequest("No recommended quiz available".to_string()))?;

    tracing::info!("User {} accepted recommendation: {}", user_id, suggested.reason);
    let view = start_quiz(&state, &claims, QuizConfig::from(suggested)).await?;
    Ok(Json(view))
}

pub async fn auto_suggestion(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let ctx = state.contexts.for_claims(&claims).await?;
    let ctx = ctx.lock().await;

    let suggestion = state.orchestrator.auto_suggestion(user_id, &ctx).await;
    Ok(Json(json!({ "suggestion": suggestion })))
}

/// Applies accept/skip/disable to the suggestion currently in effect.
pub async fn resolve_auto_suggestion(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let accepted = {
        let ctx = state.contexts.for_claims(&claims).await?;
        let mut ctx = ctx.lock().await;

        match state.orchestrator.auto_suggestion(user_id, &ctx).await {
            Some(suggestion) => AutoSuggestionTrigger::resolve(payload.decision, &suggestion, &mut ctx),
            None => match payload.decision {
                SuggestionDecision::Accept => {
                    return Err(AppError::BadRequest("No active suggestion".to_string()));
                }
                SuggestionDecision::Disable => {
                    ctx.auto_suggestions_disabled = true;
                    None
                }
                SuggestionDecision::Skip => None,
            },
        }
    };

    match accepted {
        Some(quiz) => {
            tracing::info!("User {} accepted auto-suggestion: {}", user_id, quiz.reason);
            let view = start_quiz(&state, &claims, QuizConfig::from(quiz)).await?;
            Ok(Json(json!({ "quiz": view })))
        }
        None => Ok(Json(json!({ "quiz": null }))),
    }
}
