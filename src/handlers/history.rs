// src/handlers/history.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::{Value, json};

use crate::{
    config::{DASHBOARD_SESSION_LIMIT, DEFAULT_HISTORY_LIMIT, RECOMMENDATION_WINDOW_DAYS},
    error::AppError,
    history::{dashboard_stats, review_session, search_sessions},
    models::session::{HistoryParams, SessionSummary},
    state::AppState,
    utils::{jwt::Claims, links::study_links},
};

/// Weak topics listed on the dashboard.
const DASHBOARD_WEAK_TOPICS: usize = 3;

/// Lists the caller's most recent sessions, optionally filtered.
pub async fn list_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 100);

    let sessions = state
        .orchestrator
        .sessions()
        .list_for_user(claims.user_id()?, limit)
        .await?;

    let summaries: Vec<SessionSummary> = search_sessions(&sessions, params.q.as_deref().unwrap_or(""))
        .into_iter()
        .map(SessionSummary::from)
        .collect();

    Ok(Json(summaries))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .orchestrator
        .sessions()
        .get(id, claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;

    Ok(Json(review_session(&record)))
}

/// Study links for one reviewed question (numbered from 1).
pub async fn study_links_for(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, number)): Path<(i64, usize)>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .orchestrator
        .sessions()
        .get(id, claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;

    let review = review_session(&record);
    let result = review
        .results
        .iter()
        .find(|r| r.question_number == number)
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", number)))?;

    Ok(Json(study_links(
        &result.question,
        &result.correct_answer,
        &record.display_title(),
        &result.user_answer,
    )))
}

/// Headline statistics plus the weakest recent topics.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let sessions = state
        .orchestrator
        .sessions()
        .list_for_user(user_id, DASHBOARD_SESSION_LIMIT)
        .await?;
    let stats = dashboard_stats(&sessions, Utc::now());
    let user = state.credentials.get(user_id).await?;

    let weak_topics: Vec<Value> = if state.orchestrator.has_analytics() {
        let analysis = state
            .orchestrator
            .weak_topics(user_id, RECOMMENDATION_WINDOW_DAYS)
            .await;
        let mut weak: Vec<_> = analysis.weak_topics.into_iter().collect();
        weak.sort_by(|a, b| a.1.accuracy.total_cmp(&b.1.accuracy));
        weak.truncate(DASHBOARD_WEAK_TOPICS);
        weak.into_iter()
            .map(|(topic, perf)| json!({ "topic": topic, "accuracy": perf.accuracy }))
            .collect()
    } else {
        Vec::new()
    };

    Ok(Json(json!({
        "user": user,
        "stats": stats,
        "weak_topics": weak_topics,
        "analytics_enabled": state.orchestrator.has_analytics(),
    })))
}
