// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest},
    state::SessionContexts,
    store::CredentialStore,
    utils::jwt::{Claims, sign_jwt},
};

/// Registers a new user.
///
/// Returns 201 Created and the public identity (no password hash).
pub async fn register(
    State(credentials): State<CredentialStore>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = credentials.register(&payload).await?;
    tracing::info!("Registered user '{}'", user.username);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// Unknown users and wrong passwords get the same answer.
pub async fn login(
    State(credentials): State<CredentialStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = credentials
        .login(&payload.username, &payload.password)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

    let token = sign_jwt(
        user.id,
        &user.username,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": user,
    })))
}

/// Drops the caller's interactive context. Tokens are stateless and simply expire.
pub async fn logout(
    State(contexts): State<SessionContexts>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    contexts.remove(claims.user_id()?).await;
    Ok(Json(json!({ "message": "Logged out" })))
}
