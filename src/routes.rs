// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, history, insights, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: register and login.
/// * Everything else sits behind the bearer-token middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/logout", post(auth::logout))
                .layer(auth_layer.clone()),
        );

    let quiz_routes = Router::new()
        .route("/generate", post(quiz::generate_quiz))
        .route("/current", get(quiz::current_quiz))
        .route("/answers/{index}", put(quiz::answer_question))
        .route("/submit", post(quiz::submit_quiz))
        .layer(auth_layer.clone());

    let insights_routes = Router::new()
        .route("/weak-topics", get(insights::weak_topics))
        .route("/recommendations", get(insights::recommendations))
        .route("/recommendations/accept", post(insights::accept_recommendation))
        .route(
            "/auto-suggestion",
            get(insights::auto_suggestion).post(insights::resolve_auto_suggestion),
        )
        .layer(auth_layer.clone());

    let history_routes = Router::new()
        .route("/", get(history::list_history))
        .route("/{id}", get(history::get_session))
        .route("/{id}/links/{number}", get(history::study_links_for))
        .layer(auth_layer.clone());

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/insights", insights_routes)
        .nest("/api/history", history_routes)
        .route("/api/dashboard", get(history::dashboard).layer(auth_layer))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
