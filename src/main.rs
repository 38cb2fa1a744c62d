// src/main.rs

use std::{sync::Arc, time::Duration};

use smartprep::{
    config::Config,
    generator::LlmQuestionGenerator,
    quiz::QuizOrchestrator,
    routes,
    state::{AppState, SessionContexts},
    store::{CredentialStore, QuestionLogStore, SessionStore},
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment (.env included)
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    // Question logging is optional; without it insights stay locked.
    let logs = match QuestionLogStore::connect(pool.clone()).await {
        Ok(logs) => Some(logs),
        Err(e) => {
            tracing::warn!("Question log unavailable, running without analytics: {}", e);
            None
        }
    };

    if config.llm_api_key.is_none() {
        tracing::warn!("No LLM API key configured; quiz generation will fail");
    }

    let credentials = CredentialStore::new(pool.clone());
    let orchestrator = QuizOrchestrator::new(SessionStore::new(pool.clone()), credentials.clone(), logs);

    let state = AppState {
        config: config.clone(),
        credentials,
        orchestrator,
        generator: Arc::new(LlmQuestionGenerator::new(&config)),
        contexts: SessionContexts::default(),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
