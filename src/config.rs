// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Trailing window used by the recommendation engine.
pub const RECOMMENDATION_WINDOW_DAYS: i64 = 14;
/// Default window for the weak-topic listing.
pub const DEFAULT_ANALYSIS_WINDOW_DAYS: i64 = 7;
/// Upper bound on questions per generated quiz.
pub const MAX_QUESTIONS_PER_QUIZ: u32 = 20;
/// Sessions shown in the history list when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: i64 = 15;
/// Sessions considered by the dashboard statistics.
pub const DASHBOARD_SESSION_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    /// API key for the OpenAI-compatible completions endpoint.
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://smartprep.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let llm_api_key = env::var("LLM_API_KEY")
            .or_else(|_| env::var("GROQ_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        let llm_base_url = env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());

        let llm_model = env::var("LLM_MODEL")
            .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            llm_api_key,
            llm_base_url,
            llm_model,
        }
    }
}
