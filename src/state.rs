// src/state.rs

use std::{collections::HashMap, sync::Arc};

use axum::extract::FromRef;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    config::Config,
    context::SessionContext,
    error::AppError,
    generator::QuestionGenerator,
    quiz::QuizOrchestrator,
    store::CredentialStore,
    utils::jwt::Claims,
};

/// One interactive context per signed-in user.
///
/// Each context has its own lock so a slow generation only blocks its owner.
/// An entry lives until the newest token seen for its user expires; expired
/// entries are swept on every checkout.
#[derive(Clone, Default)]
pub struct SessionContexts {
    inner: Arc<Mutex<HashMap<i64, ContextEntry>>>,
}

struct ContextEntry {
    /// Unix seconds.
    expires_at: i64,
    ctx: Arc<Mutex<SessionContext>>,
}

impl SessionContexts {
    /// Context for the bearer of `claims`, kept alive until the token expires.
    pub async fn for_claims(&self, claims: &Claims) -> Result<Arc<Mutex<SessionContext>>, AppError> {
        let user_id = claims.user_id()?;
        let expires_at = i64::try_from(claims.exp).unwrap_or(i64::MAX);
        Ok(self.for_user(user_id, expires_at, Utc::now().timestamp()).await)
    }

    pub async fn for_user(&self, user_id: i64, expires_at: i64, now: i64) -> Arc<Mutex<SessionContext>> {
        let mut contexts = self.inner.lock().await;
        sweep(&mut contexts, now);

        let entry = contexts.entry(user_id).or_insert_with(|| ContextEntry {
            expires_at,
            ctx: Arc::default(),
        });
        entry.expires_at = entry.expires_at.max(expires_at);
        entry.ctx.clone()
    }

    /// Drops contexts whose tokens have all expired. Returns how many went.
    pub async fn evict_expired(&self, now: i64) -> usize {
        sweep(&mut *self.inner.lock().await, now)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn remove(&self, user_id: i64) {
        if let Some(entry) = self.inner.lock().await.remove(&user_id) {
            entry.ctx.lock().await.reset();
        }
    }
}

fn sweep(contexts: &mut HashMap<i64, ContextEntry>, now: i64) -> usize {
    let before = contexts.len();
    contexts.retain(|user_id, entry| {
        let keep = entry.expires_at > now;
        if !keep {
            tracing::debug!("Evicting expired context for user {}", user_id);
        }
        keep
    });
    before - contexts.len()
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub credentials: CredentialStore,
    pub orchestrator: QuizOrchestrator,
    pub generator: Arc<dyn QuestionGenerator>,
    pub contexts: SessionContexts,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for CredentialStore {
    fn from_ref(state: &AppState) -> Self {
        state.credentials.clone()
    }
}

impl FromRef<AppState> for QuizOrchestrator {
    fn from_ref(state: &AppState) -> Self {
        state.orchestrator.clone()
    }
}

impl FromRef<AppState> for SessionContexts {
    fn from_ref(state: &AppState) -> Self {
        state.contexts.clone()
    }
}
