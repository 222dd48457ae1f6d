use std::sync::Arc;

use dashmap::DashMap;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ai::gateway::AiGateway;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub ai: Arc<dyn AiGateway>,
    pub config: Config,
    /// One lock per live interview session. Transitions and answer
    /// submissions for a session run one at a time. Entries are dropped
    /// when a session completes or its id turns out not to exist.
    pub session_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AppState {
    pub fn session_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.session_locks.entry(id).or_default().value().clone()
    }

    /// Drops the lock entry for a session that can no longer change.
    pub fn forget_session_lock(&self, id: Uuid) {
        self.session_locks.remove(&id);
    }
}
