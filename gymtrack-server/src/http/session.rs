//! Server-side admin sessions
//!
//! A successful login mints an opaque bearer token. Each session owns its
//! own paginated caches, so an admin paging through history or the
//! equipment log never re-queries the store between pages.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use gymtrack_core::{DocumentStore, PaginatedCollection};

use crate::models::{AttendanceRecord, Inspection};

/// One authenticated administrator
pub struct AdminSession {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
    /// Month of check-ins being browsed
    pub history: PaginatedCollection<AttendanceRecord>,
    /// Filtered inspection list being browsed
    pub equipment: PaginatedCollection<Inspection>,
    /// Whole inspection log, for per-condition counts
    pub equipment_log: PaginatedCollection<Inspection>,
}

impl AdminSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Re-fetch the equipment caches after a write.
    pub async fn refresh_equipment(&self) {
        self.equipment.refresh().await;
        self.equipment_log.refresh().await;
    }
}

/// Token-indexed sessions with a fixed time-to-live
pub struct SessionStore {
    store: Arc<dyn DocumentStore>,
    ttl: Duration,
    sessions: RwLock<HashMap<String, Arc<AdminSession>>>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn DocumentStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session for `username`.
    pub async fn create(&self, username: &str) -> Arc<AdminSession> {
        let session = Arc::new(AdminSession {
            token: Uuid::new_v4().simple().to_string(),
            username: username.to_owned(),
            expires_at: Utc::now() + self.ttl,
            history: PaginatedCollection::new(Arc::clone(&self.store)),
            equipment: PaginatedCollection::new(Arc::clone(&self.store)),
            equipment_log: PaginatedCollection::new(Arc::clone(&self.store)),
        });

        self.sessions
            .write()
            .await
            .insert(session.token.clone(), Arc::clone(&session));
        tracing::info!(username, "admin session started");
        session
    }

    /// Live session for `token`; an expired one is dropped on access.
    pub async fn get(&self, token: &str) -> Option<Arc<AdminSession>> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.is_expired(Utc::now()) {
            self.sessions.write().await.remove(token);
            tracing::debug!(username = %session.username, "admin session expired");
            return None;
        }
        Some(session)
    }

    /// End a session. Returns whether it existed.
    pub async fn remove(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(session) = &removed {
            tracing::info!(username = %session.username, "admin session ended");
        }
        removed.is_some()
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
