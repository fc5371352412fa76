//! Registry of live assessment sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::paced::{PacedSession, Pacing};
use crate::assessment::{EngineOptions, ResponsePicker};

/// Holds isolated sessions keyed by a time-ordered id.
///
/// Sessions live in memory only and vanish when removed or when the
/// process exits.
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, Arc<PacedSession>>>,
    pacing: Pacing,
    fallback_seed: Option<u64>,
}

impl SessionManager {
    pub fn new(pacing: Pacing, fallback_seed: Option<u64>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            pacing,
            fallback_seed,
        }
    }

    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            picker: self
                .fallback_seed
                .map_or_else(ResponsePicker::rotating, ResponsePicker::seeded),
            ..EngineOptions::default()
        }
    }

    /// Start a new session.
    pub async fn create(&self) -> (Uuid, Arc<PacedSession>) {
        let id = Uuid::now_v7();
        let session = Arc::new(PacedSession::new(self.engine_options(), self.pacing));
        self.sessions.write().await.insert(id, Arc::clone(&session));
        info!(%id, "Session created");
        (id, session)
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<PacedSession>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Discard a session. Returns false if it did not exist.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(%id, "Session discarded");
        }
        removed
    }

    /// All sessions, oldest first.
    pub async fn list(&self) -> Vec<(Uuid, Arc<PacedSession>)> {
        let mut sessions: Vec<_> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, s)| (*id, Arc::clone(s)))
            .collect();
        sessions.sort_by_key(|(id, _)| *id);
        sessions
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phase;

    #[tokio::test]
    async fn sessions_are_isolated() {
        let manager = SessionManager::new(Pacing::instant(), None);
        let (first_id, first) = manager.create().await;
        let (second_id, second) = manager.create().await;
        assert_ne!(first_id, second_id);

        first.submit("yes").await.unwrap();
        first.wait_idle().await;

        assert_eq!(first.snapshot().await.phase, Phase::InProgress);
        assert_eq!(second.snapshot().await.phase, Phase::AwaitingStart);
        assert_eq!(second.transcript().await.len(), 1);
    }

    #[tokio::test]
    async fn remove_discards_session() {
        let manager = SessionManager::new(Pacing::instant(), Some(3));
        let (id, _) = manager.create().await;
        assert_eq!(manager.len().await, 1);

        assert!(manager.remove(&id).await);
        assert!(!manager.remove(&id).await);
        assert!(manager.get(&id).await.is_none());
        assert_eq!(manager.len().await, 0);
    }

    #[tokio::test]
    async fn list_is_oldest_first() {
        let manager = SessionManager::new(Pacing::instant(), None);
        let (a, _) = manager.create().await;
        let (b, _) = manager.create().await;
        let ids: Vec<_> = manager.list().await.into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
