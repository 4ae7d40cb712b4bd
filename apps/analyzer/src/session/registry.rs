use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::session::controller::AnalysisSession;

pub type SharedSession = Arc<Mutex<AnalysisSession>>;

/// In-memory sessions keyed by id. Sessions live until explicitly removed.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(AnalysisSession::new()));
        self.sessions.write().await.insert(id, session.clone());
        debug!("Session {id} created");
        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            debug!("Session {id} removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = SessionRegistry::new();
        let (id, session) = registry.create().await;
        session.lock().await.set_input("hello");

        let fetched = registry.get(id).await.unwrap();
        assert_eq!(fetched.lock().await.input(), "hello");
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let registry = SessionRegistry::new();
        let (_, a) = registry.create().await;
        let (_, b) = registry.create().await;
        a.lock().await.set_input("a");
        assert!(b.lock().await.input().is_empty());
    }
}
