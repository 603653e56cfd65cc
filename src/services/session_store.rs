use crate::error::StoreError;
use crate::models::SessionId;
use crate::services::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store or replace a session
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Find a session by ID
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError>;

    /// Remove a session; missing sessions are not an error
    async fn delete(&self, id: &SessionId) -> Result<(), StoreError>;
}

/// In-memory session storage, including undo history
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

/// Memory cache in front of a durable store.
///
/// Loads read through to the durable store on a cache miss; saves write
/// through to both. Sessions restored from disk start with empty history,
/// cached ones keep theirs.
pub struct LayeredSessionStore {
    cache: InMemorySessionStore,
    durable: Arc<dyn SessionStore>,
}

impl LayeredSessionStore {
    pub fn new(durable: Arc<dyn SessionStore>) -> Self {
        Self {
            cache: InMemorySessionStore::new(),
            durable,
        }
    }
}

#[async_trait]
impl SessionStore for LayeredSessionStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.durable.save(session).await?;
        self.cache.save(session).await
    }

    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        if let Some(session) = self.cache.load(id).await? {
            return Ok(Some(session));
        }
        let Some(session) = self.durable.load(id).await? else {
            return Ok(None);
        };
        tracing::debug!(session_id = %id, "Session restored from durable store");
        self.cache.save(&session).await?;
        Ok(Some(session))
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        self.cache.delete(id).await?;
        self.durable.delete(id).await
    }
}
