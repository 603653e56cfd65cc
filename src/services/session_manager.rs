use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::error::ApiError;
use crate::models::{DisplayParams, GenerationParams, SessionId};
use crate::services::{Session, SessionStore};

/// Serializes access to sessions and runs chart work off the async runtime.
///
/// Each session has its own lock; a mutation loads the session, runs the
/// closure inside `spawn_blocking`, and saves the result back to the store
/// before the lock is released. Locks nobody holds are dropped again.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    locks: RwLock<HashMap<SessionId, Arc<Mutex<()>>>>,
    generation: GenerationParams,
    display: DisplayParams,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generation: GenerationParams,
        display: DisplayParams,
    ) -> Self {
        Self {
            store,
            locks: RwLock::new(HashMap::new()),
            generation,
            display,
        }
    }

    /// Start a session with the configured default parameters
    pub async fn create(&self) -> Result<SessionId, ApiError> {
        let id = SessionId::generate();
        let session = Session::new(id.clone(), self.generation.clone(), self.display.clone());
        self.store.save(&session).await?;
        tracing::info!(session_id = %id, "Session created");
        Ok(id)
    }

    /// Run `f` on the session with exclusive access, then persist it.
    ///
    /// The session is only saved when `f` succeeds.
    pub async fn update<F, T>(&self, id: &SessionId, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Session) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let lock = self.lock_for(id).await;
        let result = {
            let _guard = lock.lock().await;
            self.update_locked(id, f).await
        };
        drop(lock);
        self.release(id).await;
        result
    }

    async fn update_locked<F, T>(&self, id: &SessionId, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Session) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let mut session = self
            .store
            .load(id)
            .await?
            .ok_or(ApiError::SessionNotFound)?;

        let (mut session, result) = tokio::task::spawn_blocking(move || {
            let result = f(&mut session);
            (session, result)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Task error: {e}")))?;

        let value = result?;
        session.touch();
        self.store.save(&session).await?;
        Ok(value)
    }

    /// Run `f` on a snapshot of the session without saving
    pub async fn read<F, T>(&self, id: &SessionId, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Session) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let lock = self.lock_for(id).await;
        let loaded = {
            let _guard = lock.lock().await;
            self.store.load(id).await
        };
        drop(lock);
        self.release(id).await;
        let session = loaded?.ok_or(ApiError::SessionNotFound)?;

        tokio::task::spawn_blocking(move || f(&session))
            .await
            .map_err(|e| ApiError::Internal(format!("Task error: {e}")))?
    }

    async fn lock_for(&self, id: &SessionId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(id) {
            return lock.clone();
        }
        self.locks
            .write()
            .await
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock of `id` once no caller holds or waits on it
    async fn release(&self, id: &SessionId) {
        let mut locks = self.locks.write().await;
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    async fn tracked_locks(&self) -> usize {
        self.locks.read().await.len()
    }
}
