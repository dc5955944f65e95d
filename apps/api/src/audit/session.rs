//! Per-user ownership of `AuditStore` instances.
//!
//! Each user's state lives behind its own lock. A mutation runs, then the whole
//! state is saved before the lock is released. If the save fails, the state is
//! rolled back, so a half-applied change is never visible.
//!
//! The registry holds at most `capacity` sessions. Once full, sessions no
//! request is using are dropped before a new one is loaded.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::audit::store::AuditStore;
use crate::audit::wizard::SmartSkip;
use crate::storage::{StateStorage, StorageError};

pub struct Session {
    pub store: AuditStore,
    pub smart_skip: SmartSkip,
}

impl Session {
    fn new(store: AuditStore) -> Self {
        Self {
            store,
            smart_skip: SmartSkip::default(),
        }
    }

    /// Global reset. The smart skip is re-armed along with the data.
    pub fn reset(&mut self) {
        self.store.reset();
        self.smart_skip = SmartSkip::default();
    }
}

pub struct SessionRegistry {
    storage: Arc<dyn StateStorage>,
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
    capacity: usize,
    in_flight: StdMutex<HashSet<String>>,
}

impl SessionRegistry {
    pub fn new(storage: Arc<dyn StateStorage>, capacity: usize) -> Self {
        Self {
            storage,
            sessions: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            in_flight: StdMutex::new(HashSet::new()),
        }
    }

    /// Returns the user's session, loading persisted state the first time.
    ///
    /// The map lock is never held across the load. When two first requests
    /// race, the session inserted first wins and the other load is discarded.
    async fn session(&self, user_id: &str) -> Result<Arc<Mutex<Session>>, StorageError> {
        let cached = self.sessions.lock().await.get(user_id).cloned();
        if let Some(session) = cached {
            return Ok(session);
        }

        let store = match self.storage.load(user_id).await? {
            Some(store) => {
                info!("Rehydrated audit state for user {user_id}");
                store
            }
            None => AuditStore::default(),
        };

        let mut sessions = self.sessions.lock().await;
        if !sessions.contains_key(user_id) && sessions.len() >= self.capacity {
            evict_idle(&mut sessions);
        }
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(store))));
        Ok(Arc::clone(session))
    }

    pub async fn read<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&AuditStore) -> T,
    ) -> Result<T, StorageError> {
        let session = self.session(user_id).await?;
        let guard = session.lock().await;
        Ok(f(&guard.store))
    }

    /// Applies a mutation and persists the whole resulting state.
    pub async fn update<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, StorageError> {
        let session = self.session(user_id).await?;
        let mut guard = session.lock().await;
        let before = guard.store.clone();
        let out = f(&mut *guard);
        if let Err(e) = self.storage.save(user_id, &guard.store).await {
            guard.store = before;
            return Err(e);
        }
        debug!("Saved audit state for user {user_id}");
        Ok(out)
    }

    /// Marks an analysis call as pending for this user. Returns `None` if one
    /// is already running. The mark is cleared when the guard drops.
    pub fn begin_analysis(&self, user_id: &str) -> Option<AnalysisGuard<'_>> {
        let mut pending = self.pending();
        if !pending.insert(user_id.to_string()) {
            return None;
        }
        Some(AnalysisGuard {
            registry: self,
            user_id: user_id.to_string(),
        })
    }

    fn pending(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Drops every session no request currently holds. Their state is already
/// persisted, so the next request reloads it.
fn evict_idle(sessions: &mut HashMap<String, Arc<Mutex<Session>>>) {
    let before = sessions.len();
    sessions.retain(|_, session| Arc::strong_count(session) > 1);
    debug!("Evicted {} idle sessions", before - sessions.len());
}

pub struct AnalysisGuard<'a> {
    registry: &'a SessionRegistry,
    user_id: String,
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        self.registry.pending().remove(&self.user_id);
    }
}
