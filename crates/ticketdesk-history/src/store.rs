//! Per-user history store
//!
//! Every operation takes the caller's [`UserContext`]. Authenticated users get
//! a persisted, newest-first sequence under their own key. Anonymous sessions
//! get an in-memory view only.

use crate::backend::{HistoryBackend, MemoryBackend};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use ticketdesk_core::{Error, HistoryEntry, Result, SessionKey, UserContext};
use tracing::{debug, info, warn};

/// Prefix joined with the user id to form the storage key
pub const HISTORY_KEY_PREFIX: &str = "ticketdesk_history_";

/// Storage key for one user's history
pub fn storage_key(user_id: &str) -> String {
    format!("{}{}", HISTORY_KEY_PREFIX, user_id)
}

/// In-memory state for one session
#[derive(Debug, Default)]
struct SessionView {
    /// Newest first
    entries: Vec<HistoryEntry>,

    /// Set once `entries` includes everything persisted for the user
    hydrated: bool,

    /// Ids of entries that have not reached the backend yet
    unsaved: HashSet<String>,
}

impl SessionView {
    /// Adopt the persisted sequence, keeping unsaved entries ahead of it
    fn hydrate(&mut self, persisted: Vec<HistoryEntry>) {
        let pending: Vec<HistoryEntry> = {
            let persisted_ids: HashSet<&str> = persisted.iter().map(|e| e.id.as_str()).collect();
            std::mem::take(&mut self.entries)
                .into_iter()
                .filter(|e| self.unsaved.contains(&e.id) && !persisted_ids.contains(e.id.as_str()))
                .collect()
        };

        self.unsaved = pending.iter().map(|e| e.id.clone()).collect();
        self.entries = pending;
        self.entries.extend(persisted);
        self.hydrated = true;
    }

    fn push_unsaved(&mut self, entry: HistoryEntry) {
        self.unsaved.insert(entry.id.clone());
        self.entries.insert(0, entry);
    }
}

/// Ordered, per-user prediction log.
///
/// Holds an in-memory view per session that is authoritative for the running
/// process. The backend is only ever written with a sequence that already
/// contains everything read from it, so a failed or corrupt read never
/// replaces stored history. Entries that could not be written stay in the
/// view, and the call returns [`Error::PersistenceUnavailable`].
pub struct HistoryStore {
    backend: Arc<dyn HistoryBackend>,
    views: RwLock<HashMap<SessionKey, SessionView>>,
}

impl HistoryStore {
    /// Create a store over the given backend
    pub fn new(backend: Arc<dyn HistoryBackend>) -> Self {
        Self {
            backend,
            views: RwLock::new(HashMap::new()),
        }
    }

    /// Store backed by a fresh [`MemoryBackend`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Refresh the user's view from storage and return it, newest first.
    ///
    /// Entries from this session that never reached storage stay ahead of the
    /// persisted ones. Empty for unauthenticated contexts.
    pub async fn load(&self, ctx: &UserContext) -> Result<Vec<HistoryEntry>> {
        let Some(user_id) = ctx.persisted_user() else {
            return Ok(Vec::new());
        };

        let persisted = self.read_persisted(user_id).await?;
        debug!(user = user_id, count = persisted.len(), "loaded history");

        let mut views = self.views.write();
        let view = views.entry(ctx.session_key()).or_default();
        view.hydrate(persisted);
        Ok(view.entries.clone())
    }

    /// Prepend `entry` and persist the full updated sequence.
    ///
    /// Anonymous contexts only update the in-memory view. Nothing is written
    /// until the user's stored history has been read successfully.
    pub async fn append(&self, ctx: &UserContext, entry: HistoryEntry) -> Result<()> {
        let key = ctx.session_key();
        let Some(user_id) = ctx.persisted_user() else {
            self.views.write().entry(key).or_default().entries.insert(0, entry);
            return Ok(());
        };

        let hydrated = self.views.read().get(&key).is_some_and(|v| v.hydrated);
        if !hydrated {
            match self.read_persisted(user_id).await {
                Ok(persisted) => self.views.write().entry(key.clone()).or_default().hydrate(persisted),
                Err(e) => {
                    warn!(user = user_id, "history unreadable, keeping entry in memory: {}", e);
                    self.views.write().entry(key).or_default().push_unsaved(entry);
                    return Err(e);
                }
            }
        }

        let (serialized, written) = {
            let mut views = self.views.write();
            let view = views.entry(key.clone()).or_default();
            view.push_unsaved(entry);
            let written: Vec<String> = view.entries.iter().map(|e| e.id.clone()).collect();
            (serde_json::to_string(&view.entries)?, written)
        };

        self.backend.set(&storage_key(user_id), serialized).await?;

        if let Some(view) = self.views.write().get_mut(&key) {
            for id in &written {
                view.unsaved.remove(id);
            }
        }
        Ok(())
    }

    /// Remove the user's persisted sequence and empty the in-memory view
    pub async fn clear(&self, ctx: &UserContext) -> Result<()> {
        let key = ctx.session_key();
        self.views.write().remove(&key);

        if let Some(user_id) = ctx.persisted_user() {
            self.backend.remove(&storage_key(user_id)).await?;
            // Storage is known to be empty now
            self.views.write().entry(key).or_default().hydrated = true;
            info!(user = user_id, "cleared history");
        }
        Ok(())
    }

    /// Current in-memory view for the context, newest first. No I/O.
    pub fn snapshot(&self, ctx: &UserContext) -> Vec<HistoryEntry> {
        self.views
            .read()
            .get(&ctx.session_key())
            .map(|v| v.entries.clone())
            .unwrap_or_default()
    }

    async fn read_persisted(&self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        match self.backend.get(&storage_key(user_id)).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                Error::persistence(format!("stored history for '{}' is corrupt: {}", user_id, e))
            }),
            None => Ok(Vec::new()),
        }
    }
}
