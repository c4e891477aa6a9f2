//! Session state store: user id -> current menu.
//!
//! The `DashMap` cache is the fast path and the in-process source of truth.
//! The durable store (behind a [`PersistenceQueue`]) is consulted only on a
//! cold cache and is written best-effort. Nothing here fails outward: a
//! durable-store problem degrades to "use the root menu".

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use navguard_types::activity::EVENT_SESSION_RESET;
use navguard_types::menu::MenuType;
use navguard_types::user::UserId;

use super::persist::PersistenceQueue;
use crate::repository::MenuStateStore;

/// Cache-first, durable-backed map of each user's current menu.
pub struct SessionStore {
    cache: DashMap<UserId, MenuType>,
    persistence: PersistenceQueue,
}

impl SessionStore {
    /// Create a store whose durable writes go to `store` through a freshly
    /// spawned writer task.
    pub fn new<S: MenuStateStore + 'static>(store: Arc<S>) -> Self {
        Self::with_queue(PersistenceQueue::spawn(store))
    }

    pub fn with_queue(persistence: PersistenceQueue) -> Self {
        Self {
            cache: DashMap::new(),
            persistence,
        }
    }

    /// Current menu for a user.
    ///
    /// Cache hit returns immediately. On a miss the durable store is read;
    /// an absent row defaults to the root and is written through, an
    /// unreadable store or unknown tag degrades to the root with a warning.
    pub async fn get(&self, user_id: &UserId) -> MenuType {
        if let Some(menu) = self.peek(user_id) {
            return menu;
        }

        // `repair` marks a missing or unusable durable row that should be
        // rewritten as the root.
        let (loaded, repair) = match self.persistence.load(user_id.clone()).await {
            Ok(Some(tag)) => match tag.parse::<MenuType>() {
                Ok(menu) => (menu, false),
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %e,
                        "stored menu tag is invalid, resetting to root"
                    );
                    (MenuType::ROOT, true)
                }
            },
            Ok(None) => (MenuType::ROOT, true),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "persistence degraded: could not load menu state, defaulting to root"
                );
                (MenuType::ROOT, false)
            }
        };

        // A concurrent `set` that landed while we were loading wins, and its
        // durable write must not be followed by our root write-through.
        match self.cache.entry(user_id.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                if repair {
                    self.persistence.store(user_id.clone(), MenuType::ROOT);
                }
                *entry.insert(loaded)
            }
        }
    }

    /// Cached menu for a user, without touching the durable store.
    pub fn peek(&self, user_id: &UserId) -> Option<MenuType> {
        self.cache.get(user_id).map(|entry| *entry)
    }

    /// Record a user's new menu. The cache is updated before returning; the
    /// durable write happens in the background and its failure does not
    /// undo the cache write.
    pub fn set(&self, user_id: &UserId, menu: MenuType) {
        self.cache.insert(user_id.clone(), menu);
        self.persistence.store(user_id.clone(), menu);
    }

    /// Forget a user's cached menu and persist the root as their state.
    pub fn reset(&self, user_id: &UserId) {
        self.cache.remove(user_id);
        self.persistence.store(user_id.clone(), MenuType::ROOT);
        self.persistence
            .log_activity(user_id.clone(), EVENT_SESSION_RESET, serde_json::Value::Null);
    }

    /// Queue an activity-log entry on the durable store.
    pub fn log_activity(
        &self,
        user_id: &UserId,
        event_name: &str,
        payload: serde_json::Value,
    ) {
        self.persistence
            .log_activity(user_id.clone(), event_name, payload);
    }

    /// Wait for all queued durable operations to be applied.
    pub async fn flush(&self) {
        self.persistence.flush().await;
    }

    /// Number of users with a cached menu.
    pub fn cached_users(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("cached_users", &self.cache.len())
            .finish()
    }
}
