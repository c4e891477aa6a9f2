//! Per-user FIFO lanes.
//!
//! Each user gets a fair `tokio::sync::Mutex`; holding its guard while an
//! event is processed serializes that user's events in arrival order while
//! other users proceed concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use navguard_types::user::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct UserLanes {
    lanes: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLanes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for this user's lane. The lane stays held until the guard drops.
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lane = Arc::clone(&self.lanes.entry(user_id.clone()).or_default());
        lane.lock_owned().await
    }

    /// Drop lanes nobody holds or waits on. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let before = self.lanes.len();
        self.lanes.retain(|_, lane| Arc::strong_count(lane) > 1);
        before - self.lanes.len()
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}
