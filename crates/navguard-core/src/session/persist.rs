//! Background writer that owns the durable menu-state store.
//!
//! Every durable operation goes through one bounded mpsc queue consumed by a
//! single task, so operations are applied in the order they were issued.
//! Writes are fire-and-forget and are dropped with a warning when the queue
//! is full; reads wait for their reply and therefore never overtake an
//! earlier write for the same user. Failures are logged at `warn` and never
//! returned to the navigation path.

use std::sync::Arc;

use navguard_types::error::RepositoryError;
use navguard_types::menu::MenuType;
use navguard_types::user::UserId;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::repository::MenuStateStore;

/// Pending durable operations held before writes start being dropped.
pub const QUEUE_CAPACITY: usize = 1024;

enum PersistCommand {
    Store {
        user_id: UserId,
        menu: MenuType,
    },
    Log {
        user_id: UserId,
        event_name: String,
        payload: serde_json::Value,
    },
    Load {
        user_id: UserId,
        reply: oneshot::Sender<Result<Option<String>, RepositoryError>>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
}

impl PersistCommand {
    fn user_id(&self) -> Option<&UserId> {
        match self {
            PersistCommand::Store { user_id, .. }
            | PersistCommand::Log { user_id, .. }
            | PersistCommand::Load { user_id, .. } => Some(user_id),
            PersistCommand::Flush { .. } => None,
        }
    }
}

/// Handle to the durable-store writer task. Cheap to clone.
#[derive(Clone)]
pub struct PersistenceQueue {
    sender: mpsc::Sender<PersistCommand>,
}

impl PersistenceQueue {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn<S: MenuStateStore + 'static>(store: Arc<S>) -> Self {
        Self::spawn_with_capacity(store, QUEUE_CAPACITY)
    }

    pub fn spawn_with_capacity<S: MenuStateStore + 'static>(store: Arc<S>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_writer(store, receiver));
        Self { sender }
    }

    /// Queue a menu-state write.
    pub fn store(&self, user_id: UserId, menu: MenuType) {
        self.enqueue(PersistCommand::Store { user_id, menu });
    }

    /// Queue an activity-log append.
    pub fn log_activity(
        &self,
        user_id: UserId,
        event_name: impl Into<String>,
        payload: serde_json::Value,
    ) {
        self.enqueue(PersistCommand::Log {
            user_id,
            event_name: event_name.into(),
            payload,
        });
    }

    /// Read a user's persisted tag after all previously queued operations.
    pub async fn load(&self, user_id: UserId) -> Result<Option<String>, RepositoryError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PersistCommand::Load { user_id, reply })
            .await
            .map_err(|_| RepositoryError::Connection)?;
        rx.await.map_err(|_| RepositoryError::Connection)?
    }

    /// Wait until everything queued so far has been applied.
    pub async fn flush(&self) {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(PersistCommand::Flush { reply }).await.is_ok() {
            let _ = rx.await;
        }
    }

    fn enqueue(&self, command: PersistCommand) {
        match self.sender.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                tracing::warn!(
                    user_id = ?command.user_id(),
                    "persistence degraded: queue full, durable update dropped"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("persistence writer stopped; durable update dropped");
            }
        }
    }
}

impl std::fmt::Debug for PersistenceQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceQueue")
            .field("closed", &self.sender.is_closed())
            .field("free_slots", &self.sender.capacity())
            .finish()
    }
}

async fn run_writer<S: MenuStateStore>(
    store: Arc<S>,
    mut receiver: mpsc::Receiver<PersistCommand>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            PersistCommand::Store { user_id, menu } => {
                if let Err(e) = store.store_menu_state(&user_id, menu.as_tag()).await {
                    tracing::warn!(
                        user_id = %user_id,
                        menu = %menu,
                        error = %e,
                        "persistence degraded: menu state not stored, session continuity limited to process lifetime"
                    );
                }
            }
            PersistCommand::Log {
                user_id,
                event_name,
                payload,
            } => {
                if let Err(e) = store.log_activity(&user_id, &event_name, &payload).await {
                    tracing::debug!(
                        user_id = %user_id,
                        event = %event_name,
                        error = %e,
                        "activity log write failed"
                    );
                }
            }
            PersistCommand::Load { user_id, reply } => {
                let result = store.get_menu_state(&user_id).await;
                let _ = reply.send(result);
            }
            PersistCommand::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }

    tracing::debug!("persistence writer stopped");
}
