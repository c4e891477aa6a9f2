//! In-memory doubles for the durable store and chat transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use navguard_types::error::{RepositoryError, TransportError};
use navguard_types::menu::RenderedMenu;
use navguard_types::user::UserId;
use tokio::sync::Semaphore;

use crate::repository::MenuStateStore;
use crate::transport::ChatTransport;

/// Durable store backed by a HashMap. `set_failing(true)` makes every call
/// return a connection error.
#[derive(Clone, Default)]
pub struct MemoryStore {
    states: Arc<Mutex<HashMap<UserId, String>>>,
    activity: Arc<Mutex<Vec<(UserId, String, serde_json::Value)>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn seed(&self, user_id: &UserId, tag: &str) {
        self.states
            .lock()
            .unwrap()
            .insert(user_id.clone(), tag.to_string());
    }

    pub fn stored(&self, user_id: &UserId) -> Option<String> {
        self.states.lock().unwrap().get(user_id).cloned()
    }

    pub fn events(&self) -> Vec<(UserId, String, serde_json::Value)> {
        self.activity.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }
}

impl MenuStateStore for MemoryStore {
    async fn store_menu_state(&self, user_id: &UserId, menu_tag: &str) -> Result<(), RepositoryError> {
        self.check()?;
        self.seed(user_id, menu_tag);
        Ok(())
    }

    async fn get_menu_state(&self, user_id: &UserId) -> Result<Option<String>, RepositoryError> {
        self.check()?;
        Ok(self.stored(user_id))
    }

    async fn log_activity(
        &self,
        user_id: &UserId,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        self.activity
            .lock()
            .unwrap()
            .push((user_id.clone(), event_name.to_string(), payload.clone()));
        Ok(())
    }
}

/// Wraps a [`MemoryStore`] with a read delay and a write gate.
///
/// Reads sleep for `load_delay`. While the gate is closed, menu-state writes
/// wait for [`SlowStore::open_gate`].
#[derive(Clone)]
pub struct SlowStore {
    inner: MemoryStore,
    load_delay: Duration,
    gate: Arc<Semaphore>,
    writes: Arc<AtomicUsize>,
}

impl SlowStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            load_delay: Duration::ZERO,
            gate: Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub fn with_closed_gate(mut self) -> Self {
        self.gate = Arc::new(Semaphore::new(0));
        self
    }

    pub fn open_gate(&self) {
        self.gate.add_permits(1024);
    }

    /// Menu-state writes applied so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl MenuStateStore for SlowStore {
    async fn store_menu_state(&self, user_id: &UserId, menu_tag: &str) -> Result<(), RepositoryError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| RepositoryError::Connection)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.store_menu_state(user_id, menu_tag).await
    }

    async fn get_menu_state(&self, user_id: &UserId) -> Result<Option<String>, RepositoryError> {
        tokio::time::sleep(self.load_delay).await;
        self.inner.get_menu_state(user_id).await
    }

    async fn log_activity(
        &self,
        user_id: &UserId,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        self.inner.log_activity(user_id, event_name, payload).await
    }
}

/// Something the recording transport was asked to deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(UserId, String),
    Menu(UserId, RenderedMenu),
    Ack(UserId, Option<String>),
}

/// Transport that records every call.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn acks(&self) -> Vec<Option<String>> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Ack(_, notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    pub fn menus(&self) -> Vec<RenderedMenu> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Menu(_, menu) => Some(menu),
                _ => None,
            })
            .collect()
    }
}

impl ChatTransport for RecordingTransport {
    async fn send_text(&self, user_id: &UserId, text: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Text(user_id.clone(), text.to_string()));
        Ok(())
    }

    async fn send_menu(&self, user_id: &UserId, menu: &RenderedMenu) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Menu(user_id.clone(), menu.clone()));
        Ok(())
    }

    async fn acknowledge(
        &self,
        user_id: &UserId,
        _callback_id: Option<&str>,
        notice: Option<&str>,
    ) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Ack(user_id.clone(), notice.map(str::to_string)));
        Ok(())
    }
}
