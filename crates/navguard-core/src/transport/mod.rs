//! Chat transport port.
//!
//! The transport delivers what the core decides to say. Rendering mechanics
//! (inline buttons vs persistent keyboards) belong to the implementation.
//!
//! Follows the blanket-impl pattern used for other RPITIT ports:
//! 1. `ChatTransport` uses native async fns
//! 2. `ChatTransportDyn` is the object-safe mirror with boxed futures
//! 3. `BoxChatTransport` wraps `Box<dyn ChatTransportDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use navguard_types::error::TransportError;
use navguard_types::menu::RenderedMenu;
use navguard_types::user::UserId;

/// Outbound side of a chat platform.
pub trait ChatTransport: Send + Sync {
    /// Send a plain text message.
    fn send_text(
        &self,
        user_id: &UserId,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Show a menu (title, help text, button grid).
    fn send_menu(
        &self,
        user_id: &UserId,
        menu: &RenderedMenu,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Acknowledge a button press, optionally with a short notice.
    fn acknowledge(
        &self,
        user_id: &UserId,
        callback_id: Option<&str>,
        notice: Option<&str>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

/// Object-safe version of [`ChatTransport`] with boxed futures.
pub trait ChatTransportDyn: Send + Sync {
    fn send_text_boxed<'a>(&'a self, user_id: &'a UserId, text: &'a str) -> TransportFuture<'a>;

    fn send_menu_boxed<'a>(
        &'a self,
        user_id: &'a UserId,
        menu: &'a RenderedMenu,
    ) -> TransportFuture<'a>;

    fn acknowledge_boxed<'a>(
        &'a self,
        user_id: &'a UserId,
        callback_id: Option<&'a str>,
        notice: Option<&'a str>,
    ) -> TransportFuture<'a>;
}

impl<T: ChatTransport> ChatTransportDyn for T {
    fn send_text_boxed<'a>(&'a self, user_id: &'a UserId, text: &'a str) -> TransportFuture<'a> {
        Box::pin(self.send_text(user_id, text))
    }

    fn send_menu_boxed<'a>(
        &'a self,
        user_id: &'a UserId,
        menu: &'a RenderedMenu,
    ) -> TransportFuture<'a> {
        Box::pin(self.send_menu(user_id, menu))
    }

    fn acknowledge_boxed<'a>(
        &'a self,
        user_id: &'a UserId,
        callback_id: Option<&'a str>,
        notice: Option<&'a str>,
    ) -> TransportFuture<'a> {
        Box::pin(self.acknowledge(user_id, callback_id, notice))
    }
}

/// Type-erased chat transport, shared between the dispatch boundary and
/// handlers.
pub struct BoxChatTransport {
    inner: Box<dyn ChatTransportDyn>,
}

impl BoxChatTransport {
    pub fn new<T: ChatTransport + 'static>(transport: T) -> Self {
        Self {
            inner: Box::new(transport),
        }
    }

    pub async fn send_text(&self, user_id: &UserId, text: &str) -> Result<(), TransportError> {
        self.inner.send_text_boxed(user_id, text).await
    }

    pub async fn send_menu(
        &self,
        user_id: &UserId,
        menu: &RenderedMenu,
    ) -> Result<(), TransportError> {
        self.inner.send_menu_boxed(user_id, menu).await
    }

    pub async fn acknowledge(
        &self,
        user_id: &UserId,
        callback_id: Option<&str>,
        notice: Option<&str>,
    ) -> Result<(), TransportError> {
        self.inner
            .acknowledge_boxed(user_id, callback_id, notice)
            .await
    }
}

impl std::fmt::Debug for BoxChatTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxChatTransport").finish_non_exhaustive()
    }
}
