//! Callback handler trait and its object-safe wrapper.
//!
//! Same shape as the chat transport port: a native-async trait, a boxed-future
//! mirror with a blanket impl, and a `Box*` wrapper stored in the registry.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use navguard_types::callback::CallbackData;
use navguard_types::error::HandlerError;
use navguard_types::menu::UserAccess;
use navguard_types::user::UserId;

use crate::transport::BoxChatTransport;

/// Everything a handler needs to answer one button press.
#[derive(Debug, Clone)]
pub struct CallbackContext {
    pub user_id: UserId,
    /// Transport-level id of the press, used to acknowledge it.
    pub callback_id: Option<String>,
    pub access: UserAccess,
    pub transport: Arc<BoxChatTransport>,
}

impl CallbackContext {
    pub fn new(user_id: UserId, transport: Arc<BoxChatTransport>) -> Self {
        Self {
            user_id,
            callback_id: None,
            access: UserAccess::default(),
            transport,
        }
    }

    pub fn with_callback_id(mut self, callback_id: impl Into<String>) -> Self {
        self.callback_id = Some(callback_id.into());
        self
    }

    pub fn with_access(mut self, access: UserAccess) -> Self {
        self.access = access;
        self
    }
}

/// A handler bound to a callback prefix.
pub trait CallbackHandler: Send + Sync {
    /// Handle one press. `data` is the decoded remainder after the prefix.
    fn handle(
        &self,
        ctx: &CallbackContext,
        data: CallbackData,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send;
}

type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'a>>;

/// Object-safe version of [`CallbackHandler`].
pub trait CallbackHandlerDyn: Send + Sync {
    fn handle_boxed<'a>(&'a self, ctx: &'a CallbackContext, data: CallbackData)
    -> HandlerFuture<'a>;
}

impl<T: CallbackHandler> CallbackHandlerDyn for T {
    fn handle_boxed<'a>(
        &'a self,
        ctx: &'a CallbackContext,
        data: CallbackData,
    ) -> HandlerFuture<'a> {
        Box::pin(self.handle(ctx, data))
    }
}

/// Type-erased callback handler.
pub struct BoxCallbackHandler {
    inner: Box<dyn CallbackHandlerDyn>,
}

impl BoxCallbackHandler {
    pub fn new<H: CallbackHandler + 'static>(handler: H) -> Self {
        Self {
            inner: Box::new(handler),
        }
    }

    pub async fn handle(&self, ctx: &CallbackContext, data: CallbackData) -> Result<(), HandlerError> {
        self.inner.handle_boxed(ctx, data).await
    }
}

impl std::fmt::Debug for BoxCallbackHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxCallbackHandler").finish_non_exhaustive()
    }
}

/// Adapter turning an async closure into a [`CallbackHandler`].
pub struct FnHandler<F> {
    f: F,
}

/// Wrap a closure `(CallbackContext, CallbackData) -> Future` as a handler.
///
/// The context is passed by value (cloned per press) so the returned future
/// can own it.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(CallbackContext, CallbackData) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    FnHandler { f }
}

impl<F, Fut> CallbackHandler for FnHandler<F>
where
    F: Fn(CallbackContext, CallbackData) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    fn handle(
        &self,
        ctx: &CallbackContext,
        data: CallbackData,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send {
        (self.f)(ctx.clone(), data)
    }
}
