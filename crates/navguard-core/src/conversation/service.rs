//! Conversation front door.
//!
//! Sequences every inbound event: per-user lane, abuse guard, label
//! resolution or callback dispatch, navigation, and the outbound reply.
//! Outbound text goes through duplicate suppression.

use std::sync::Arc;

use navguard_types::error::{NavError, TransportError};
use navguard_types::menu::{AccessRequirement, ButtonAction, MenuType, RenderedMenu, UserAccess};
use navguard_types::user::UserId;

use super::lanes::UserLanes;
use crate::dispatch::builtin::access_denied_text;
use crate::dispatch::{CallbackContext, CallbackRegistry, DispatchOutcome};
use crate::guard::{AbuseGuard, SweepStats};
use crate::menu::NavigationEngine;
use crate::transport::BoxChatTransport;

/// Why an inbound event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// The same free text was repeated too often.
    Loop,
    /// The same button was pressed again too quickly.
    RateLimited,
}

/// What happened in response to an inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A menu was shown.
    Menu(RenderedMenu),
    /// A command label was pressed; the caller runs the command.
    Command(String),
    /// A literal message was sent.
    Message(String),
    /// Text that is not a button label; the caller forwards it (e.g. to the
    /// assistant).
    FreeText(String),
    /// The target menu needs a capability the user lacks.
    AccessDenied {
        menu: MenuType,
        requirement: AccessRequirement,
    },
    Suppressed(Suppression),
}

/// What happened to a button press.
#[derive(Debug)]
pub enum CallbackOutcome {
    Dispatched(DispatchOutcome),
    RateLimited,
}

/// Glue between the chat transport and the engine.
pub struct ConversationService {
    engine: Arc<NavigationEngine>,
    callbacks: Arc<CallbackRegistry>,
    guard: Arc<AbuseGuard>,
    transport: Arc<BoxChatTransport>,
    lanes: UserLanes,
}

impl ConversationService {
    pub fn new(
        engine: Arc<NavigationEngine>,
        callbacks: Arc<CallbackRegistry>,
        guard: Arc<AbuseGuard>,
        transport: Arc<BoxChatTransport>,
    ) -> Self {
        Self {
            engine,
            callbacks,
            guard,
            transport,
            lanes: UserLanes::new(),
        }
    }

    pub fn engine(&self) -> &NavigationEngine {
        &self.engine
    }

    pub fn guard(&self) -> &AbuseGuard {
        &self.guard
    }

    /// Handle a text message, which is either a keyboard button label or free
    /// text.
    ///
    /// Button labels are rate limited per label; free text is checked for
    /// loops. Menus and messages are delivered before returning.
    pub async fn handle_text(&self, user_id: &UserId, text: &str, access: &UserAccess) -> Reply {
        let _lane = self.lanes.acquire(user_id).await;

        let reply = match self.engine.resolve_label(text) {
            Some(action) => {
                if self.guard.observe_press(user_id, text) {
                    return Reply::Suppressed(Suppression::RateLimited);
                }
                self.apply(user_id, action, access).await
            }
            None => {
                if self.guard.observe_message(user_id, text) {
                    return Reply::Suppressed(Suppression::Loop);
                }
                Reply::FreeText(text.to_string())
            }
        };

        self.deliver(user_id, &reply).await;
        reply
    }

    /// Handle a button press carrying a callback payload.
    pub async fn handle_callback(
        &self,
        user_id: &UserId,
        callback_id: Option<&str>,
        payload: &str,
        access: &UserAccess,
    ) -> CallbackOutcome {
        let _lane = self.lanes.acquire(user_id).await;

        if self.guard.observe_press(user_id, payload) {
            if let Err(e) = self
                .transport
                .acknowledge(user_id, callback_id, None)
                .await
            {
                tracing::warn!(user_id = %user_id, error = %e, "failed to acknowledge rate-limited press");
            }
            return CallbackOutcome::RateLimited;
        }

        let mut ctx = CallbackContext::new(user_id.clone(), Arc::clone(&self.transport))
            .with_access(*access);
        if let Some(id) = callback_id {
            ctx = ctx.with_callback_id(id);
        }
        CallbackOutcome::Dispatched(self.callbacks.dispatch(&ctx, payload).await)
    }

    /// Send text unless the same text went to this user moments ago.
    ///
    /// Returns `Ok(false)` when the message was suppressed.
    pub async fn send_text(&self, user_id: &UserId, text: &str) -> Result<bool, TransportError> {
        if !self.guard.admit_outbound(user_id, text) {
            return Ok(false);
        }
        self.transport.send_text(user_id, text).await?;
        Ok(true)
    }

    /// Periodic maintenance: expire guard entries and drop idle lanes.
    pub fn sweep(&self) -> SweepStats {
        let stats = self.guard.sweep();
        let lanes = self.lanes.prune();
        if lanes > 0 {
            tracing::debug!(lanes, "idle user lanes dropped");
        }
        stats
    }

    async fn apply(&self, user_id: &UserId, action: ButtonAction, access: &UserAccess) -> Reply {
        match action {
            ButtonAction::Menu(target) => {
                match self.engine.transition_checked(user_id, target, access).await {
                    Ok(rendered) => Reply::Menu(rendered),
                    Err(NavError::AccessDenied { menu, requirement }) => {
                        Reply::AccessDenied { menu, requirement }
                    }
                    Err(e) => {
                        tracing::warn!(user_id = %user_id, error = %e, "label resolved to an unusable menu");
                        Reply::Menu(self.engine.reset(user_id))
                    }
                }
            }
            ButtonAction::Back => Reply::Menu(self.engine.go_back(user_id).await),
            ButtonAction::Command(command) => Reply::Command(command),
            ButtonAction::Message(message) => Reply::Message(message),
        }
    }

    async fn deliver(&self, user_id: &UserId, reply: &Reply) {
        let result = match reply {
            Reply::Menu(menu) => self.transport.send_menu(user_id, menu).await,
            Reply::Message(text) => self.send_text(user_id, text).await.map(|_| ()),
            Reply::AccessDenied { menu, requirement } => {
                let title = &self.engine.get_menu(*menu).title;
                self.send_text(user_id, &access_denied_text(title, *requirement))
                    .await
                    .map(|_| ())
            }
            Reply::Command(_) | Reply::FreeText(_) | Reply::Suppressed(_) => Ok(()),
        };
        if let Err(e) = result {
            tracing::warn!(user_id = %user_id, error = %e, "failed to deliver reply");
        }
    }
}

impl std::fmt::Debug for ConversationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationService")
            .field("callbacks", &self.callbacks)
            .field("guard", &self.guard)
            .field("lanes", &self.lanes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use navguard_types::config::DispatchConfig;

    use super::*;
    use crate::dispatch::register_default_handlers;
    use crate::menu::MenuRegistry;
    use crate::session::SessionStore;
    use crate::testing::{MemoryStore, RecordingTransport, Sent};

    fn service() -> (ConversationService, RecordingTransport) {
        let (menus, _) = MenuRegistry::builtin().unwrap();
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let engine = Arc::new(NavigationEngine::new(Arc::new(menus), Arc::new(sessions)));
        let callbacks = register_default_handlers(
            CallbackRegistry::builder(DispatchConfig::default()),
            Arc::clone(&engine),
        )
        .build();
        let recording = RecordingTransport::new();
        let service = ConversationService::new(
            engine,
            Arc::new(callbacks),
            Arc::new(AbuseGuard::default()),
            Arc::new(BoxChatTransport::new(recording.clone())),
        );
        (service, recording)
    }

    fn user() -> UserId {
        UserId::from(42_i64)
    }

    #[tokio::test]
    async fn test_explore_and_back_to_root() {
        let (service, transport) = service();
        let access = UserAccess::default();

        let reply = service.handle_text(&user(), "🔍 Explore", &access).await;
        let Reply::Menu(menu) = reply else {
            panic!("expected a menu, got {reply:?}");
        };
        assert_eq!(menu.menu_type, MenuType::Explore);
        assert_eq!(service.engine().current(&user()).await, MenuType::Explore);

        let reply = service.handle_text(&user(), "⬅️ Back", &access).await;
        assert!(matches!(reply, Reply::Menu(ref m) if m.menu_type == MenuType::Main));
        assert_eq!(service.engine().current(&user()).await, MenuType::Main);

        let shown: Vec<_> = transport.menus().iter().map(|m| m.menu_type).collect();
        assert_eq!(shown, vec![MenuType::Explore, MenuType::Main]);
    }

    #[tokio::test]
    async fn test_free_text_loop_is_suppressed() {
        let (service, _) = service();
        let access = UserAccess::default();

        for _ in 0..2 {
            let reply = service.handle_text(&user(), "wen moon", &access).await;
            assert_eq!(reply, Reply::FreeText("wen moon".to_string()));
        }
        let reply = service.handle_text(&user(), "wen moon", &access).await;
        assert_eq!(reply, Reply::Suppressed(Suppression::Loop));
    }

    #[tokio::test]
    async fn test_button_mashing_is_rate_limited() {
        let (service, transport) = service();
        let access = UserAccess::default();

        service.handle_text(&user(), "❓ Help", &access).await;
        let reply = service.handle_text(&user(), "❓ Help", &access).await;

        assert_eq!(reply, Reply::Suppressed(Suppression::RateLimited));
        assert_eq!(transport.menus().len(), 1);
    }

    #[tokio::test]
    async fn test_command_and_message_labels() {
        let (service, transport) = service();
        let access = UserAccess::default();

        let reply = service.handle_text(&user(), "📈 Trending", &access).await;
        assert_eq!(reply, Reply::Command("/trending".to_string()));

        let reply = service.handle_text(&user(), "📖 Guide", &access).await;
        let Reply::Message(text) = reply else {
            panic!("expected a message, got {reply:?}");
        };
        assert!(
            transport
                .sent()
                .iter()
                .any(|s| matches!(s, Sent::Text(_, t) if *t == text))
        );
    }

    #[tokio::test]
    async fn test_access_denied_label() {
        let (service, transport) = service();
        let reply = service
            .handle_text(&user(), "💼 Portfolio", &UserAccess::default())
            .await;

        assert_eq!(
            reply,
            Reply::AccessDenied {
                menu: MenuType::Portfolio,
                requirement: AccessRequirement::Auth,
            }
        );
        assert_eq!(service.engine().current(&user()).await, MenuType::Main);
        assert!(transport.menus().is_empty());
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_callback_routes_through_dispatch() {
        let (service, transport) = service();
        let outcome = service
            .handle_callback(&user(), Some("cb-1"), "menu:help", &UserAccess::default())
            .await;

        assert!(matches!(outcome, CallbackOutcome::Dispatched(ref o) if o.is_handled()));
        assert_eq!(transport.menus()[0].menu_type, MenuType::Help);
    }

    #[tokio::test]
    async fn test_repeated_callback_is_rate_limited() {
        let (service, transport) = service();
        let access = UserAccess::default();

        service.handle_callback(&user(), None, "menu:help", &access).await;
        let outcome = service.handle_callback(&user(), None, "menu:help", &access).await;

        assert!(matches!(outcome, CallbackOutcome::RateLimited));
        assert_eq!(transport.menus().len(), 1);
        // Both presses were acknowledged
        assert_eq!(transport.acks().len(), 2);
    }

    #[tokio::test]
    async fn test_outbound_duplicates_suppressed() {
        let (service, transport) = service();

        assert!(service.send_text(&user(), "SOL: $150").await.unwrap());
        assert!(!service.send_text(&user(), "SOL: $150").await.unwrap());
        assert!(service.send_text(&user(), "SOL: $151").await.unwrap());
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_sweep_drops_idle_lanes() {
        let (service, _) = service();
        service
            .handle_text(&user(), "hello", &UserAccess::default())
            .await;

        service.sweep();
        assert_eq!(service.lanes.len(), 0);
    }
}
