//! Navigation engine.
//!
//! Turns "go to menu X" into a render payload and a session-state update.
//! Every transition also queues an audit record (`from`, `to`, `user_id`) on
//! the durable activity log; that write is fire-and-forget and never blocks
//! or fails the transition.

use std::sync::Arc;

use navguard_types::activity::{EVENT_MENU_TRANSITION, transition_payload};
use navguard_types::error::NavError;
use navguard_types::menu::{ButtonAction, MenuNode, MenuType, RenderedMenu, UserAccess};
use navguard_types::user::UserId;

use super::registry::MenuRegistry;
use crate::session::SessionStore;

/// Moves users between menus.
#[derive(Debug)]
pub struct NavigationEngine {
    registry: Arc<MenuRegistry>,
    sessions: Arc<SessionStore>,
}

impl NavigationEngine {
    pub fn new(registry: Arc<MenuRegistry>, sessions: Arc<SessionStore>) -> Self {
        Self { registry, sessions }
    }

    pub fn registry(&self) -> &MenuRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn get_menu(&self, menu: MenuType) -> &MenuNode {
        self.registry.get(menu)
    }

    /// Defensive lookup for tags that arrive from outside (payloads, rows).
    pub fn get_menu_by_tag(&self, tag: &str) -> Result<&MenuNode, NavError> {
        self.registry.get_by_tag(tag)
    }

    pub fn resolve_back(&self, menu: MenuType) -> &MenuNode {
        self.registry.resolve_back(menu)
    }

    pub fn resolve_label(&self, label: &str) -> Option<ButtonAction> {
        self.registry.resolve_label(label)
    }

    /// The user's current menu.
    pub async fn current(&self, user_id: &UserId) -> MenuType {
        self.sessions.get(user_id).await
    }

    /// Move a user to `target` and return what to show them.
    pub async fn transition(&self, user_id: &UserId, target: MenuType) -> RenderedMenu {
        let from = self.sessions.get(user_id).await;
        let node = self.registry.get(target);

        self.sessions.set(user_id, target);
        self.sessions.log_activity(
            user_id,
            EVENT_MENU_TRANSITION,
            transition_payload(user_id, from, target),
        );

        tracing::debug!(user_id = %user_id, from = %from, to = %target, "menu transition");
        node.render()
    }

    /// Like [`transition`](Self::transition), after checking the target's
    /// access flags. A denied transition leaves the session untouched.
    pub async fn transition_checked(
        &self,
        user_id: &UserId,
        target: MenuType,
        access: &UserAccess,
    ) -> Result<RenderedMenu, NavError> {
        self.registry.get(target).check_access(access)?;
        Ok(self.transition(user_id, target).await)
    }

    /// Transition to a menu named by an external string tag.
    pub async fn transition_to_tag(
        &self,
        user_id: &UserId,
        tag: &str,
        access: &UserAccess,
    ) -> Result<RenderedMenu, NavError> {
        let target = self.registry.get_by_tag(tag)?.menu_type;
        self.transition_checked(user_id, target, access).await
    }

    /// Move the user to the parent of their current menu.
    ///
    /// At the root this is a no-op acknowledgment: the root is re-rendered,
    /// the session is unchanged, and no audit record is written.
    pub async fn go_back(&self, user_id: &UserId) -> RenderedMenu {
        let current = self.sessions.get(user_id).await;
        if current.is_root() {
            tracing::debug!(user_id = %user_id, "back pressed at root, ignoring");
            return self.registry.root().render();
        }
        let parent = self.registry.resolve_back(current).menu_type;
        self.transition(user_id, parent).await
    }

    /// Start over: clear the session and show the root.
    pub fn reset(&self, user_id: &UserId) -> RenderedMenu {
        self.sessions.reset(user_id);
        tracing::info!(user_id = %user_id, "session reset to root");
        self.registry.root().render()
    }
}
