//! Handlers every deployment registers: menu navigation, back, and reset.

use std::sync::Arc;

use navguard_types::callback::{CallbackData, PayloadError, encode_raw};
use navguard_types::error::{HandlerError, NavError};
use navguard_types::menu::{AccessRequirement, MenuType};

use super::handler::{CallbackContext, CallbackHandler};
use super::registry::CallbackRegistryBuilder;
use crate::menu::NavigationEngine;

/// `menu:<tag>` opens the named menu.
pub const MENU_PREFIX: &str = "menu:";
/// `nav:back` opens the parent of the current menu.
pub const BACK_PREFIX: &str = "nav:back";
/// `nav:reset` clears the session and opens the root.
pub const RESET_PREFIX: &str = "nav:reset";

/// Callback payload that opens `menu` through the built-in menu handler.
pub fn menu_payload(menu: MenuType) -> Result<String, PayloadError> {
    encode_raw(MENU_PREFIX, menu.as_tag())
}

/// Polite explanation for a menu the user may not open yet.
pub fn access_denied_text(title: &str, requirement: AccessRequirement) -> String {
    match requirement {
        AccessRequirement::Auth => format!("🔒 Please sign in to open {title}."),
        AccessRequirement::Wallet => format!("👛 Connect a wallet to open {title}."),
    }
}

/// Navigates to the menu named by the payload remainder.
pub struct MenuHandler {
    engine: Arc<NavigationEngine>,
}

impl MenuHandler {
    pub fn new(engine: Arc<NavigationEngine>) -> Self {
        Self { engine }
    }
}

impl CallbackHandler for MenuHandler {
    async fn handle(&self, ctx: &CallbackContext, data: CallbackData) -> Result<(), HandlerError> {
        let tag = match &data {
            CallbackData::Raw(tag) => tag.as_str(),
            _ => "",
        };

        let target = match self.engine.get_menu_by_tag(tag) {
            Ok(node) => node.menu_type,
            Err(e) => {
                tracing::warn!(user_id = %ctx.user_id, error = %e, "menu callback with unknown tag, opening root");
                MenuType::ROOT
            }
        };

        match self
            .engine
            .transition_checked(&ctx.user_id, target, &ctx.access)
            .await
        {
            Ok(rendered) => ctx.transport.send_menu(&ctx.user_id, &rendered).await?,
            Err(NavError::AccessDenied { menu, requirement }) => {
                tracing::info!(user_id = %ctx.user_id, menu = %menu, requirement = %requirement, "menu access denied");
                let title = &self.engine.get_menu(menu).title;
                ctx.transport
                    .send_text(&ctx.user_id, &access_denied_text(title, requirement))
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

/// Opens the parent of the user's current menu.
pub struct BackHandler {
    engine: Arc<NavigationEngine>,
}

impl CallbackHandler for BackHandler {
    async fn handle(&self, ctx: &CallbackContext, _data: CallbackData) -> Result<(), HandlerError> {
        let rendered = self.engine.go_back(&ctx.user_id).await;
        ctx.transport.send_menu(&ctx.user_id, &rendered).await?;
        Ok(())
    }
}

/// Clears the session and opens the root.
pub struct ResetHandler {
    engine: Arc<NavigationEngine>,
}

impl CallbackHandler for ResetHandler {
    async fn handle(&self, ctx: &CallbackContext, _data: CallbackData) -> Result<(), HandlerError> {
        let rendered = self.engine.reset(&ctx.user_id);
        ctx.transport.send_menu(&ctx.user_id, &rendered).await?;
        Ok(())
    }
}

/// Register the navigation handlers. Called once from startup wiring.
pub fn register_default_handlers(
    builder: CallbackRegistryBuilder,
    engine: Arc<NavigationEngine>,
) -> CallbackRegistryBuilder {
    builder
        .register(MENU_PREFIX, MenuHandler::new(Arc::clone(&engine)))
        .register(
            BACK_PREFIX,
            BackHandler {
                engine: Arc::clone(&engine),
            },
        )
        .register(RESET_PREFIX, ResetHandler { engine })
}

#[cfg(test)]
mod tests {
    use navguard_types::config::DispatchConfig;
    use navguard_types::menu::UserAccess;
    use navguard_types::user::UserId;

    use super::*;
    use crate::dispatch::{CallbackRegistry, DispatchOutcome};
    use crate::menu::MenuRegistry;
    use crate::session::SessionStore;
    use crate::testing::{MemoryStore, RecordingTransport, Sent};
    use crate::transport::BoxChatTransport;

    struct Fixture {
        engine: Arc<NavigationEngine>,
        registry: CallbackRegistry,
        transport: RecordingTransport,
        ctx: CallbackContext,
    }

    fn fixture(access: UserAccess) -> Fixture {
        let (menus, _) = MenuRegistry::builtin().unwrap();
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        let engine = Arc::new(NavigationEngine::new(Arc::new(menus), Arc::new(sessions)));
        let registry = register_default_handlers(
            CallbackRegistry::builder(DispatchConfig::default()),
            Arc::clone(&engine),
        )
        .build();
        let transport = RecordingTransport::new();
        let ctx = CallbackContext::new(
            UserId::from(9_i64),
            Arc::new(BoxChatTransport::new(transport.clone())),
        )
        .with_access(access);
        Fixture {
            engine,
            registry,
            transport,
            ctx,
        }
    }

    #[tokio::test]
    async fn test_menu_callback_navigates() {
        let f = fixture(UserAccess::default());
        let outcome = f.registry.dispatch(&f.ctx, "menu:explore").await;

        assert!(outcome.is_handled());
        assert_eq!(f.engine.current(&f.ctx.user_id).await, MenuType::Explore);
        assert_eq!(f.transport.menus()[0].menu_type, MenuType::Explore);
    }

    #[tokio::test]
    async fn test_menu_callback_unknown_tag_falls_back_to_root() {
        let f = fixture(UserAccess::default());
        f.registry.dispatch(&f.ctx, "menu:explore").await;
        f.registry.dispatch(&f.ctx, "menu:casino").await;

        assert_eq!(f.engine.current(&f.ctx.user_id).await, MenuType::Main);
        assert_eq!(f.transport.menus().last().unwrap().menu_type, MenuType::Main);
    }

    #[tokio::test]
    async fn test_menu_callback_denied_sends_explanation() {
        let f = fixture(UserAccess::default());
        let outcome = f.registry.dispatch(&f.ctx, "menu:wallet").await;

        assert!(outcome.is_handled());
        assert_eq!(f.engine.current(&f.ctx.user_id).await, MenuType::Main);
        assert!(f.transport.sent().iter().any(|s| matches!(
            s,
            Sent::Text(_, text) if text.contains("sign in")
        )));
    }

    #[tokio::test]
    async fn test_back_and_reset_callbacks() {
        let f = fixture(UserAccess::full());
        f.registry.dispatch(&f.ctx, "menu:pools").await;

        f.registry.dispatch(&f.ctx, "nav:back").await;
        assert_eq!(f.engine.current(&f.ctx.user_id).await, MenuType::Explore);

        f.registry.dispatch(&f.ctx, "menu:tokens").await;
        f.registry.dispatch(&f.ctx, "nav:reset").await;
        assert_eq!(f.engine.current(&f.ctx.user_id).await, MenuType::Main);
    }

    #[tokio::test]
    async fn test_unregistered_prefix_misses() {
        let f = fixture(UserAccess::default());
        let outcome = f.registry.dispatch(&f.ctx, "trade:buy").await;
        assert!(matches!(outcome, DispatchOutcome::Miss(_)));
        assert!(outcome.error().is_some());
    }

    #[tokio::test]
    async fn test_menu_payload_dispatches_to_menu_handler() {
        let f = fixture(UserAccess::default());
        let payload = menu_payload(MenuType::Help).unwrap();
        assert_eq!(payload, "menu:help");

        f.registry.dispatch(&f.ctx, &payload).await;
        assert_eq!(f.engine.current(&f.ctx.user_id).await, MenuType::Help);
    }

    #[test]
    fn test_access_denied_text() {
        assert!(access_denied_text("👛 Wallet", AccessRequirement::Auth).contains("sign in"));
        assert!(access_denied_text("💼 Portfolio", AccessRequirement::Wallet).contains("wallet"));
    }
}
