//! Menu graph domain types.
//!
//! `MenuType` is the closed set of navigation targets. `MenuNode` is the
//! immutable description of one point in the hierarchy (title, button grid,
//! help text, parent pointer, access flags). `ButtonAction` is what a button
//! label resolves to.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::NavError;

/// A named point in the navigation hierarchy.
///
/// The set is closed: every variant must have exactly one node in the menu
/// registry. `Main` is the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuType {
    Main,
    Explore,
    Pools,
    Tokens,
    Portfolio,
    Wallet,
    Settings,
    Assistant,
    Help,
}

impl MenuType {
    /// The root of the menu graph.
    pub const ROOT: MenuType = MenuType::Main;

    /// Every variant, in index order.
    pub const ALL: [MenuType; 9] = [
        MenuType::Main,
        MenuType::Explore,
        MenuType::Pools,
        MenuType::Tokens,
        MenuType::Portfolio,
        MenuType::Wallet,
        MenuType::Settings,
        MenuType::Assistant,
        MenuType::Help,
    ];

    /// Dense index of this variant into `ALL`.
    pub fn index(self) -> usize {
        match self {
            MenuType::Main => 0,
            MenuType::Explore => 1,
            MenuType::Pools => 2,
            MenuType::Tokens => 3,
            MenuType::Portfolio => 4,
            MenuType::Wallet => 5,
            MenuType::Settings => 6,
            MenuType::Assistant => 7,
            MenuType::Help => 8,
        }
    }

    /// Canonical string tag, as stored in the durable store and embedded in
    /// callback payloads.
    pub fn as_tag(self) -> &'static str {
        match self {
            MenuType::Main => "main",
            MenuType::Explore => "explore",
            MenuType::Pools => "pools",
            MenuType::Tokens => "tokens",
            MenuType::Portfolio => "portfolio",
            MenuType::Wallet => "wallet",
            MenuType::Settings => "settings",
            MenuType::Assistant => "assistant",
            MenuType::Help => "help",
        }
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl Default for MenuType {
    fn default() -> Self {
        Self::ROOT
    }
}

impl fmt::Display for MenuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for MenuType {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        MenuType::ALL
            .into_iter()
            .find(|m| m.as_tag() == normalized)
            .ok_or_else(|| NavError::UnknownMenu(s.to_string()))
    }
}

/// Immutable description of a single menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub menu_type: MenuType,
    pub title: String,
    /// Rows of button labels, top to bottom.
    pub buttons: Vec<Vec<String>>,
    pub help_text: String,
    /// `None` only for the root.
    pub parent: Option<MenuType>,
    pub requires_auth: bool,
    pub requires_wallet: bool,
}

impl MenuNode {
    /// Start a node with no buttons, no parent, and no access requirements.
    pub fn new(menu_type: MenuType, title: impl Into<String>) -> Self {
        Self {
            menu_type,
            title: title.into(),
            buttons: Vec::new(),
            help_text: String::new(),
            parent: None,
            requires_auth: false,
            requires_wallet: false,
        }
    }

    pub fn with_parent(mut self, parent: MenuType) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help_text = help.into();
        self
    }

    /// Append a row of buttons.
    pub fn row<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buttons.push(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn requires_wallet(mut self) -> Self {
        self.requires_wallet = true;
        self
    }

    /// All button labels in grid order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buttons.iter().flatten().map(String::as_str)
    }

    /// Check this node's access flags against what the user has.
    pub fn check_access(&self, access: &UserAccess) -> Result<(), NavError> {
        if self.requires_auth && !access.authenticated {
            return Err(NavError::AccessDenied {
                menu: self.menu_type,
                requirement: AccessRequirement::Auth,
            });
        }
        if self.requires_wallet && !access.has_wallet {
            return Err(NavError::AccessDenied {
                menu: self.menu_type,
                requirement: AccessRequirement::Wallet,
            });
        }
        Ok(())
    }

    /// Render payload for this node.
    pub fn render(&self) -> RenderedMenu {
        RenderedMenu {
            menu_type: self.menu_type,
            title: self.title.clone(),
            help_text: self.help_text.clone(),
            buttons: self.buttons.clone(),
        }
    }
}

/// What a button label resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ButtonAction {
    /// Navigate to a menu.
    Menu(MenuType),
    /// Echo a command string back to the transport (e.g. `/portfolio`).
    Command(String),
    /// Send a literal message.
    Message(String),
    /// Navigate to the current menu's parent.
    Back,
}

/// What the transport needs to show a menu: title, help text, button grid.
///
/// Inline vs persistent keyboards are a transport concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMenu {
    pub menu_type: MenuType,
    pub title: String,
    pub help_text: String,
    pub buttons: Vec<Vec<String>>,
}

/// Which access flag blocked a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessRequirement {
    Auth,
    Wallet,
}

impl fmt::Display for AccessRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessRequirement::Auth => write!(f, "auth"),
            AccessRequirement::Wallet => write!(f, "wallet"),
        }
    }
}

/// Capabilities the transport knows about a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccess {
    pub authenticated: bool,
    pub has_wallet: bool,
}

impl UserAccess {
    /// A fully provisioned user.
    pub fn full() -> Self {
        Self {
            authenticated: true,
            has_wallet: true,
        }
    }
}
