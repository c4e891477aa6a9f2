//! Built-in menu table and button-label mapping.

use std::collections::BTreeMap;

use navguard_types::menu::{ButtonAction, MenuNode, MenuType};

/// Every built-in menu node, one per `MenuType` variant.
pub fn default_nodes() -> Vec<MenuNode> {
    vec![
        MenuNode::new(MenuType::Main, "🏠 Main Menu")
            .with_help("Pick a section below. You can always come back here with 🏠 Main Menu.")
            .row(["🔍 Explore", "💼 Portfolio"])
            .row(["👛 Wallet", "🤖 AI Assistant"])
            .row(["⚙️ Settings", "❓ Help"]),
        MenuNode::new(MenuType::Explore, "🔍 Explore")
            .with_parent(MenuType::Main)
            .with_help("Browse liquidity pools, tokens, and what is trending right now.")
            .row(["🏊 Pools", "🪙 Tokens"])
            .row(["📈 Trending"])
            .row(["⬅️ Back"]),
        MenuNode::new(MenuType::Pools, "🏊 Pools")
            .with_parent(MenuType::Explore)
            .with_help("Top pools are ranked by 24h volume. New pools were listed in the last day.")
            .row(["🔥 Top Pools", "🆕 New Pools"])
            .row(["⬅️ Back to Explore"]),
        MenuNode::new(MenuType::Tokens, "🪙 Tokens")
            .with_parent(MenuType::Explore)
            .with_help("Check prices or look up a token by symbol or contract address.")
            .row(["💹 Prices", "🔎 Search Token"])
            .row(["⬅️ Back to Explore"]),
        MenuNode::new(MenuType::Portfolio, "💼 Portfolio")
            .with_parent(MenuType::Main)
            .with_help("Your positions and transaction history.")
            .row(["📊 Overview", "🧾 History"])
            .row(["⬅️ Back"])
            .requires_auth()
            .requires_wallet(),
        MenuNode::new(MenuType::Wallet, "👛 Wallet")
            .with_parent(MenuType::Main)
            .with_help("Create or import a wallet, then check your balance.")
            .row(["➕ Create Wallet", "📥 Import Wallet"])
            .row(["💰 Balance"])
            .row(["⬅️ Back"])
            .requires_auth(),
        MenuNode::new(MenuType::Settings, "⚙️ Settings")
            .with_parent(MenuType::Main)
            .with_help("Language and notification preferences.")
            .row(["🌐 Language", "🔔 Notifications"])
            .row(["⬅️ Back"])
            .requires_auth(),
        MenuNode::new(MenuType::Assistant, "🤖 AI Assistant")
            .with_parent(MenuType::Main)
            .with_help("Ask anything in plain text. Start a new conversation to clear context.")
            .row(["💬 Ask a Question"])
            .row(["🧹 New Conversation"])
            .row(["⬅️ Back"]),
        MenuNode::new(MenuType::Help, "❓ Help")
            .with_parent(MenuType::Main)
            .with_help("Guides and support contacts.")
            .row(["📖 Guide", "📨 Contact Support"])
            .row(["🏠 Main Menu"]),
    ]
}

/// Exact-match label table. Back labels are not listed here; they are
/// recognized by prefix.
pub fn default_labels() -> BTreeMap<String, ButtonAction> {
    let entries = [
        ("🏠 Main Menu", ButtonAction::Menu(MenuType::Main)),
        ("🔍 Explore", ButtonAction::Menu(MenuType::Explore)),
        ("💼 Portfolio", ButtonAction::Menu(MenuType::Portfolio)),
        ("👛 Wallet", ButtonAction::Menu(MenuType::Wallet)),
        ("🤖 AI Assistant", ButtonAction::Menu(MenuType::Assistant)),
        ("⚙️ Settings", ButtonAction::Menu(MenuType::Settings)),
        ("❓ Help", ButtonAction::Menu(MenuType::Help)),
        ("🏊 Pools", ButtonAction::Menu(MenuType::Pools)),
        ("🪙 Tokens", ButtonAction::Menu(MenuType::Tokens)),
        ("📈 Trending", ButtonAction::Command("/trending".to_string())),
        ("🔥 Top Pools", ButtonAction::Command("/pools top".to_string())),
        ("🆕 New Pools", ButtonAction::Command("/pools new".to_string())),
        ("💹 Prices", ButtonAction::Command("/prices".to_string())),
        (
            "🔎 Search Token",
            ButtonAction::Message("Send me a token symbol or contract address.".to_string()),
        ),
        ("📊 Overview", ButtonAction::Command("/portfolio".to_string())),
        ("🧾 History", ButtonAction::Command("/history".to_string())),
        ("➕ Create Wallet", ButtonAction::Command("/wallet create".to_string())),
        ("📥 Import Wallet", ButtonAction::Command("/wallet import".to_string())),
        ("💰 Balance", ButtonAction::Command("/balance".to_string())),
        ("🌐 Language", ButtonAction::Command("/language".to_string())),
        ("🔔 Notifications", ButtonAction::Command("/notifications".to_string())),
        (
            "💬 Ask a Question",
            ButtonAction::Message("Type your question and I'll pass it to the assistant.".to_string()),
        ),
        ("🧹 New Conversation", ButtonAction::Command("/new".to_string())),
        (
            "📖 Guide",
            ButtonAction::Message(
                "Use the buttons to move between sections. ⬅️ goes back one level.".to_string(),
            ),
        ),
        (
            "📨 Contact Support",
            ButtonAction::Message("Write to support and a human will get back to you.".to_string()),
        ),
    ];

    entries
        .into_iter()
        .map(|(label, action)| (label.to_string(), action))
        .collect()
}
