//! `navguard menus`: print the menu table and its validation report.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use navguard_core::dispatch::menu_payload;
use navguard_types::menu::MenuNode;

use crate::state::AppState;

fn access_label(node: &MenuNode) -> &'static str {
    match (node.requires_auth, node.requires_wallet) {
        (false, false) => "public",
        (true, false) => "auth",
        (false, true) => "wallet",
        (true, true) => "auth + wallet",
    }
}

pub fn list_menus(state: &AppState, json: bool) -> Result<()> {
    let registry = state.engine.registry();
    let report = &state.registry_report;

    if json {
        let mut menus = Vec::new();
        for node in registry.nodes() {
            let callback = menu_payload(node.menu_type)?;
            menus.push(serde_json::json!({
                "menu": node.menu_type,
                "title": node.title,
                "parent": node.parent,
                "requires_auth": node.requires_auth,
                "requires_wallet": node.requires_wallet,
                "buttons": node.buttons,
                "callback": callback,
            }));
        }
        let out = serde_json::json!({
            "menus": menus,
            "report": {
                "unreachable": report.unreachable,
                "dangling_labels": report.dangling_labels,
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Menu").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Parent").fg(Color::White),
        Cell::new("Access").fg(Color::White),
        Cell::new("Buttons").fg(Color::White),
    ]);

    for node in registry.nodes() {
        let parent = match node.parent {
            Some(parent) => parent.to_string(),
            None => "(root)".to_string(),
        };
        let access = match access_label(node) {
            "public" => Cell::new("public").fg(Color::Green),
            other => Cell::new(other).fg(Color::Yellow),
        };
        let buttons: usize = node.buttons.iter().map(Vec::len).sum();

        table.add_row(vec![
            Cell::new(node.menu_type).fg(Color::Cyan),
            Cell::new(&node.title),
            Cell::new(parent).fg(Color::DarkGrey),
            access,
            Cell::new(buttons),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    if report.is_clean() {
        println!("  {} every menu is reachable from the root", style("✓").green());
    } else {
        for menu in &report.unreachable {
            println!("  {} unreachable menu: {}", style("✗").red(), style(menu).yellow());
        }
        for label in &report.dangling_labels {
            println!("  {} label without action: {}", style("✗").red(), style(label).yellow());
        }
    }
    println!();

    Ok(())
}
