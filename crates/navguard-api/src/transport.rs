//! Console chat transport: prints what the engine says to the terminal.

use console::style;
use navguard_core::transport::ChatTransport;
use navguard_types::error::TransportError;
use navguard_types::menu::RenderedMenu;
use navguard_types::user::UserId;

/// Writes messages and menus to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }
}

/// Plain-text rendering of a menu: title, help text, one line per button row.
pub fn render_menu(menu: &RenderedMenu) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {}\n", style(&menu.title).bold().cyan()));
    if !menu.help_text.is_empty() {
        out.push_str(&format!("  {}\n", style(&menu.help_text).dim()));
    }
    for row in &menu.buttons {
        let cells: Vec<String> = row.iter().map(|label| format!("[ {label} ]")).collect();
        out.push_str(&format!("  {}\n", cells.join("  ")));
    }
    out
}

impl ChatTransport for ConsoleTransport {
    async fn send_text(&self, _user_id: &UserId, text: &str) -> Result<(), TransportError> {
        println!();
        println!("  {}", text);
        Ok(())
    }

    async fn send_menu(&self, _user_id: &UserId, menu: &RenderedMenu) -> Result<(), TransportError> {
        println!();
        print!("{}", render_menu(menu));
        Ok(())
    }

    async fn acknowledge(
        &self,
        _user_id: &UserId,
        _callback_id: Option<&str>,
        notice: Option<&str>,
    ) -> Result<(), TransportError> {
        if let Some(notice) = notice {
            println!("  {} {}", style("!").yellow().bold(), style(notice).yellow());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use navguard_types::menu::MenuType;

    use super::*;

    #[test]
    fn test_render_menu_lists_every_row() {
        console::set_colors_enabled(false);
        let menu = RenderedMenu {
            menu_type: MenuType::Explore,
            title: "🔍 Explore".to_string(),
            help_text: "Browse pools and tokens.".to_string(),
            buttons: vec![
                vec!["🏊 Pools".to_string(), "🪙 Tokens".to_string()],
                vec!["⬅️ Back".to_string()],
            ],
        };

        let out = render_menu(&menu);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("🔍 Explore"));
        assert!(lines[2].contains("[ 🏊 Pools ]  [ 🪙 Tokens ]"));
        assert!(lines[3].contains("[ ⬅️ Back ]"));
    }
}
