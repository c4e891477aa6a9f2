//! `navguard activity`: recent navigation activity for a user.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use navguard_types::activity::{ActivityRecord, EVENT_MENU_TRANSITION};
use navguard_types::user::UserId;

use crate::state::AppState;

/// Short human description of an activity payload.
fn details(record: &ActivityRecord) -> String {
    if record.event_name == EVENT_MENU_TRANSITION {
        let from = record.payload["from"].as_str().unwrap_or("?");
        let to = record.payload["to"].as_str().unwrap_or("?");
        return format!("{from} → {to}");
    }
    if record.payload.is_null() {
        return String::new();
    }
    record.payload.to_string()
}

pub async fn list_activity(state: &AppState, user: &str, limit: i64, json: bool) -> Result<()> {
    let user_id = UserId::new(user);
    let records = state.store.recent_activity(&user_id, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!("  No activity recorded for {}.", style(user_id.as_str()).cyan());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("Event").fg(Color::White),
        Cell::new("Details").fg(Color::White),
    ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M:%S")).fg(Color::DarkGrey),
            Cell::new(&record.event_name).fg(Color::Cyan),
            Cell::new(details(record)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} entr{}",
        style(records.len()).bold(),
        if records.len() == 1 { "y" } else { "ies" }
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use navguard_types::activity::{EVENT_SESSION_RESET, transition_payload};
    use navguard_types::menu::MenuType;

    use super::*;

    #[test]
    fn test_details_formats_transitions() {
        let user = UserId::new("u");
        let record = ActivityRecord::new(
            user.clone(),
            EVENT_MENU_TRANSITION,
            transition_payload(&user, MenuType::Main, MenuType::Explore),
        );
        assert_eq!(details(&record), "main → explore");

        let reset = ActivityRecord::new(user, EVENT_SESSION_RESET, serde_json::Value::Null);
        assert_eq!(details(&reset), "");
    }
}
