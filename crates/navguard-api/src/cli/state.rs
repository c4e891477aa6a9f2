//! `navguard state`: inspect or change a user's persisted menu.

use anyhow::{Context, Result};
use console::style;
use navguard_core::repository::MenuStateStore;
use navguard_types::menu::MenuType;
use navguard_types::user::UserId;

use crate::state::AppState;

pub async fn get_state(state: &AppState, user: &str, json: bool) -> Result<()> {
    let user_id = UserId::new(user);
    let menu = state.store.get_menu_state(&user_id).await?;
    let updated_at = state.store.updated_at(&user_id).await?;

    if json {
        let out = serde_json::json!({
            "user_id": user_id,
            "menu": menu,
            "updated_at": updated_at.map(|t| t.to_rfc3339()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    match (menu, updated_at) {
        (Some(menu), Some(at)) => println!(
            "  {} is on {} {}",
            style(user_id.as_str()).cyan(),
            style(menu).bold(),
            style(format!("(since {})", at.format("%Y-%m-%d %H:%M:%S UTC"))).dim()
        ),
        (Some(menu), None) => println!(
            "  {} is on {}",
            style(user_id.as_str()).cyan(),
            style(menu).bold()
        ),
        (None, _) => println!(
            "  {} has no stored menu (starts at {})",
            style(user_id.as_str()).cyan(),
            MenuType::ROOT
        ),
    }
    println!();
    Ok(())
}

pub async fn set_state(state: &AppState, user: &str, menu: &str, json: bool) -> Result<()> {
    let user_id = UserId::new(user);
    let target: MenuType = menu
        .parse()
        .with_context(|| format!("'{menu}' is not a menu (see `navguard menus`)"))?;

    let rendered = state.engine.transition(&user_id, target).await;
    state.engine.sessions().flush().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!();
        println!(
            "  {} {} moved to {}",
            style("✓").green(),
            style(user_id.as_str()).cyan(),
            style(&rendered.title).bold()
        );
        println!();
    }
    Ok(())
}

pub async fn reset_state(state: &AppState, user: &str, json: bool) -> Result<()> {
    let user_id = UserId::new(user);
    let rendered = state.engine.reset(&user_id);
    state.engine.sessions().flush().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!();
        println!(
            "  {} {} reset to {}",
            style("✓").green(),
            style(user_id.as_str()).cyan(),
            style(&rendered.title).bold()
        );
        println!();
    }
    Ok(())
}
