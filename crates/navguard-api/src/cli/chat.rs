//! Interactive console chat.
//!
//! Reads stdin line by line and feeds each line through the conversation
//! front door, with the console transport printing replies. A background
//! task sweeps the abuse guard on the configured interval until the session
//! ends.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use console::style;
use navguard_core::conversation::{CallbackOutcome, ConversationService, Reply, Suppression};
use navguard_core::transport::BoxChatTransport;
use navguard_types::menu::UserAccess;
use navguard_types::user::UserId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;
use crate::transport::ConsoleTransport;

/// Shortest sweep period the loop accepts.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Quit,
    Callback(&'a str),
    Text(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if line == "/quit" || line == "/exit" {
        return Input::Quit;
    }
    if let Some(payload) = line.strip_prefix("/cb ") {
        return Input::Callback(payload.trim());
    }
    Input::Text(line)
}

/// Run the chat loop until EOF, `/quit`, or Ctrl+C.
pub async fn run(state: &AppState, user: String, access: UserAccess, quiet: bool) -> Result<()> {
    let user_id = UserId::new(user);
    let transport = Arc::new(BoxChatTransport::new(ConsoleTransport::new()));
    let service = Arc::new(state.conversation(Arc::clone(&transport)));

    let cancel = CancellationToken::new();
    let sweeper = spawn_sweeper(
        Arc::clone(&service),
        state.config.sweep.interval(),
        cancel.clone(),
    );

    if !quiet {
        println!();
        println!(
            "  {} Chatting as {}. Type a button label, {} to press an inline button, {} to leave.",
            style("💬").bold(),
            style(user_id.as_str()).cyan(),
            style("/cb <payload>").yellow(),
            style("/quit").yellow()
        );
    }

    let current = service.engine().current(&user_id).await;
    let menu = service.engine().get_menu(current).render();
    transport.send_menu(&user_id, &menu).await?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut presses: u64 = 0;

    loop {
        let line = tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Callback(payload) => {
                presses += 1;
                let callback_id = format!("console-{presses}");
                let outcome = service
                    .handle_callback(&user_id, Some(&callback_id), payload, &access)
                    .await;
                if let CallbackOutcome::RateLimited = outcome {
                    note("slow down: that button was just pressed");
                }
            }
            Input::Text(text) => {
                let reply = service.handle_text(&user_id, text, &access).await;
                describe(&reply);
            }
        }
    }

    cancel.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "sweep task ended abnormally");
    }
    service.engine().sessions().flush().await;

    if !quiet {
        println!();
        println!("  Bye.");
    }
    Ok(())
}

/// Print what the caller is expected to do with replies the engine does not
/// deliver itself.
fn describe(reply: &Reply) {
    match reply {
        Reply::Command(command) => note(&format!("command: {command}")),
        Reply::FreeText(_) => note("free text, would be forwarded to the assistant"),
        Reply::Suppressed(Suppression::Loop) => note("repeated message ignored"),
        Reply::Suppressed(Suppression::RateLimited) => {
            note("slow down: that button was just pressed")
        }
        Reply::Menu(_) | Reply::Message(_) | Reply::AccessDenied { .. } => {}
    }
}

fn note(text: &str) {
    println!("  {}", style(text).dim());
}

/// Run `service.sweep()` every `period` until `cancel` fires.
fn spawn_sweeper(
    service: Arc<ConversationService>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let period = period.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let stats = service.sweep();
                    tracing::debug!(
                        removed = stats.total(),
                        users_dropped = stats.users_dropped,
                        "periodic sweep"
                    );
                }
            }
        }
        tracing::debug!("sweep task stopped");
    })
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/exit"), Input::Quit);
        assert_eq!(parse_input("/cb menu:pools"), Input::Callback("menu:pools"));
        assert_eq!(parse_input("  🔍 Explore "), Input::Text("🔍 Explore"));
        assert_eq!(parse_input("/trending"), Input::Text("/trending"));
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_cancel() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::init_at(tmp.path().to_path_buf()).await.unwrap();
        let transport = Arc::new(BoxChatTransport::new(ConsoleTransport::new()));
        let service = Arc::new(state.conversation(transport));

        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(service, Duration::from_millis(10), cancel.clone());
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
