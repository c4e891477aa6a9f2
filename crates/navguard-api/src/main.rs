//! Navguard CLI entry point.
//!
//! Binary name: `navguard`
//!
//! Parses CLI arguments, sets up tracing, initializes the database and the
//! navigation engine, then dispatches to the matching command.

mod cli;
mod state;
mod transport;

use clap::Parser;
use navguard_observe::tracing_setup::{init_tracing, shutdown_tracing};
use navguard_types::menu::UserAccess;

use cli::{Cli, Commands, StateAction};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,navguard_core=debug,navguard_infra=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Chat { user, auth, wallet } => {
            let access = UserAccess {
                authenticated: auth,
                has_wallet: wallet,
            };
            cli::chat::run(&state, user, access, cli.quiet).await
        }

        Commands::Menus => cli::menus::list_menus(&state, cli.json),

        Commands::State { action } => match action {
            StateAction::Get { user } => cli::state::get_state(&state, &user, cli.json).await,
            StateAction::Set { user, menu } => {
                cli::state::set_state(&state, &user, &menu, cli.json).await
            }
            StateAction::Reset { user } => cli::state::reset_state(&state, &user, cli.json).await,
        },

        Commands::Activity { user, limit } => {
            cli::activity::list_activity(&state, &user, limit, cli.json).await
        }
    };

    state.db_pool.close().await;
    shutdown_tracing();
    result
}
