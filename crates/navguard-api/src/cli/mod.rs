//! CLI command definitions for the `navguard` binary.

pub mod activity;
pub mod chat;
pub mod menus;
pub mod state;

use clap::{Parser, Subcommand};

/// Menu navigation and abuse-guard engine for chat assistants.
#[derive(Parser)]
#[command(name = "navguard", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Talk to the menu engine from the terminal.
    ///
    /// Plain lines are sent as text (button labels or free text);
    /// `/cb <payload>` simulates an inline button press; `/quit` exits.
    Chat {
        /// User id to chat as.
        #[arg(long, default_value = "console")]
        user: String,

        /// Treat the user as signed in.
        #[arg(long)]
        auth: bool,

        /// Treat the user as having a wallet.
        #[arg(long)]
        wallet: bool,
    },

    /// Print the menu table and its validation report.
    Menus,

    /// Inspect or change a user's persisted menu.
    State {
        #[command(subcommand)]
        action: StateAction,
    },

    /// Show a user's recent navigation activity.
    Activity {
        /// User id.
        user: String,

        /// Maximum number of entries.
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum StateAction {
    /// Show the persisted menu for a user.
    Get { user: String },

    /// Move a user to a menu (by tag, e.g. `explore`).
    Set { user: String, menu: String },

    /// Send a user back to the main menu.
    Reset { user: String },
}
