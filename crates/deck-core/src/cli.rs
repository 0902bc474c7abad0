use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::task::Priority;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "deck",
    version,
    about = "Deck: personal task dashboard in the terminal",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(long = "deckrc")]
    pub deckrc: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: DeckCommand,
}

fn priority_parser() -> clap::builder::ValueParser {
    clap::builder::ValueParser::new(|s: &str| s.parse::<Priority>())
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeckCommand {
    /// Add a task
    Add {
        title: String,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Time of day, free-form
        #[arg(long, default_value = "")]
        time: String,

        #[arg(long, default_value = "default")]
        category: String,

        #[arg(long, default_value = "medium", value_parser = priority_parser())]
        priority: Priority,
    },

    /// Edit fields of an existing task
    Edit {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long, value_parser = priority_parser())]
        priority: Option<Priority>,
    },

    /// Show one task
    Show { id: u64 },

    /// Toggle a task between pending and completed
    Done { id: u64 },

    /// Set a task's completion percent (0-100)
    Percent { id: u64, value: String },

    /// Delete a task (no error if the id is unknown)
    Delete { id: u64 },

    /// List all tasks
    List,

    /// Dashboard summary: counts, due today, overall completion
    Summary,

    /// Category / priority / status breakdowns
    Breakdown,

    /// Tasks per weekday
    Week,

    /// Tasks grouped by date
    Calendar,

    /// Dump the task collection as JSON
    Export,

    /// Show or set the color theme (dark / light)
    Theme { value: Option<String> },

    /// Store a local account
    Signup {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Start a session for the stored account
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// End the session and forget the stored account
    Logout,

    /// Show the stored account
    Whoami,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
