//! Command-line interface for podium.

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::scheduler::target_year;
use crate::state::SharedState;

/// Podium - fantasy top-3 predictions for race sessions
#[derive(Parser)]
#[command(name = "podium")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server with the background sync scheduler
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Run a single reconciliation pass and exit
    Sync {
        /// Season to reconcile; defaults to the configured or current year
        #[arg(long)]
        year: Option<i32>,
    },

    /// List stored sessions, newest first
    #[command(alias = "ls")]
    Sessions {
        /// Number of sessions to show
        #[arg(default_value = "20")]
        limit: u64,
    },

    /// Print a session's official top 3
    Standing {
        /// Session id
        session_id: i32,
    },
}

pub async fn cmd_sync(config: Config, year: Option<i32>) -> anyhow::Result<()> {
    let year = target_year(year.or(config.sync.year));
    let state = SharedState::new(config).await?;

    let summary = state.sync.sync_year(year).await;

    println!(
        "Sync for {year}: +{} sessions, +{} drivers, +{} results",
        summary.added_sessions, summary.added_drivers, summary.added_results
    );
    for err in &summary.errors {
        println!("  error: {err}");
    }

    Ok(())
}

pub async fn cmd_sessions(config: Config, limit: u64) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let sessions = state.store.list_recent_sessions(Some(limit)).await?;

    if sessions.is_empty() {
        println!("No sessions stored yet. Run 'podium sync' first.");
        return Ok(());
    }

    for session in sessions {
        println!(
            "{:>10}  {:<12} {:<20} {}",
            session.id,
            session.session_type,
            session.country.unwrap_or_default(),
            session.date_start
        );
    }

    Ok(())
}

pub async fn cmd_standing(config: Config, session_id: i32) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let standing = state.standings.get_standing(session_id).await?;

    if standing.is_empty() {
        println!("No result stored for session {session_id} yet.");
        return Ok(());
    }

    for entry in standing {
        println!(
            "P{}  #{:<3} {}",
            entry.position, entry.driver_number, entry.driver_name
        );
    }

    Ok(())
}
