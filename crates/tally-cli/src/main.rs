//! Tally CLI - Expense statistics with optional AI analysis
//!
//! Usage:
//!   tally --data expenses.json stats      Basic statistics
//!   tally --data expenses.json analyze    Spending analysis (AI or fallback)
//!   tally --data expenses.json insights   Six-field insights summary
//!   tally --data expenses.json budget     Suggested monthly limits
//!   tally serve --port 3000               Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Stats { json } => commands::cmd_stats(&cli.data, json),
        Commands::Analyze => commands::cmd_analyze(&cli.data).await,
        Commands::Insights { json } => commands::cmd_insights(&cli.data, json).await,
        Commands::Budget { today, json } => {
            commands::cmd_budget(&cli.data, today.as_deref(), json)
        }
        Commands::Serve {
            port,
            host,
            cors_origins,
        } => commands::cmd_serve(&cli.data, &host, port, cors_origins).await,
    }
}
