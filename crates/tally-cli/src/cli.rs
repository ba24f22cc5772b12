//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Understand where your money goes
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Expense statistics with optional AI analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Expense data file (JSON array of expense records)
    #[arg(long, default_value = "expenses.json", global = true)]
    pub data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show basic spending statistics (never calls the AI provider)
    Stats {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write a spending analysis (AI when configured, basic stats otherwise)
    ///
    /// Set GEMINI_API_KEY (or AI_BACKEND=openai_compatible with
    /// OPENAI_COMPATIBLE_HOST) to enable AI output.
    Analyze,

    /// Show the six-field insights summary
    Insights {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Recommend monthly category limits from the last 3 months
    Budget {
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<String>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },
}
