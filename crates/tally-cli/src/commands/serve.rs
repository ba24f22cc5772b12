//! Server command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tally_core::{ExpenseAnalyzer, InMemoryStore};
use tally_server::{ServerConfig, DEFAULT_OWNER};

/// Build the store for `serve`: seeded from the data file when it exists
pub fn open_store(data: &Path) -> Result<InMemoryStore> {
    if !data.exists() {
        return Ok(InMemoryStore::new());
    }
    InMemoryStore::from_json_file(DEFAULT_OWNER, data)
        .with_context(|| format!("Failed to seed expenses from {}", data.display()))
}

pub async fn cmd_serve(
    data: &Path,
    host: &str,
    port: u16,
    cors_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Tally web server...");
    if data.exists() {
        println!("   Data: {} (owner: {})", data.display(), DEFAULT_OWNER);
    } else {
        println!("   Data: empty in-memory store");
    }
    println!("   Listening: http://{}:{}", host, port);

    let store = open_store(data)?;
    let analyzer = ExpenseAnalyzer::from_env();
    if analyzer.provider().is_available() {
        println!("   🤖 AI: {}", analyzer.provider().describe());
    } else {
        println!("   ℹ️  AI: {} (basic statistics only)", analyzer.provider().describe());
        println!("      Set GEMINI_API_KEY to enable AI analysis");
    }
    if !cors_origins.is_empty() {
        println!("   🌐 CORS origins: {}", cors_origins.join(", "));
    }

    let config = ServerConfig {
        allowed_origins: cors_origins,
    };

    tally_server::serve(Arc::new(store), analyzer, host, port, config).await
}
