//! CLI administration tool for seq-shortener.
//!
//! Provides commands for inspecting and expiring shortened URLs and for
//! database diagnostics without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Show one shortened URL
//! cargo run --bin admin -- show ExAAAAAAB
//!
//! # Expire a shortened URL now
//! cargo run --bin admin -- expire ExAAAAAAB
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `BASE_URL` / `PUBLIC_HOSTNAME` / `PUBLIC_PORT`: used to print short URLs
//! - `REDIS_URL` or `REDIS_*`, `QUEUE_KEY_PREFIX`: when set, `expire` also
//!   removes the pending expiry from the Redis queue

use seq_shortener::config::Config;
use seq_shortener::domain::repositories::UrlRepository;
use seq_shortener::infrastructure::persistence::PgUrlRepository;
use seq_shortener::infrastructure::queue::RedisJobQueue;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing seq-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show statistics
    Stats,

    /// Show a shortened URL
    Show {
        /// Shortcut code (case-sensitive)
        code: String,
    },

    /// Remove a shortened URL now and release its identifier
    ///
    /// The pending expiry is removed from the Redis queue when Redis is
    /// configured. A server running the in-memory queue keeps its timer,
    /// which later finds the record gone (or removes a newer record that
    /// reused the code).
    Expire {
        /// Shortcut code (case-sensitive)
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url().context("Database is not configured")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let repo = PgUrlRepository::new(Arc::new(pool.clone()));

    match cli.command {
        Commands::Stats => handle_stats(&repo).await?,
        Commands::Show { code } => show_record(&repo, &code).await?,
        Commands::Expire { code, yes } => expire_record(&repo, &code, yes).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn short_url(code: &str) -> String {
    let listen = std::env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    format!("{}/go/{}", Config::load_public_base_url(&listen), code)
}

/// Displays system statistics.
///
/// Shows:
/// - Number of stored URLs
/// - Total number of counted redirects
/// - Current value of the sequence counter
async fn handle_stats(repo: &PgUrlRepository) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let records = repo
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count records: {}", e))?;
    let redirects = repo
        .total_redirects()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to sum redirects: {}", e))?;
    let identifier = repo
        .current_identifier()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read sequence counter: {}", e))?;

    println!(
        "  URLs:               {}",
        records.to_string().bright_green().bold()
    );
    println!(
        "  Redirects:          {}",
        redirects.to_string().bright_green().bold()
    );
    println!(
        "  Current identifier: {}",
        identifier.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

async fn show_record(repo: &PgUrlRepository, code: &str) -> Result<()> {
    let record = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Shortened URL not found")?;

    println!("{}", "🔗 Shortened URL".bright_blue().bold());
    println!();
    println!("  Code:      {}", record.shortcut_code.cyan());
    println!("  Short URL: {}", short_url(&record.shortcut_code).bright_yellow());
    println!("  Full URL:  {}", record.full_url.bright_white());
    println!("  Partition: {}", record.partition_key.bright_black());
    println!(
        "  Redirects: {}",
        record.redirect_count.to_string().bright_green()
    );
    println!(
        "  Created:   {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

/// Expires a shortened URL immediately, with confirmation prompt.
///
/// Same effect as the scheduled expiry: the record is deleted and the
/// sequence counter is decremented.
async fn expire_record(repo: &PgUrlRepository, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Expire Shortened URL".bright_blue().bold());
    println!();

    let record = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Shortened URL not found")?;

    println!("  Code:     {}", record.shortcut_code.cyan());
    println!("  Full URL: {}", record.full_url.bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Expire this URL now?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let removed = repo
        .remove_and_release(&record.shortcut_code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to expire URL: {}", e))?;

    println!();
    if removed {
        println!("{}", "✅ URL expired".green().bold());
    } else {
        println!("{}", "⚠️  URL was already gone".yellow());
    }

    if let Some(redis_url) = Config::load_redis_url() {
        let prefix =
            std::env::var("QUEUE_KEY_PREFIX").unwrap_or_else(|_| "shortener:".to_string());
        let queue = RedisJobQueue::connect(&redis_url, &prefix)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?;

        let cancelled = queue
            .cancel_expiry(&record.shortcut_code)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to cancel scheduled expiry: {}", e))?;

        if cancelled {
            println!("{}", "✅ Scheduled expiry cancelled".green());
        } else {
            println!("{}", "ℹ️  No scheduled expiry in Redis".bright_black());
        }
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
                    .fetch_one(pool)
                    .await
                    .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
