//! CLI administration tool for link-shortener.
//!
//! Provides commands for managing links, viewing statistics, flushing cached
//! listings and performing database checks without going through the HTTP
//! API. Writes go through the same services as the server, so the cache
//! stays consistent.
//!
//! # Usage
//!
//! ```bash
//! # Create a link (code generated unless --code is given)
//! cargo run --bin admin -- link create https://example.com --code promo2026
//!
//! # List links matching a search term
//! cargo run --bin admin -- link list --search example --limit 20
//!
//! # Delete a link
//! cargo run --bin admin -- link delete promo2026
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Invalidate every cached listing
//! cargo run --bin admin -- cache flush-lists
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`link_shortener::config`].

use link_shortener::config::{self, Config};
use link_shortener::domain::entities::{LinkFilter, LinkQuery};
use link_shortener::server::{connect_cache, connect_pool};
use link_shortener::state::{AppState, ServiceSettings};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-shortener.
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
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a new short link
    Create {
        /// Target URL (http or https)
        url: String,

        /// Custom short code, 6-8 alphanumeric characters
        #[arg(short, long)]
        code: Option<String>,
    },

    /// List links, newest first
    List {
        /// Case-insensitive substring of the code or URL
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of links to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Delete a link
    Delete {
        /// Short code to delete
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Cache maintenance subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Invalidate every cached listing page
    FlushLists,
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

    let config = config::load_from_env().context("Invalid configuration")?;
    let pool = connect_pool(&config).await?;

    let result = match cli.command {
        Commands::Db { action } => handle_db_action(action, &pool).await,
        Commands::Link { action } => {
            handle_link_action(action, &build_state(&config, &pool).await).await
        }
        Commands::Stats => handle_stats(&build_state(&config, &pool).await).await,
        Commands::Cache { action } => {
            handle_cache_action(action, &build_state(&config, &pool).await).await
        }
    };

    pool.close().await;
    result
}

async fn build_state(config: &Config, pool: &PgPool) -> AppState {
    let cache = connect_cache(config).await;
    AppState::new(
        Arc::new(pool.clone()),
        cache,
        ServiceSettings::from_config(config),
    )
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, state: &AppState) -> Result<()> {
    match action {
        LinkAction::Create { url, code } => create_link(state, url, code).await,
        LinkAction::List { search, limit } => list_links(state, search, limit).await,
        LinkAction::Delete { code, yes } => delete_link(state, code, yes).await,
    }
}

async fn create_link(state: &AppState, url: String, code: Option<String>) -> Result<()> {
    println!("{}", "🔗 Create Link".bright_blue().bold());
    println!();

    let link = state
        .link_service
        .create_link(&url, code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created successfully!".green().bold());
    println!();
    println!("  Code:      {}", link.short_code.bright_yellow().bold());
    println!("  Short URL: {}", link.short_url(&state.base_url).cyan());
    println!("  Target:    {}", link.long_url.bright_white());
    println!();

    Ok(())
}

/// Lists links with click counts.
///
/// # Output Format
///
/// ```text
/// 📋 Links
///
///   Code      Clicks  Created           Target
///   ──────────────────────────────────────────────────────────────────
///   aB3xY9    12      2026-01-15 10:30  https://example.com/a/b/c
/// ```
async fn list_links(state: &AppState, search: Option<String>, limit: u32) -> Result<()> {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let query = LinkQuery::new(LinkFilter {
        search,
        ..Default::default()
    })
    .with_page(1, limit.clamp(1, LinkQuery::MAX_LIMIT));

    let page = state
        .link_service
        .list_links(&query)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if page.links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<9} {:<7} {:<17} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &page.links {
        println!(
            "  {:<9} {:<7} {:<17} {}",
            link.short_code.cyan(),
            link.total_clicks.to_string().bright_green(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.long_url
        );
    }

    println!();
    println!(
        "  Showing {} of {}",
        page.links.len().to_string().bright_white().bold(),
        page.total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(state: &AppState, code: String, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let link = state
        .link_service
        .get_link(&code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  Code:   {}", link.short_code.cyan());
    println!("  Target: {}", link.long_url.bright_white());
    println!("  Clicks: {}", link.total_clicks.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    state
        .link_service
        .delete_link(&code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted successfully!".green().bold());
    println!();

    Ok(())
}

/// Displays link and click totals, read from the store.
async fn handle_stats(state: &AppState) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let summary = state
        .link_service
        .summary()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!(
        "  Links:  {}",
        summary.total_links.to_string().bright_green().bold()
    );
    println!(
        "  Clicks: {}",
        summary.total_clicks.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

async fn handle_cache_action(action: CacheAction, state: &AppState) -> Result<()> {
    match action {
        CacheAction::FlushLists => {
            state.link_service.flush_list_cache().await;
            println!("{}", "✅ Cached listings invalidated".green().bold());
        }
    }

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

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Links:      {}", links.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
