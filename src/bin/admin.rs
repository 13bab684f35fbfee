//! CLI administration tool for shortlink-engine.
//!
//! Manages links directly against PostgreSQL, without going through the
//! HTTP API. Link creation runs through the same allocator as the server, so
//! codes are validated and deduplicated identically.
//!
//! # Usage
//!
//! ```bash
//! # List links, oldest first
//! cargo run --bin admin -- links list --offset 0 --count 20
//!
//! # Create a link with a generated or custom code
//! cargo run --bin admin -- links create https://example.com/docs
//! cargo run --bin admin -- links create https://example.com/docs --code docs
//!
//! # Show one link and its access count
//! cargo run --bin admin -- links show docs
//!
//! # Delete a link by id
//! cargo run --bin admin -- links delete 42
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Read through the same [`shortlink_engine::config::Config`] as the server:
//! `DATABASE_URL` (or the `DB_*` components) is required, and `APP_ENV` /
//! `STRICT_TARGET_VALIDATION` decide whether private targets are accepted.

use shortlink_engine::application::services::{AllocationPolicy, LinkService};
use shortlink_engine::config::{self, StorageBackend};
use shortlink_engine::domain::access_worker::access_channel;
use shortlink_engine::domain::entities::Link;
use shortlink_engine::domain::repositories::LinkStore;
use shortlink_engine::infrastructure::persistence::PgLinkStore;
use shortlink_engine::server::connect_pool;
use shortlink_engine::utils::code_generator::RandomCodeGenerator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink-engine.
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
    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinkAction,
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
    /// List links in creation order
    List {
        #[arg(long, default_value_t = 0)]
        offset: u64,

        #[arg(long, default_value_t = 10)]
        count: u32,
    },

    /// Create a new link
    Create {
        /// Target address (http or https)
        target: String,

        /// Custom code (generated if not provided)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Show a link without counting an access
    Show { code: String },

    /// Delete a link by id
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Failed to load configuration")?;
    if config.storage_backend != StorageBackend::Postgres {
        anyhow::bail!("The admin tool only works with the postgres storage backend");
    }
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;

    let pool = connect_pool(&config, database_url).await?;
    let service = link_service(&pool, config.allocation_policy());

    match cli.command {
        Commands::Links { action } => handle_link_action(action, &service).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Builds a service over the database. Nothing here resolves codes, so the
/// access queue is never fed.
fn link_service(pool: &PgPool, policy: AllocationPolicy) -> LinkService {
    let (recorder, _) = access_channel(1);
    LinkService::new(
        Arc::new(PgLinkStore::new(Arc::new(pool.clone()))),
        Arc::new(RandomCodeGenerator::new()),
        recorder,
        policy,
    )
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, service: &LinkService) -> Result<()> {
    match action {
        LinkAction::List { offset, count } => list_links(service, offset, count).await,
        LinkAction::Create { target, code } => {
            create_link(service, &target, code.as_deref()).await
        }
        LinkAction::Show { code } => show_link(service, &code).await,
        LinkAction::Delete { id, yes } => delete_link(service, id, yes).await,
    }
}

async fn list_links(service: &LinkService, offset: u64, count: u32) -> Result<()> {
    println!("{}", "Links".bright_blue().bold());
    println!();

    let page = service
        .list_links(offset, count)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if page.links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<6} {:<20} {:<10} {:<18} {}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Accesses".bright_white().bold(),
        "Created".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "-".repeat(90).bright_black());

    for link in &page.links {
        println!(
            "  {:<6} {:<20} {:<10} {:<18} {}",
            link.id.to_string().bright_black(),
            link.code.cyan(),
            link.access_count,
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.target
        );
    }

    println!();
    println!(
        "  Showing {} of {}",
        page.links.len().to_string().bright_white().bold(),
        page.total.to_string().bright_white().bold()
    );

    Ok(())
}

async fn create_link(service: &LinkService, target: &str, code: Option<&str>) -> Result<()> {
    let link = service
        .create_link(target, code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "Link created".green().bold());
    print_link(&link);

    Ok(())
}

async fn show_link(service: &LinkService, code: &str) -> Result<()> {
    let link = service
        .get_link(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    print_link(&link);
    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(service: &LinkService, id: i64, skip_confirm: bool) -> Result<()> {
    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete link {id}? Its code becomes reusable"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "Link deleted".green().bold());
    Ok(())
}

fn print_link(link: &Link) {
    println!();
    println!("  ID:       {}", link.id.to_string().bright_black());
    println!("  Code:     {}", link.code.cyan().bold());
    println!("  Target:   {}", link.target);
    println!("  Accesses: {}", link.access_count.to_string().bright_white());
    println!("  Created:  {}", link.created_at.to_rfc3339());
    println!("  Updated:  {}", link.updated_at.to_rfc3339());
    println!();
}

/// Dispatches database operation commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            print!("Checking database connection... ");

            PgLinkStore::new(Arc::new(pool.clone()))
                .ping()
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await
                .context("Links table is missing; start the server once to run migrations")?;

            println!("{}", "OK".green().bold());
            println!("  Links stored: {}", links.to_string().bright_white().bold());
        }
    }

    Ok(())
}
