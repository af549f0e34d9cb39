//! # Stockroom CLI Library
//!
//! Argument definitions and dispatch for the `stockroom` binary.
//!
//! ## Module Organization
//! ```text
//! stockroom_cli/
//! ├── lib.rs          ◄─── You are here (Cli, run)
//! ├── config.rs       ◄─── AppConfig: defaults < stockroom.toml < env
//! ├── error.rs        ◄─── AppError and exit codes
//! └── commands/
//!     ├── mod.rs      ◄─── Session shared by every command
//!     ├── category.rs ◄─── category add|list|show|update|delete|counts
//!     ├── product.rs  ◄─── product add|list|show|update|delete|...
//!     ├── price.rs    ◄─── price adjust-all|adjust|set
//!     ├── stock.rs    ◄─── stock entry|exit|history
//!     ├── report.rs   ◄─── report prices|balance|...
//!     └── status.rs   ◄─── status
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Load AppConfig (--config or platform dir, then STOCKROOM_* env)    │
//! │  2. Apply --db override                                                │
//! │  3. Open the SQLite pool, run pending migrations                       │
//! │  4. Run the command against a Session writing to stdout                │
//! │  5. Close the pool                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use commands::{
    category::CategoryCommand, price::PriceCommand, product::ProductCommand,
    report::ReportArgs, stock::StockCommand, Session,
};
use config::AppConfig;
use error::AppResult;
use stockroom_db::Database;

/// Stockroom: categories, products, stock movements and reports for a
/// small warehouse, kept in a local SQLite file.
#[derive(Debug, Parser)]
#[command(name = "stockroom", version, about)]
pub struct Cli {
    /// Path to a TOML configuration file.
    ///
    /// Defaults to `stockroom.toml` in the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file; overrides the configured path.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print listings as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage categories.
    Category {
        #[command(subcommand)]
        action: CategoryCommand,
    },

    /// Manage products and query their stock levels.
    Product {
        #[command(subcommand)]
        action: ProductCommand,
    },

    /// Change product prices.
    Price {
        #[command(subcommand)]
        action: PriceCommand,
    },

    /// Record entries and exits, show movement history.
    Stock {
        #[command(subcommand)]
        action: StockCommand,
    },

    /// Print or save a text report.
    Report(ReportArgs),

    /// Show database location, migration state and record counts.
    Status,
}

/// Loads configuration, opens the database and runs the command.
pub async fn run(cli: Cli) -> AppResult<()> {
    let mut config = AppConfig::load(cli.config)?;
    if let Some(path) = cli.db {
        config.database.path = path;
    }

    if let Some(parent) = config
        .database
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    debug!(path = %config.database.path.display(), "Opening database");

    let db = Database::new(config.db_config()).await?;
    let mut session = Session::new(db.clone(), config, std::io::stdout()).json(cli.json);

    let result = dispatch(cli.command, &mut session).await;
    db.close().await;
    result
}

/// Runs one command against an open session.
pub async fn dispatch<W: std::io::Write>(
    command: Command,
    session: &mut Session<W>,
) -> AppResult<()> {
    match command {
        Command::Category { action } => commands::category::run(action, session).await,
        Command::Product { action } => commands::product::run(action, session).await,
        Command::Price { action } => commands::price::run(action, session).await,
        Command::Stock { action } => commands::stock::run(action, session).await,
        Command::Report(args) => commands::report::run(args, session).await,
        Command::Status => commands::status::run(session).await,
    }
}
