//! # stockroom
//!
//! Inventory control from the command line.
//!
//! ```bash
//! stockroom category add --name Beverages --size Medium --packaging Glass
//! stockroom product add --name Soda --price 2.50 --unit case --max 50 --category 1
//! stockroom stock entry --product 1 --quantity 20
//! stockroom stock exit --product 1 --quantity 5 --note "promo"
//! stockroom price adjust-all --percent 10
//! stockroom report balance --out balance.txt
//! ```
//!
//! Logs go to stderr (`RUST_LOG` to change the level); command output goes
//! to stdout.

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use stockroom_cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match stockroom_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
