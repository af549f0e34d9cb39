//! # Stock Commands
//!
//! `stockroom stock entry|exit|history`
//!
//! ## Exit Pre-Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stock exit --product 1 --quantity 25                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  quantity > on hand? ── yes, no --force ──► refuse (InsufficientStock) │
//! │       │ no (or --force)                                                 │
//! │       ▼                                                                 │
//! │  ends below minimum? ── yes ──► print warning, continue                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  movement engine: insert + stock delta in one transaction              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine itself never refuses an exit; negative stock is representable.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Subcommand};
use std::io::Write;
use tracing::{info, warn};

use super::Session;
use crate::error::AppResult;
use stockroom_core::validation::validate_exit_quantity;
use stockroom_core::{CoreError, MovementKind, NewMovement};

/// Options shared by `entry` and `exit`.
#[derive(Debug, Args)]
pub struct MovementArgs {
    /// Product id.
    #[arg(long)]
    pub product: i64,

    #[arg(long)]
    pub quantity: i64,

    #[arg(long)]
    pub note: Option<String>,

    /// When it happened: RFC 3339, or `YYYY-MM-DD HH:MM` in local time.
    /// Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    /// Record goods received.
    Entry(MovementArgs),

    /// Record goods shipped.
    Exit {
        #[command(flatten)]
        movement: MovementArgs,

        /// Record the exit even when it exceeds the stock on hand.
        #[arg(long)]
        force: bool,
    },

    /// Movement history, newest first.
    History {
        #[arg(long, conflicts_with = "kind")]
        product: Option<i64>,

        /// entry or exit
        #[arg(long)]
        kind: Option<MovementKind>,
    },
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .map_err(|_| format!("expected RFC 3339 or 'YYYY-MM-DD HH:MM', got '{}'", value))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", value))
}

fn draft(kind: MovementKind, args: MovementArgs) -> NewMovement {
    NewMovement {
        product_id: args.product,
        kind,
        quantity: args.quantity,
        timestamp: args.at,
        note: args.note.filter(|note| !note.trim().is_empty()),
    }
}

pub async fn run<W: Write>(command: StockCommand, session: &mut Session<W>) -> AppResult<()> {
    match command {
        StockCommand::Entry(args) => {
            let movement = draft(MovementKind::Entry, args);
            movement.validate()?;
            let product = session.require_product(movement.product_id).await?;

            if movement.results_in_above_maximum(&product) {
                warn!(product_id = product.id, "Entry leaves stock above maximum");
                writeln!(
                    session.out,
                    "warning: {} will have {} on hand, above the maximum of {}",
                    product.name,
                    movement.resulting_stock(&product),
                    product.max_quantity
                )?;
            }

            record(session, &movement).await?;
        }

        StockCommand::Exit { movement, force } => {
            let movement = draft(MovementKind::Exit, movement);
            movement.validate()?;
            let product = session.require_product(movement.product_id).await?;

            if !force {
                validate_exit_quantity(movement.quantity, product.stock_quantity).map_err(
                    |_| CoreError::InsufficientStock {
                        product_id: product.id,
                        available: product.stock_quantity,
                        requested: movement.quantity,
                    },
                )?;
            }

            if movement.results_in_below_minimum(&product) {
                warn!(product_id = product.id, "Exit leaves stock below minimum");
                writeln!(
                    session.out,
                    "warning: {} will have {} on hand, below the minimum of {}",
                    product.name,
                    movement.resulting_stock(&product),
                    product.min_quantity
                )?;
            }

            record(session, &movement).await?;
        }

        StockCommand::History { product, kind } => {
            let movements = match (product, kind) {
                (Some(product_id), _) => {
                    session.require_product(product_id).await?;
                    session.db.movements().list_by_product(product_id).await?
                }
                (None, Some(kind)) => session.db.movements().list_by_kind(kind).await?,
                (None, None) => session.db.movements().list_all().await?,
            };

            if session.json {
                session.print_json(&movements)?;
            } else {
                for movement in &movements {
                    session.print_movement(movement)?;
                }
            }
        }
    }

    Ok(())
}

async fn record<W: Write>(session: &mut Session<W>, movement: &NewMovement) -> AppResult<()> {
    let recorded = session.db.movements().apply(movement).await?;
    info!(
        movement_id = recorded.id,
        product_id = recorded.product.id,
        kind = %recorded.kind,
        quantity = recorded.quantity,
        "Movement recorded"
    );

    if session.json {
        session.print_json(&recorded)?;
    } else {
        writeln!(
            session.out,
            "Recorded {} #{}: {} {} {}, stock now {}",
            recorded.kind,
            recorded.id,
            recorded.quantity,
            recorded.product.unit,
            recorded.product.name,
            recorded.product.stock_quantity
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{seed_soda, session, take_output};
    use crate::error::AppError;

    fn args(product: i64, quantity: i64) -> MovementArgs {
        MovementArgs {
            product,
            quantity,
            note: None,
            at: None,
        }
    }

    #[test]
    fn test_parse_timestamp() {
        let at = parse_timestamp("2026-03-14T12:00:00Z").unwrap();
        assert_eq!(at.to_rfc3339(), "2026-03-14T12:00:00+00:00");

        let at = parse_timestamp("2026-03-14T09:00:00-03:00").unwrap();
        assert_eq!(at.to_rfc3339(), "2026-03-14T12:00:00+00:00");

        assert!(parse_timestamp("2026-03-14 09:00").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_entry_increases_stock() {
        let mut session = session().await;
        let soda = seed_soda(&session).await;

        run(StockCommand::Entry(args(soda.id, 5)), &mut session)
            .await
            .unwrap();

        assert_eq!(
            take_output(&mut session),
            "Recorded Entrada #1: 5 case Soda, stock now 25\n"
        );
    }

    #[tokio::test]
    async fn test_entry_above_maximum_warns() {
        let mut session = session().await;
        let soda = seed_soda(&session).await;

        run(StockCommand::Entry(args(soda.id, 40)), &mut session)
            .await
            .unwrap();

        let text = take_output(&mut session);
        assert!(text.starts_with("warning: Soda will have 60 on hand, above the maximum of 50"));
        assert!(text.ends_with("stock now 60\n"));
    }

    #[tokio::test]
    async fn test_exit_below_minimum_warns_and_records() {
        let mut session = session().await;
        let soda = seed_soda(&session).await;

        let command = StockCommand::Exit {
            movement: args(soda.id, 11),
            force: false,
        };
        run(command, &mut session).await.unwrap();

        let text = take_output(&mut session);
        assert!(text.starts_with("warning: Soda will have 9 on hand, below the minimum of 10"));
        assert_eq!(session.require_product(soda.id).await.unwrap().stock_quantity, 9);
    }

    #[tokio::test]
    async fn test_exit_beyond_stock_refused_without_force() {
        let mut session = session().await;
        let soda = seed_soda(&session).await;

        let command = StockCommand::Exit {
            movement: args(soda.id, 25),
            force: false,
        };
        let err = run(command, &mut session).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Core(CoreError::InsufficientStock {
                available: 20,
                requested: 25,
                ..
            })
        ));
        assert_eq!(session.db.movements().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_forced_exit_goes_negative() {
        let mut session = session().await;
        let soda = seed_soda(&session).await;

        let command = StockCommand::Exit {
            movement: args(soda.id, 25),
            force: true,
        };
        run(command, &mut session).await.unwrap();

        assert_eq!(session.require_product(soda.id).await.unwrap().stock_quantity, -5);
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let mut session = session().await;
        let soda = seed_soda(&session).await;

        let err = run(StockCommand::Entry(args(soda.id, 0)), &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let mut session = session().await;

        let err = run(StockCommand::Entry(args(7, 1)), &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "Product", id: 7 }));
    }

    #[tokio::test]
    async fn test_history_filters() {
        let mut session = session().await;
        let soda = seed_soda(&session).await;
        run(StockCommand::Entry(args(soda.id, 5)), &mut session).await.unwrap();
        let exit = StockCommand::Exit {
            movement: MovementArgs {
                note: Some("promo".to_string()),
                ..args(soda.id, 3)
            },
            force: false,
        };
        run(exit, &mut session).await.unwrap();
        take_output(&mut session);

        run(
            StockCommand::History {
                product: None,
                kind: Some(MovementKind::Exit),
            },
            &mut session,
        )
        .await
        .unwrap();
        let text = take_output(&mut session);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("Saída"));
        assert!(text.ends_with("Soda  (promo)\n"));

        run(
            StockCommand::History {
                product: Some(soda.id),
                kind: None,
            },
            &mut session,
        )
        .await
        .unwrap();
        assert_eq!(take_output(&mut session).lines().count(), 2);
    }
}
