//! # CLI Commands
//!
//! One module per command group, each exposing a clap `Subcommand` enum and
//! a `run` function.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Dispatch                                     │
//! │                                                                         │
//! │  stockroom product below-min                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lib.rs::run ── builds Session { db, config, out, json }               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  product::run(ProductCommand::BelowMin, &mut session)                  │
//! │       │                                                                 │
//! │       ├── validate input (stockroom-core)                              │
//! │       ├── call store / engine (stockroom-db)                           │
//! │       └── print text or JSON to session.out                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod category;
pub mod price;
pub mod product;
pub mod report;
pub mod status;
pub mod stock;

use serde::Serialize;
use std::io::Write;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use stockroom_core::{Category, Money, Movement, Product};
use stockroom_db::Database;

/// Everything a command needs: the open database, the loaded config and
/// where to print.
pub struct Session<W: Write> {
    pub db: Database,
    pub config: AppConfig,
    pub out: W,
    /// Print listings as JSON instead of text.
    pub json: bool,
}

impl<W: Write> Session<W> {
    pub fn new(db: Database, config: AppConfig, out: W) -> Self {
        Session {
            db,
            config,
            out,
            json: false,
        }
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub(crate) fn print_json<T: Serialize + ?Sized>(&mut self, value: &T) -> AppResult<()> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }

    pub(crate) fn money(&self, amount: Money) -> String {
        amount.with_symbol(&self.config.report.currency_symbol)
    }

    pub(crate) async fn require_category(&self, id: i64) -> AppResult<Category> {
        self.db
            .categories()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category", id))
    }

    pub(crate) async fn require_product(&self, id: i64) -> AppResult<Product> {
        self.db
            .products()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", id))
    }

    // =========================================================================
    // Text Listings
    // =========================================================================

    pub(crate) fn print_category(&mut self, category: &Category) -> AppResult<()> {
        writeln!(
            self.out,
            "{:>5}  {:<30} {}",
            category.id,
            category.name,
            category.characteristics()
        )?;
        Ok(())
    }

    pub(crate) fn print_product(&mut self, product: &Product) -> AppResult<()> {
        let price = self.money(product.unit_price);
        writeln!(
            self.out,
            "{:>5}  {:<30} {:>12} / {:<8} stock {:>6} (min {}, max {})  [{}]",
            product.id,
            product.name,
            price,
            product.unit,
            product.stock_quantity,
            product.min_quantity,
            product.max_quantity,
            product.category.name
        )?;
        Ok(())
    }

    pub(crate) fn print_movement(&mut self, movement: &Movement) -> AppResult<()> {
        writeln!(
            self.out,
            "{:>5}  {}  {:<7} {:>6}  {}{}",
            movement.id,
            movement.timestamp.format("%Y-%m-%d %H:%M"),
            movement.kind,
            movement.quantity,
            movement.product.name,
            movement
                .note
                .as_deref()
                .map(|note| format!("  ({})", note))
                .unwrap_or_default()
        )?;
        Ok(())
    }
}
