//! # Price Commands
//!
//! `stockroom price adjust-all|adjust|set`
//!
//! ```text
//! adjust-all --percent 10     every product, one UPDATE
//! adjust --id 3 --percent -5  one product
//! set --id 3 --price 4.99     one product, exact value
//! ```
//!
//! New prices are `round(price × (1 + p/100))` in cents, half away from zero.

use clap::Subcommand;
use std::io::Write;
use tracing::info;

use super::Session;
use crate::error::{AppError, AppResult};
use stockroom_core::validation::{validate_percent, validate_price};
use stockroom_core::Money;

#[derive(Debug, Subcommand)]
pub enum PriceCommand {
    /// Raise or lower every price by a percentage.
    AdjustAll {
        /// e.g. 10 for +10%, -5 for -5%.
        #[arg(long, allow_negative_numbers = true)]
        percent: f64,
    },

    /// Raise or lower one product's price by a percentage.
    Adjust {
        #[arg(long)]
        id: i64,
        #[arg(long, allow_negative_numbers = true)]
        percent: f64,
    },

    /// Set one product's price.
    Set {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        price: Money,
    },
}

pub async fn run<W: Write>(command: PriceCommand, session: &mut Session<W>) -> AppResult<()> {
    match command {
        PriceCommand::AdjustAll { percent } => {
            validate_percent(percent)?;
            let updated = session
                .db
                .products()
                .adjust_price_all_by_percent(percent)
                .await?;
            info!(percent, updated, "Prices adjusted");
            writeln!(session.out, "Adjusted {} product price(s) by {}%", updated, percent)?;
        }

        PriceCommand::Adjust { id, percent } => {
            validate_percent(percent)?;
            let product = session.require_product(id).await?;
            let updated = session
                .db
                .products()
                .adjust_price_one_by_percent(id, percent)
                .await?;
            if updated == 0 {
                return Err(AppError::not_found("Product", id));
            }
            let new_price = session.money(product.price_adjusted_by_percent(percent));
            writeln!(session.out, "{}: {}", product.name, new_price)?;
        }

        PriceCommand::Set { id, price } => {
            validate_price(price)?;
            let updated = session
                .db
                .products()
                .adjust_price_one_direct(id, price)
                .await?;
            if updated == 0 {
                return Err(AppError::not_found("Product", id));
            }
            let text = session.money(price);
            writeln!(session.out, "Product {} now costs {}", id, text)?;
        }
    }

    Ok(())
}
