//! # Product Commands
//!
//! `stockroom product add|list|show|update|delete|below-min|above-max|value|by-category`
//!
//! Stock is never edited here. `update` leaves the on-hand quantity alone;
//! it only moves through `stockroom stock entry|exit`.

use clap::Subcommand;
use std::io::Write;
use tracing::info;

use super::Session;
use crate::error::{AppError, AppResult};
use stockroom_core::validation::{
    validate_price, validate_product_name, validate_thresholds, validate_unit,
};
use stockroom_core::{Money, NewProduct};

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Register a product.
    Add {
        #[arg(long)]
        name: String,
        /// Unit price, e.g. 2.50
        #[arg(long)]
        price: Money,
        /// Unit of measure, e.g. case, kg.
        #[arg(long)]
        unit: String,
        /// Opening stock.
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long, default_value_t = 0)]
        min: i64,
        #[arg(long)]
        max: i64,
        /// Category id.
        #[arg(long)]
        category: i64,
    },

    /// List products by id, or by name with --by-name.
    List {
        #[arg(long)]
        by_name: bool,
    },

    /// Show one product.
    Show { id: i64 },

    /// Change a product's fields. Omitted fields keep their value.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Money>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        min: Option<i64>,
        #[arg(long)]
        max: Option<i64>,
        #[arg(long)]
        category: Option<i64>,
    },

    /// Delete a product.
    Delete { id: i64 },

    /// Products whose stock is below their minimum.
    BelowMin,

    /// Products whose stock is above their maximum.
    AboveMax,

    /// Total value of the stock on hand.
    Value,

    /// Products grouped under their category.
    ByCategory,
}

pub async fn run<W: Write>(command: ProductCommand, session: &mut Session<W>) -> AppResult<()> {
    match command {
        ProductCommand::Add {
            name,
            price,
            unit,
            stock,
            min,
            max,
            category,
        } => {
            let draft = NewProduct {
                name: name.trim().to_string(),
                unit_price: price,
                unit: unit.trim().to_string(),
                stock_quantity: stock,
                min_quantity: min,
                max_quantity: max,
                category_id: category,
            };
            draft.validate()?;
            session.require_category(category).await?;

            let product = session.db.products().create(&draft).await?;
            info!(id = product.id, name = %product.name, "Product created");
            if session.json {
                session.print_json(&product)?;
            } else {
                writeln!(session.out, "Created product {}", product.id)?;
            }
        }

        ProductCommand::List { by_name } => {
            let products = if by_name {
                session.db.products().list_by_name().await?
            } else {
                session.db.products().list_all().await?
            };
            print_products(session, &products)?;
        }

        ProductCommand::Show { id } => {
            let product = session.require_product(id).await?;
            if session.json {
                session.print_json(&product)?;
            } else {
                session.print_product(&product)?;
            }
        }

        ProductCommand::Update {
            id,
            name,
            price,
            unit,
            min,
            max,
            category,
        } => {
            let mut product = session.require_product(id).await?;
            if let Some(name) = name {
                validate_product_name(name.trim())?;
                product.name = name.trim().to_string();
            }
            if let Some(price) = price {
                validate_price(price)?;
                product.unit_price = price;
            }
            if let Some(unit) = unit {
                validate_unit(unit.trim())?;
                product.unit = unit.trim().to_string();
            }
            product.min_quantity = min.unwrap_or(product.min_quantity);
            product.max_quantity = max.unwrap_or(product.max_quantity);
            validate_thresholds(product.min_quantity, product.max_quantity)?;
            if let Some(category_id) = category {
                product.category = session.require_category(category_id).await?;
            }

            if !session.db.products().update(&product).await? {
                return Err(AppError::not_found("Product", id));
            }
            writeln!(session.out, "Updated product {}", id)?;
        }

        ProductCommand::Delete { id } => {
            if !session.db.products().delete(id).await? {
                return Err(AppError::not_found("Product", id));
            }
            writeln!(session.out, "Deleted product {}", id)?;
        }

        ProductCommand::BelowMin => {
            let products = session.db.products().list_below_minimum().await?;
            print_products(session, &products)?;
        }

        ProductCommand::AboveMax => {
            let products = session.db.products().list_above_maximum().await?;
            print_products(session, &products)?;
        }

        ProductCommand::Value => {
            let total = session.db.products().total_stock_value().await?;
            if session.json {
                session.print_json(&serde_json::json!({ "total_stock_value": total.cents() }))?;
            } else {
                let text = session.money(total);
                writeln!(session.out, "Total stock value: {}", text)?;
            }
        }

        ProductCommand::ByCategory => {
            let groups = session.db.products().group_by_category().await?;
            if session.json {
                session.print_json(&groups)?;
            } else {
                for (category, products) in groups.iter() {
                    writeln!(session.out, "{} ({})", category.name, category.characteristics())?;
                    for product in products {
                        session.print_product(product)?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_products<W: Write>(
    session: &mut Session<W>,
    products: &[stockroom_core::Product],
) -> AppResult<()> {
    if session.json {
        return session.print_json(products);
    }
    for product in products {
        session.print_product(product)?;
    }
    Ok(())
}
