//! # Seed Data Generator
//!
//! Populates a database with demo categories, products and movements.
//!
//! ## Usage
//! ```bash
//! # Seed every demo product (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Cap the number of products
//! cargo run -p stockroom-db --bin seed -- --count 10
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! Each product gets a deterministic price, thresholds and starting stock,
//! then one entry and one exit through the movement engine so the history
//! report has something to show. A few products end up below their
//! minimum or above their maximum on purpose.

use clap::Parser;
use std::path::PathBuf;
use stockroom_core::{Category, Money, NewCategory, NewMovement, NewProduct};
use stockroom_db::{Database, DbConfig};

/// Demo categories: (name, size, packaging, products)
const CATEGORIES: &[(&str, &str, &str, &[&str])] = &[
    (
        "Beverages",
        "Medium",
        "Glass",
        &["Soda", "Orange Juice", "Grape Juice", "Iced Tea", "Sparkling Water"],
    ),
    (
        "Canned Goods",
        "Small",
        "Can",
        &["Sweet Corn", "Peas", "Tomato Sauce", "Tuna", "Sardines"],
    ),
    (
        "Cleaning",
        "Large",
        "Plastic",
        &["Detergent", "Bleach", "Fabric Softener", "Glass Cleaner"],
    ),
    (
        "Snacks",
        "Small",
        "Plastic",
        &["Potato Chips", "Pretzels", "Peanuts", "Popcorn"],
    ),
];

/// Units handed out round-robin.
const UNITS: &[&str] = &["case", "un", "box", "pack"];

/// Fills a fresh stockroom database with demo data.
#[derive(Debug, Parser)]
#[command(name = "seed", about)]
struct SeedArgs {
    /// Stop after this many products; every demo product when omitted.
    #[arg(short, long)]
    count: Option<usize>,

    /// SQLite file to create or fill.
    #[arg(short, long, default_value = "./stockroom_dev.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = SeedArgs::parse();
    let count = args.count.unwrap_or(usize::MAX);
    let db_path = args.db;

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path.display());
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await? + db.categories().count().await?;
    if existing > 0 {
        println!("⚠ Database already has data");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating data...");

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut movements = 0;

    'categories: for (name, size, packaging, products) in CATEGORIES {
        let category = db
            .categories()
            .create(&NewCategory::new(*name, *size, *packaging))
            .await?;
        println!("  + {} ({})", category.name, category.characteristics());

        for product_name in products.iter() {
            if generated >= count {
                break 'categories;
            }

            let draft = generate_product(&category, product_name, generated);
            let product = match db.products().create(&draft).await {
                Ok(product) => product,
                Err(e) => {
                    eprintln!("Failed to insert {}: {}", draft.name, e);
                    continue;
                }
            };

            let restock = NewMovement::entry(product.id, 12).with_note("initial restock");
            let sale = NewMovement::exit(product.id, 5 + (generated as i64 % 4) * 3);
            for movement in [restock, sale] {
                db.movements().apply(&movement).await?;
                movements += 1;
            }

            generated += 1;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} products and {} movements in {:?}",
        generated, movements, elapsed
    );

    let below = db.products().list_below_minimum().await?;
    let above = db.products().list_above_maximum().await?;
    let value = db.products().total_stock_value().await?;
    println!("  Below minimum: {}", below.len());
    println!("  Above maximum: {}", above.len());
    println!("  Stock value:   {}", value);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a product draft with deterministic demo values.
fn generate_product(category: &Category, name: &str, seed: usize) -> NewProduct {
    // 1.99 - 9.99
    let price_cents = 199 + ((seed * 170) % 800) as i64;

    let min_quantity = 10 + (seed % 3) as i64 * 5;
    let max_quantity = min_quantity * 4;

    // Every third product starts low, every fifth starts overstocked
    let stock_quantity = if seed % 3 == 2 {
        min_quantity
    } else if seed % 5 == 4 {
        max_quantity
    } else {
        min_quantity * 2
    };

    NewProduct {
        name: name.to_string(),
        unit_price: Money::from_cents(price_cents),
        unit: UNITS[seed % UNITS.len()].to_string(),
        stock_quantity,
        min_quantity,
        max_quantity,
        category_id: category.id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_to_every_product() {
        let args = SeedArgs::try_parse_from(["seed"]).unwrap();
        assert_eq!(args.count, None);
        assert_eq!(args.db, PathBuf::from("./stockroom_dev.db"));
    }

    #[test]
    fn test_args_reject_bad_count_and_unknown_flags() {
        assert!(SeedArgs::try_parse_from(["seed", "--count", "abc"]).is_err());
        assert!(SeedArgs::try_parse_from(["seed", "--verbose"]).is_err());

        let args = SeedArgs::try_parse_from(["seed", "-c", "3", "-d", "demo.db"]).unwrap();
        assert_eq!(args.count, Some(3));
        assert_eq!(args.db, PathBuf::from("demo.db"));
    }

    #[test]
    fn test_generated_thresholds_are_ordered() {
        let category = Category {
            id: 1,
            name: "Beverages".into(),
            size: "Medium".into(),
            packaging: "Glass".into(),
        };
        for seed in 0..10 {
            let draft = generate_product(&category, "Soda", seed);
            assert!(draft.min_quantity <= draft.max_quantity);
            assert!(draft.unit_price.cents() >= 199);
        }
    }
}
