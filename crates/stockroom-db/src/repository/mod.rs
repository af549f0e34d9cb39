//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stores over one pool                                 │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.movements().apply(&NewMovement::exit(1, 5))                │
//! │       ▼                                                                 │
//! │  CategoryRepository   ProductRepository   MovementRepository           │
//! │  ├── create           ├── create          ├── apply  (transaction)     │
//! │  ├── update / delete  ├── update / delete ├── get                      │
//! │  ├── get / list_all   ├── thresholds      ├── list_all                 │
//! │  └── counts           └── prices, value   └── by product / by kind     │
//! │       │                                                                 │
//! │       │  SQL (rows.rs maps the joined columns)                          │
//! │       ▼                                                                 │
//! │  SQLite: category ◄── produto ◄── movimentacao                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD and product counts
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD, thresholds, prices
//! - [`MovementRepository`](movement::MovementRepository) - The movement engine and history

pub mod category;
pub mod movement;
pub mod product;
mod rows;

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use stockroom_core::{Category, Money, NewCategory, NewProduct, Product};

    use crate::pool::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn beverages(db: &Database) -> Category {
        db.categories()
            .create(&NewCategory::new("Beverages", "Medium", "Glass"))
            .await
            .unwrap()
    }

    pub fn draft(name: &str, price_cents: i64, stock: i64, min: i64, max: i64, category_id: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            unit_price: Money::from_cents(price_cents),
            unit: "case".to_string(),
            stock_quantity: stock,
            min_quantity: min,
            max_quantity: max,
            category_id,
        }
    }

    /// The "Soda" product: 2.50 per case, 20 on hand, min 10, max 50.
    pub async fn soda(db: &Database, category: &Category) -> Product {
        db.products()
            .create(&draft("Soda", 250, 20, 10, 50, category.id))
            .await
            .unwrap()
    }
}
