//! Database overview for `stockroom status`: where the file is, whether
//! migrations are current, and how much is stored.

use serde::Serialize;
use std::io::Write;

use super::Session;
use crate::error::AppResult;
use stockroom_db::migrations::migration_status;

#[derive(Debug, Serialize)]
struct Status {
    database: String,
    migrations_applied: usize,
    migrations_total: usize,
    categories: i64,
    products: i64,
    movements: i64,
    below_minimum: usize,
    above_maximum: usize,
    stock_value_cents: i64,
}

pub async fn run<W: Write>(session: &mut Session<W>) -> AppResult<()> {
    let (total, applied) = migration_status(session.db.pool()).await?;
    let products = session.db.products();

    let status = Status {
        database: session.config.database.path.display().to_string(),
        migrations_applied: applied,
        migrations_total: total,
        categories: session.db.categories().count().await?,
        products: products.count().await?,
        movements: session.db.movements().count().await?,
        below_minimum: products.list_below_minimum().await?.len(),
        above_maximum: products.list_above_maximum().await?.len(),
        stock_value_cents: products.total_stock_value().await?.cents(),
    };

    if session.json {
        return session.print_json(&status);
    }

    let value = session.money(stockroom_core::Money::from_cents(status.stock_value_cents));
    let out = &mut session.out;
    writeln!(out, "Stockroom Status")?;
    writeln!(out, "================")?;
    writeln!(out)?;
    writeln!(out, "  Database:      {}", status.database)?;
    writeln!(
        out,
        "  Migrations:    {} / {}",
        status.migrations_applied, status.migrations_total
    )?;
    writeln!(out)?;
    writeln!(out, "  Categories:    {}", status.categories)?;
    writeln!(out, "  Products:      {}", status.products)?;
    writeln!(out, "  Movements:     {}", status.movements)?;
    writeln!(out, "  Below minimum: {}", status.below_minimum)?;
    writeln!(out, "  Above maximum: {}", status.above_maximum)?;
    writeln!(out, "  Stock value:   {}", value)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{seed_soda, session, take_output};

    #[tokio::test]
    async fn test_status_text() {
        let mut session = session().await;
        seed_soda(&session).await;

        run(&mut session).await.unwrap();
        let text = take_output(&mut session);

        assert!(text.contains("Migrations:    1 / 1"));
        assert!(text.contains("Products:      1"));
        assert!(text.contains("Stock value:   R$ 50.00"));
    }

    #[tokio::test]
    async fn test_status_json() {
        let mut session = session().await.json(true);

        run(&mut session).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&take_output(&mut session)).unwrap();

        assert_eq!(value["categories"], 0);
        assert_eq!(value["stock_value_cents"], 0);
    }
}
