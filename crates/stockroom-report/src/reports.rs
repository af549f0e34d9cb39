//! # Reports
//!
//! One pair of functions per report: `render_*` builds the text, `write_*`
//! sends it to a sink.
//!
//! | Report              | Input                          | Footer                         |
//! |---------------------|--------------------------------|--------------------------------|
//! | price list          | products (caller's order)      | product count                  |
//! | stock balance       | products                       | product count, stock value     |
//! | below minimum       | all products, filtered here    | matching count                 |
//! | above maximum       | all products, filtered here    | matching count                 |
//! | category breakdown  | categories + per-category count| category and product totals    |
//! | movement history    | movements (caller's order)     | count, units in, units out     |
//!
//! The threshold reports filter and sort by name themselves, so they are
//! correct whatever listing they are handed.

use std::io::Write;
use tracing::error;

use crate::error::{ReportError, ReportResult};
use crate::layout::{Column, Page, ReportOptions, DATE_FORMAT};
use stockroom_core::{Category, CategoryProductCount, Money, Movement, MovementKind, Product};

// =============================================================================
// Column Sets
// =============================================================================

const PRICE_COLUMNS: [Column; 4] = [
    Column::left("PRODUCT", 34),
    Column::left("UNIT", 8),
    Column::right("PRICE", 14),
    Column::left("CATEGORY", 21),
];

const BALANCE_COLUMNS: [Column; 5] = [
    Column::left("PRODUCT", 30),
    Column::left("UNIT", 8),
    Column::right("QUANTITY", 10),
    Column::right("UNIT PRICE", 14),
    Column::right("TOTAL VALUE", 14),
];

const BELOW_MINIMUM_COLUMNS: [Column; 4] = [
    Column::left("PRODUCT", 40),
    Column::right("MIN QTY", 12),
    Column::right("CURRENT QTY", 12),
    Column::right("SHORTFALL", 13),
];

const ABOVE_MAXIMUM_COLUMNS: [Column; 4] = [
    Column::left("PRODUCT", 40),
    Column::right("MAX QTY", 12),
    Column::right("CURRENT QTY", 12),
    Column::right("EXCESS", 13),
];

const CATEGORY_COLUMNS: [Column; 3] = [
    Column::left("CATEGORY", 34),
    Column::right("PRODUCTS", 10),
    Column::left("CHARACTERISTICS", 34),
];

const HISTORY_COLUMNS: [Column; 5] = [
    Column::left("DATE", 16),
    Column::left("KIND", 7),
    Column::left("PRODUCT", 26),
    Column::right("QUANTITY", 8),
    Column::left("NOTE", 19),
];

fn currency(amount: Money, options: &ReportOptions) -> String {
    amount.with_symbol(&options.currency_symbol)
}

/// Writes a rendered report, logging and returning any I/O failure.
fn emit<W: Write>(out: &mut W, report: &'static str, text: &str) -> ReportResult<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|source| {
            error!(report, error = %source, "Failed to write report");
            ReportError::Io { report, source }
        })
}

fn sorted_by_name<'a>(products: impl Iterator<Item = &'a Product>) -> Vec<&'a Product> {
    let mut selected: Vec<&Product> = products.collect();
    selected.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    selected
}

// =============================================================================
// Price List
// =============================================================================

/// Product, unit, price and category, in the order given.
pub fn render_price_list(products: &[Product], options: &ReportOptions) -> String {
    let mut page = Page::new("PRICE LIST", options, &PRICE_COLUMNS);
    for product in products {
        page.row(&[
            product.name.clone(),
            product.unit.clone(),
            currency(product.unit_price, options),
            product.category.name.clone(),
        ]);
    }
    page.finish(&[format!("Total products: {}", products.len())])
}

pub fn write_price_list<W: Write>(
    products: &[Product],
    out: &mut W,
    options: &ReportOptions,
) -> ReportResult<()> {
    emit(out, "price list", &render_price_list(products, options))
}

// =============================================================================
// Stock Balance
// =============================================================================

/// Physical and financial balance: quantity, unit price and stock value per
/// product, with the grand total in the footer.
pub fn render_stock_balance(products: &[Product], options: &ReportOptions) -> String {
    let mut page = Page::new("STOCK BALANCE", options, &BALANCE_COLUMNS);
    let mut total = Money::zero();
    for product in products {
        let value = product.stock_value();
        total += value;
        page.row(&[
            product.name.clone(),
            product.unit.clone(),
            product.stock_quantity.to_string(),
            currency(product.unit_price, options),
            currency(value, options),
        ]);
    }
    page.finish(&[
        format!("Total products: {}", products.len()),
        format!("Total stock value: {}", currency(total, options)),
    ])
}

pub fn write_stock_balance<W: Write>(
    products: &[Product],
    out: &mut W,
    options: &ReportOptions,
) -> ReportResult<()> {
    emit(out, "stock balance", &render_stock_balance(products, options))
}

// =============================================================================
// Threshold Reports
// =============================================================================

/// Products with stock below their minimum, by name, with the shortfall.
pub fn render_below_minimum(products: &[Product], options: &ReportOptions) -> String {
    let selected = sorted_by_name(products.iter().filter(|p| p.is_below_minimum()));

    let mut page = Page::new("PRODUCTS BELOW MINIMUM QUANTITY", options, &BELOW_MINIMUM_COLUMNS);
    for product in &selected {
        page.row(&[
            product.name.clone(),
            product.min_quantity.to_string(),
            product.stock_quantity.to_string(),
            product.shortfall().to_string(),
        ]);
    }
    page.finish(&[format!("Total products below minimum: {}", selected.len())])
}

pub fn write_below_minimum<W: Write>(
    products: &[Product],
    out: &mut W,
    options: &ReportOptions,
) -> ReportResult<()> {
    emit(out, "below minimum", &render_below_minimum(products, options))
}

/// Products with stock above their maximum, by name, with the excess.
pub fn render_above_maximum(products: &[Product], options: &ReportOptions) -> String {
    let selected = sorted_by_name(products.iter().filter(|p| p.is_above_maximum()));

    let mut page = Page::new("PRODUCTS ABOVE MAXIMUM QUANTITY", options, &ABOVE_MAXIMUM_COLUMNS);
    for product in &selected {
        page.row(&[
            product.name.clone(),
            product.max_quantity.to_string(),
            product.stock_quantity.to_string(),
            product.excess().to_string(),
        ]);
    }
    page.finish(&[format!("Total products above maximum: {}", selected.len())])
}

pub fn write_above_maximum<W: Write>(
    products: &[Product],
    out: &mut W,
    options: &ReportOptions,
) -> ReportResult<()> {
    emit(out, "above maximum", &render_above_maximum(products, options))
}

// =============================================================================
// Category Breakdown
// =============================================================================

/// Product count per category with the category's size and packaging.
///
/// Rows follow `counts`; `categories` only supplies the characteristics,
/// matched by id. A count without a matching category prints them blank.
pub fn render_category_breakdown(
    categories: &[Category],
    counts: &[CategoryProductCount],
    options: &ReportOptions,
) -> String {
    let mut page = Page::new("PRODUCTS PER CATEGORY", options, &CATEGORY_COLUMNS);
    let mut total = 0;
    for count in counts {
        total += count.count;
        let characteristics = categories
            .iter()
            .find(|c| c.id == count.category_id)
            .map(Category::characteristics)
            .unwrap_or_default();
        page.row(&[count.name.clone(), count.count.to_string(), characteristics]);
    }
    page.finish(&[
        format!("Total categories: {}", counts.len()),
        format!("Total products: {}", total),
    ])
}

pub fn write_category_breakdown<W: Write>(
    categories: &[Category],
    counts: &[CategoryProductCount],
    out: &mut W,
    options: &ReportOptions,
) -> ReportResult<()> {
    emit(
        out,
        "category breakdown",
        &render_category_breakdown(categories, counts, options),
    )
}

// =============================================================================
// Movement History
// =============================================================================

/// Movements in the order given, timestamps shown in the offset of
/// `options.generated_at`.
pub fn render_movement_history(movements: &[Movement], options: &ReportOptions) -> String {
    let offset = *options.generated_at.offset();
    let mut page = Page::new("MOVEMENT HISTORY", options, &HISTORY_COLUMNS);
    let (mut units_in, mut units_out) = (0i64, 0i64);
    for movement in movements {
        match movement.kind {
            MovementKind::Entry => units_in += movement.quantity,
            MovementKind::Exit => units_out += movement.quantity,
        }
        page.row(&[
            movement
                .timestamp
                .with_timezone(&offset)
                .format(DATE_FORMAT)
                .to_string(),
            movement.kind.to_string(),
            movement.product.name.clone(),
            movement.quantity.to_string(),
            movement.note.clone().unwrap_or_default(),
        ]);
    }
    page.finish(&[
        format!("Total movements: {}", movements.len()),
        format!("Units in: {}", units_in),
        format!("Units out: {}", units_out),
    ])
}

pub fn write_movement_history<W: Write>(
    movements: &[Movement],
    out: &mut W,
    options: &ReportOptions,
) -> ReportResult<()> {
    emit(out, "movement history", &render_movement_history(movements, options))
}

// =============================================================================
// Unit Tests
// =============================================================================
