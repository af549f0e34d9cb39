//! # Report Commands
//!
//! `stockroom report prices|balance|below-min|above-max|categories|history [--out FILE]`
//!
//! ```text
//! --out FILE given          → FILE
//! report.output_dir set     → <output_dir>/<report>.txt
//! otherwise                 → stdout
//! ```

use clap::{Args, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use super::Session;
use crate::error::AppResult;
use stockroom_core::{Category, CategoryProductCount, Movement, Product};
use stockroom_report::{
    write_above_maximum, write_below_minimum, write_category_breakdown, write_movement_history,
    write_price_list, write_stock_balance, ReportOptions, ReportResult,
};

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub kind: ReportKind,

    /// Save the report to this file instead of printing it.
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ReportKind {
    /// Price list, by product name.
    Prices,
    /// Quantity and value of everything on hand.
    Balance,
    /// Products below their minimum quantity.
    BelowMin,
    /// Products above their maximum quantity.
    AboveMax,
    /// Product count per category.
    Categories,
    /// Movement history, newest first.
    History {
        #[arg(long)]
        product: Option<i64>,
    },
}

/// Records fetched for one report.
enum ReportData {
    Prices(Vec<Product>),
    Balance(Vec<Product>),
    BelowMin(Vec<Product>),
    AboveMax(Vec<Product>),
    Categories(Vec<Category>, Vec<CategoryProductCount>),
    History(Vec<Movement>),
}

impl ReportData {
    fn file_name(&self) -> &'static str {
        match self {
            ReportData::Prices(_) => "price_list.txt",
            ReportData::Balance(_) => "stock_balance.txt",
            ReportData::BelowMin(_) => "below_minimum.txt",
            ReportData::AboveMax(_) => "above_maximum.txt",
            ReportData::Categories(..) => "category_breakdown.txt",
            ReportData::History(_) => "movement_history.txt",
        }
    }

    fn write_to<W: Write>(&self, out: &mut W, options: &ReportOptions) -> ReportResult<()> {
        match self {
            ReportData::Prices(products) => write_price_list(products, out, options),
            ReportData::Balance(products) => write_stock_balance(products, out, options),
            ReportData::BelowMin(products) => write_below_minimum(products, out, options),
            ReportData::AboveMax(products) => write_above_maximum(products, out, options),
            ReportData::Categories(categories, counts) => {
                write_category_breakdown(categories, counts, out, options)
            }
            ReportData::History(movements) => write_movement_history(movements, out, options),
        }
    }
}

async fn fetch<W: Write>(kind: ReportKind, session: &Session<W>) -> AppResult<ReportData> {
    let products = session.db.products();
    let data = match kind {
        ReportKind::Prices => ReportData::Prices(products.list_by_name().await?),
        ReportKind::Balance => ReportData::Balance(products.list_all().await?),
        // Threshold reports filter the full listing themselves
        ReportKind::BelowMin => ReportData::BelowMin(products.list_all().await?),
        ReportKind::AboveMax => ReportData::AboveMax(products.list_all().await?),
        ReportKind::Categories => {
            let categories = session.db.categories();
            ReportData::Categories(
                categories.list_all().await?,
                categories.count_products_per_category().await?,
            )
        }
        ReportKind::History { product: Some(id) } => {
            session.require_product(id).await?;
            ReportData::History(session.db.movements().list_by_product(id).await?)
        }
        ReportKind::History { product: None } => {
            ReportData::History(session.db.movements().list_all().await?)
        }
    };
    Ok(data)
}

pub async fn run<W: Write>(args: ReportArgs, session: &mut Session<W>) -> AppResult<()> {
    let data = fetch(args.kind, session).await?;
    let options = session.config.report_options();

    let destination = args.out.or_else(|| {
        session
            .config
            .report
            .output_dir
            .as_ref()
            .map(|dir| dir.join(data.file_name()))
    });

    match destination {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = BufWriter::new(File::create(&path)?);
            data.write_to(&mut file, &options)?;
            info!(path = %path.display(), "Report saved");
            writeln!(session.out, "Report written to {}", path.display())?;
        }
        None => data.write_to(&mut session.out, &options)?,
    }

    Ok(())
}
