//! # stockroom-report: Fixed-Width Text Reports
//!
//! Formats data the caller has already fetched. Nothing here touches the
//! database; the CLI pairs each store query with one report.
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │ ProductRepository::list_all  │─────►│ write_price_list             │
//! │                              │─────►│ write_stock_balance          │
//! │                              │─────►│ write_below_minimum          │
//! │                              │─────►│ write_above_maximum          │
//! ├──────────────────────────────┤      ├──────────────────────────────┤
//! │ CategoryRepository::list_all │─┬───►│ write_category_breakdown     │
//! │ count_products_per_category  │─┘    │                              │
//! ├──────────────────────────────┤      ├──────────────────────────────┤
//! │ MovementRepository::list_*   │─────►│ write_movement_history       │
//! └──────────────────────────────┘      └──────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_report::{write_stock_balance, ReportOptions};
//!
//! let products = db.products().list_all().await?;
//! write_stock_balance(&products, &mut std::io::stdout(), &ReportOptions::new("R$"))?;
//! ```

pub mod error;
pub mod layout;
pub mod reports;

pub use error::{ReportError, ReportResult};
pub use layout::ReportOptions;
pub use reports::*;
