//! # stockroom-core: Pure Domain Logic for Stockroom
//!
//! This crate holds the inventory domain as plain types and pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    stockroom CLI (clap)                         │   │
//! │  │    category ─► product ─► price ─► stock ─► report              │   │
//! │  └───────────────┬─────────────────────────────────┬───────────────┘   │
//! │                  │                                 │                    │
//! │  ┌───────────────▼─────────────────┐ ┌─────────────▼───────────────┐   │
//! │  │  stockroom-db                   │ │  stockroom-report           │   │
//! │  │  stores + movement engine       │ │  fixed-width text reports   │   │
//! │  └───────────────┬─────────────────┘ └─────────────┬───────────────┘   │
//! │                  │                                 │                    │
//! │  ┌───────────────▼─────────────────────────────────▼───────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ CoreError │  │   rules   │  │   │
//! │  │   │ Movement  │  │  percent  │  │           │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Product, Movement, drafts)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Caller-side precondition checks
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::{MovementKind, Money};
//!
//! let price = Money::from_cents(250);
//! assert_eq!(price.multiply_quantity(4).cents(), 1000);
//!
//! let kind: MovementKind = "Saída".parse().unwrap();
//! assert_eq!(kind.apply_to(20, 5), 15);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use validation::ValidationResult;
