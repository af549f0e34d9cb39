//! Errors for caller-side checks.
//!
//! ```text
//!  ValidationError ──#[from]──► CoreError ──► AppError (stockroom-cli)
//! ```
//!
//! The stores in `stockroom-db` trust their inputs and never produce these.
//! A front end builds them while checking a command before it is sent to a
//! store, so the message names the offending field or product.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A `tipo` value that is neither entry nor exit in any casing.
    #[error("Unknown movement kind: '{0}'")]
    InvalidMovementKind(String),

    /// Raised by the exit pre-check only. The movement engine itself
    /// accepts exits that drive stock negative.
    #[error("Product {product_id} has {available} on hand, cannot remove {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One rejected field.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Empty, or only whitespace.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Text that did not parse, such as a price with three decimals.
    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A closed vocabulary such as the category size.
    #[error("{field} must be one of {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;
