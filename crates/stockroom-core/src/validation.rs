//! Field rules a front end applies before calling a store.
//!
//! ```text
//!  clap parse ──► validate_* (here) ──► store ──► SQLite NOT NULL / FK / CHECK
//!   types          text, ranges,          trusts
//!                  min <= max, exits      its input
//! ```
//!
//! Nothing in `stockroom-db` calls these. The checks that compare an exit
//! against the stock on hand are advisory: the movement engine accepts the
//! exit anyway, and the CLI skips them under `--force`.
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_product_name, validate_quantity};
//!
//! assert!(validate_product_name("Soda").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::CATEGORY_SIZES;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest name accepted for products and categories.
pub const MAX_NAME_LENGTH: usize = 100;

/// Longest unit-of-measure label.
pub const MAX_UNIT_LENGTH: usize = 20;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a text field is not blank.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_text;
///
/// assert!(validate_text("note", "promo").is_ok());
/// assert!(validate_text("note", "   ").is_err());
/// ```
pub fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_text(field, name)?;

    if name.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a category name.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_NAME_LENGTH`] characters
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_name("category name", name)
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_NAME_LENGTH`] characters
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Soda").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("product name", name)
}

/// Validates a unit-of-measure label ("case", "kg").
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    validate_text("unit", unit)?;

    if unit.trim().chars().count() > MAX_UNIT_LENGTH {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: MAX_UNIT_LENGTH,
        });
    }

    Ok(())
}

/// Validates a category size against [`CATEGORY_SIZES`], ignoring case.
///
/// ## Returns
/// The canonical spelling, so `"medium"` is stored as `"Medium"`.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_category_size;
///
/// assert_eq!(validate_category_size("large").unwrap(), "Large");
/// assert!(validate_category_size("Huge").is_err());
/// ```
pub fn validate_category_size(size: &str) -> ValidationResult<&'static str> {
    let size = size.trim();
    CATEGORY_SIZES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(size))
        .copied()
        .ok_or_else(|| ValidationError::NotAllowed {
            field: "size".to_string(),
            allowed: CATEGORY_SIZES.iter().map(|s| s.to_string()).collect(),
        })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a movement quantity.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an exit quantity against the stock on hand.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  stock exit --product 1 --quantity 5                                    │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_exit_quantity(5, on_hand) ← THIS FUNCTION                    │
/// │       │                                                                 │
/// │       ├── qty <= 0?       → Error: "quantity must be positive"         │
/// │       ├── qty > on_hand?  → Error: out of range 1..=on_hand            │
/// │       └── OK → movement engine                                         │
/// │                                                                         │
/// │  The engine itself never checks this. `--force` skips the call.        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_exit_quantity(qty: i64, on_hand: i64) -> ValidationResult<()> {
    validate_quantity(qty)?;

    if qty > on_hand {
        return Err(ValidationError::OutOfRange {
            field: "exit quantity".to_string(),
            min: 1,
            max: on_hand.max(0),
        });
    }

    Ok(())
}

/// Validates minimum/maximum stock thresholds.
///
/// ## Rules
/// - Both non-negative
/// - `min <= max`
pub fn validate_thresholds(min: i64, max: i64) -> ValidationResult<()> {
    if min < 0 {
        return Err(ValidationError::OutOfRange {
            field: "minimum quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if max < min {
        return Err(ValidationError::OutOfRange {
            field: "maximum quantity".to_string(),
            min,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price adjustment percentage.
///
/// ## Rules
/// - Must be a finite number other than zero
/// - Must be greater than -100 (a price cannot drop to zero or below)
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_percent;
///
/// assert!(validate_percent(10.0).is_ok());
/// assert!(validate_percent(-25.0).is_ok());
/// assert!(validate_percent(0.0).is_err());
/// assert!(validate_percent(-100.0).is_err());
/// ```
pub fn validate_percent(percent: f64) -> ValidationResult<()> {
    if !percent.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "percent".to_string(),
            reason: "must be a number".to_string(),
        });
    }

    if percent == 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: "percent".to_string(),
            reason: "must not be zero".to_string(),
        });
    }

    if percent <= -100.0 {
        return Err(ValidationError::OutOfRange {
            field: "percent".to_string(),
            min: -99,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_names() {
        assert!(validate_product_name("Soda").is_ok());
        assert!(validate_category_name("Beverages").is_ok());

        assert!(validate_product_name("").is_err());
        assert!(validate_category_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_unit() {
        assert!(validate_unit("case").is_ok());
        assert!(validate_unit("").is_err());
        assert!(validate_unit(&"u".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_category_size() {
        assert_eq!(validate_category_size("Small").unwrap(), "Small");
        assert_eq!(validate_category_size(" MEDIUM ").unwrap(), "Medium");
        assert!(matches!(
            validate_category_size("Jumbo"),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(250)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_exit_quantity() {
        assert!(validate_exit_quantity(5, 20).is_ok());
        assert!(validate_exit_quantity(20, 20).is_ok());
        assert!(validate_exit_quantity(21, 20).is_err());
        assert!(validate_exit_quantity(0, 20).is_err());
        assert!(validate_exit_quantity(1, -3).is_err());
    }

    #[test]
    fn test_validate_thresholds() {
        assert!(validate_thresholds(0, 0).is_ok());
        assert!(validate_thresholds(10, 50).is_ok());
        assert!(validate_thresholds(-1, 50).is_err());
        assert!(validate_thresholds(60, 50).is_err());
    }

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent(0.5).is_ok());
        assert!(validate_percent(-99.9).is_ok());
        assert!(validate_percent(0.0).is_err());
        assert!(validate_percent(-150.0).is_err());
        assert!(validate_percent(f64::NAN).is_err());
    }
}
