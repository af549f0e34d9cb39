//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│     Product     │◄──│    Movement     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  name           │   │  unit_price     │   │  kind           │       │
//! │  │  size           │   │  stock_quantity │   │  quantity       │       │
//! │  │  packaging      │   │  min / max      │   │  timestamp      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  New* drafts carry caller input before the store assigns an id.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids are assigned by the store. Equality and hashing of persisted
//! entities use the id only, so a stale snapshot still equals the row it
//! came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::validation::{
    validate_category_name, validate_category_size, validate_price, validate_product_name,
    validate_quantity, validate_text, validate_thresholds, validate_unit, ValidationResult,
};

// =============================================================================
// Category
// =============================================================================

/// A product category, e.g. "Beverages / Medium / Glass".
///
/// The store keeps `size` and `packaging` as free text. Callers restrict
/// `size` to [`CATEGORY_SIZES`]; [`PACKAGING_KINDS`] only lists the usual
/// packaging values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub size: String,
    pub packaging: String,
}

/// Conventional category sizes.
pub const CATEGORY_SIZES: [&str; 3] = ["Small", "Medium", "Large"];

/// Conventional packaging kinds.
pub const PACKAGING_KINDS: [&str; 3] = ["Can", "Glass", "Plastic"];

impl Category {
    /// Size and packaging joined for display, e.g. `Medium, Glass`.
    pub fn characteristics(&self) -> String {
        format!("{}, {}", self.size, self.packaging)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Input for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub size: String,
    pub packaging: String,
}

impl NewCategory {
    pub fn new(
        name: impl Into<String>,
        size: impl Into<String>,
        packaging: impl Into<String>,
    ) -> Self {
        NewCategory {
            name: name.into(),
            size: size.into(),
            packaging: packaging.into(),
        }
    }

    /// Checks the caller-side preconditions: non-empty name, a known size
    /// and some packaging text.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_category_name(&self.name)?;
        validate_category_size(&self.size)?;
        validate_text("packaging", &self.packaging)?;
        Ok(())
    }

    /// Attaches a store-assigned id.
    pub fn into_category(self, id: i64) -> Category {
        Category {
            id,
            name: self.name,
            size: self.size,
            packaging: self.packaging,
        }
    }
}

/// Number of products in one category, as returned by the outer-join count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProductCount {
    pub category_id: i64,
    pub name: String,
    pub count: i64,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product with its category resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price per unit.
    pub unit_price: Money,
    /// Unit-of-measure label ("case", "kg", "un").
    pub unit: String,
    /// Quantity on hand. Maintained by the movement engine and may go
    /// negative if exits are not pre-checked.
    pub stock_quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub category: Category,
}

impl Product {
    /// Stock strictly below the configured minimum.
    #[inline]
    pub fn is_below_minimum(&self) -> bool {
        self.stock_quantity < self.min_quantity
    }

    /// Stock strictly above the configured maximum.
    #[inline]
    pub fn is_above_maximum(&self) -> bool {
        self.stock_quantity > self.max_quantity
    }

    /// How many units are missing to reach the minimum (0 if not below).
    pub fn shortfall(&self) -> i64 {
        (self.min_quantity - self.stock_quantity).max(0)
    }

    /// How many units exceed the maximum (0 if not above).
    pub fn excess(&self) -> i64 {
        (self.stock_quantity - self.max_quantity).max(0)
    }

    /// `unit_price × stock_quantity`.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::{Category, Money, Product};
    ///
    /// let category = Category { id: 1, name: "Beverages".into(), size: "Medium".into(), packaging: "Glass".into() };
    /// let product = Product {
    ///     id: 1, name: "Soda".into(), unit_price: Money::from_cents(250), unit: "case".into(),
    ///     stock_quantity: 4, min_quantity: 1, max_quantity: 10, category,
    /// };
    /// assert_eq!(product.stock_value().cents(), 1000);
    /// ```
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.unit_price.multiply_quantity(self.stock_quantity)
    }

    /// Price after a percentage adjustment, without touching the product.
    pub fn price_adjusted_by_percent(&self, percent: f64) -> Money {
        self.unit_price.adjust_by_percent(percent)
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Input for creating a product. The category is referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub unit_price: Money,
    pub unit: String,
    pub stock_quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub category_id: i64,
}

impl NewProduct {
    /// Checks the caller-side preconditions.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_price(self.unit_price)?;
        validate_unit(&self.unit)?;
        validate_thresholds(self.min_quantity, self.max_quantity)?;
        if self.stock_quantity < 0 {
            return Err(ValidationError::OutOfRange {
                field: "stock quantity".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
        Ok(())
    }
}

/// Products grouped under their category.
///
/// Keeps the store's order (category name, then product name). Lookup is by
/// category id, matching [`Category`] equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductsByCategory {
    groups: Vec<(Category, Vec<Product>)>,
}

impl ProductsByCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a product, opening a new group when its category changes.
    ///
    /// Input must arrive sorted by category; a category seen earlier but not
    /// last is looked up so the grouping stays correct for unsorted input too.
    pub fn push(&mut self, product: Product) {
        if let Some((category, products)) = self.groups.last_mut() {
            if *category == product.category {
                products.push(product);
                return;
            }
        }
        if let Some((_, products)) = self
            .groups
            .iter_mut()
            .find(|(category, _)| *category == product.category)
        {
            products.push(product);
            return;
        }
        let category = product.category.clone();
        self.groups.push((category, vec![product]));
    }

    /// Products of the category with the given id.
    pub fn get(&self, category_id: i64) -> Option<&[Product]> {
        self.groups
            .iter()
            .find(|(category, _)| category.id == category_id)
            .map(|(_, products)| products.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &[Product])> {
        self.groups
            .iter()
            .map(|(category, products)| (category, products.as_slice()))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of products across all groups.
    pub fn product_count(&self) -> usize {
        self.groups.iter().map(|(_, products)| products.len()).sum()
    }
}

impl FromIterator<Product> for ProductsByCategory {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut grouped = ProductsByCategory::new();
        for product in iter {
            grouped.push(product);
        }
        grouped
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// Direction of a stock movement.
///
/// Persisted as the text `"Entrada"` / `"Saída"`; parsing is
/// case-insensitive and also accepts the English names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received, stock goes up.
    Entry,
    /// Goods shipped, stock goes down.
    Exit,
}

impl MovementKind {
    /// The text stored in the `tipo` column.
    pub const fn as_stored(&self) -> &'static str {
        match self {
            MovementKind::Entry => "Entrada",
            MovementKind::Exit => "Saída",
        }
    }

    /// Signed change this kind applies for `quantity` units.
    #[inline]
    pub const fn signed_delta(&self, quantity: i64) -> i64 {
        match self {
            MovementKind::Entry => quantity,
            MovementKind::Exit => -quantity,
        }
    }

    /// Stock after applying `quantity` units of this kind. No clamping.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::MovementKind;
    ///
    /// assert_eq!(MovementKind::Entry.apply_to(10, 5), 15);
    /// assert_eq!(MovementKind::Exit.apply_to(3, 5), -2);
    /// ```
    #[inline]
    pub const fn apply_to(&self, stock: i64, quantity: i64) -> i64 {
        stock + self.signed_delta(quantity)
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_stored())
    }
}

impl FromStr for MovementKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entrada" | "entry" | "in" => Ok(MovementKind::Entry),
            "saída" | "saida" | "exit" | "out" => Ok(MovementKind::Exit),
            other => Err(CoreError::InvalidMovementKind(other.to_string())),
        }
    }
}

// =============================================================================
// Movement
// =============================================================================

/// A recorded stock movement with a snapshot of its product.
///
/// Immutable once recorded; corrections are made with a compensating
/// movement of the opposite kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: i64,
    pub product: Product,
    pub kind: MovementKind,
    pub quantity: i64,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
}

impl Movement {
    #[inline]
    pub fn is_entry(&self) -> bool {
        self.kind == MovementKind::Entry
    }

    #[inline]
    pub fn is_exit(&self) -> bool {
        self.kind == MovementKind::Exit
    }
}

impl PartialEq for Movement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Movement {}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} {} of {} at {}",
            self.kind,
            self.quantity,
            self.product.unit,
            self.product.name,
            self.timestamp.format("%d/%m/%Y %H:%M")
        )
    }
}

/// A movement the caller wants to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: i64,
    pub kind: MovementKind,
    pub quantity: i64,
    /// When unset, the engine stamps the time of application.
    pub timestamp: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl NewMovement {
    pub fn entry(product_id: i64, quantity: i64) -> Self {
        NewMovement {
            product_id,
            kind: MovementKind::Entry,
            quantity,
            timestamp: None,
            note: None,
        }
    }

    pub fn exit(product_id: i64, quantity: i64) -> Self {
        NewMovement {
            product_id,
            kind: MovementKind::Exit,
            quantity,
            timestamp: None,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Checks the caller-side preconditions (positive quantity).
    pub fn validate(&self) -> ValidationResult<()> {
        validate_quantity(self.quantity)
    }

    /// Stock the product would have after this movement.
    pub fn resulting_stock(&self, product: &Product) -> i64 {
        self.kind.apply_to(product.stock_quantity, self.quantity)
    }

    /// Advisory: an exit that would leave the product below its minimum.
    pub fn results_in_below_minimum(&self, product: &Product) -> bool {
        self.kind == MovementKind::Exit && self.resulting_stock(product) < product.min_quantity
    }

    /// Advisory: an entry that would push the product above its maximum.
    pub fn results_in_above_maximum(&self, product: &Product) -> bool {
        self.kind == MovementKind::Entry && self.resulting_stock(product) > product.max_quantity
    }

    /// Advisory: entries always pass; exits need enough on hand.
    pub fn has_sufficient_stock(&self, product: &Product) -> bool {
        match self.kind {
            MovementKind::Entry => true,
            MovementKind::Exit => product.stock_quantity >= self.quantity,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn beverages() -> Category {
        NewCategory::new("Beverages", "Medium", "Glass").into_category(1)
    }

    fn soda(stock: i64) -> Product {
        Product {
            id: 1,
            name: "Soda".to_string(),
            unit_price: Money::from_cents(250),
            unit: "case".to_string(),
            stock_quantity: stock,
            min_quantity: 10,
            max_quantity: 50,
            category: beverages(),
        }
    }

    #[test]
    fn test_category_equality_by_id() {
        let a = beverages();
        let mut b = beverages();
        b.name = "Renamed".to_string();
        assert_eq!(a, b);

        b.id = 2;
        assert_ne!(a, b);
    }

    #[test]
    fn test_product_thresholds() {
        assert!(soda(9).is_below_minimum());
        assert!(!soda(10).is_below_minimum());
        assert!(soda(51).is_above_maximum());
        assert!(!soda(50).is_above_maximum());

        assert_eq!(soda(4).shortfall(), 6);
        assert_eq!(soda(20).shortfall(), 0);
        assert_eq!(soda(55).excess(), 5);
    }

    #[test]
    fn test_stock_value_can_be_negative() {
        assert_eq!(soda(-2).stock_value().cents(), -500);
    }

    #[test]
    fn test_movement_kind_parsing() {
        assert_eq!("Entrada".parse::<MovementKind>().unwrap(), MovementKind::Entry);
        assert_eq!("ENTRADA".parse::<MovementKind>().unwrap(), MovementKind::Entry);
        assert_eq!("Saída".parse::<MovementKind>().unwrap(), MovementKind::Exit);
        assert_eq!("saida".parse::<MovementKind>().unwrap(), MovementKind::Exit);
        assert_eq!("exit".parse::<MovementKind>().unwrap(), MovementKind::Exit);
        assert!("transfer".parse::<MovementKind>().is_err());
    }

    #[test]
    fn test_movement_kind_stored_text_round_trips() {
        for kind in [MovementKind::Entry, MovementKind::Exit] {
            assert_eq!(kind.as_stored().parse::<MovementKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_advisory_predicates() {
        let product = soda(20);

        let exit = NewMovement::exit(1, 11);
        assert!(exit.results_in_below_minimum(&product));
        assert!(!NewMovement::exit(1, 10).results_in_below_minimum(&product));
        assert!(exit.has_sufficient_stock(&product));
        assert!(!NewMovement::exit(1, 21).has_sufficient_stock(&product));

        let entry = NewMovement::entry(1, 31);
        assert!(entry.results_in_above_maximum(&product));
        assert!(!entry.results_in_below_minimum(&product));
        assert!(entry.has_sufficient_stock(&product));
    }

    #[test]
    fn test_new_movement_validation() {
        assert!(NewMovement::entry(1, 1).validate().is_ok());
        assert!(NewMovement::entry(1, 0).validate().is_err());
        assert!(NewMovement::exit(1, -3).validate().is_err());
    }

    #[test]
    fn test_new_product_validation() {
        let mut draft = NewProduct {
            name: "Soda".to_string(),
            unit_price: Money::from_cents(250),
            unit: "case".to_string(),
            stock_quantity: 20,
            min_quantity: 10,
            max_quantity: 50,
            category_id: 1,
        };
        assert!(draft.validate().is_ok());

        draft.min_quantity = 60;
        assert!(draft.validate().is_err());

        draft.min_quantity = 10;
        draft.unit_price = Money::from_cents(-1);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_products_by_category_grouping() {
        let mut snacks = beverages();
        snacks.id = 2;
        snacks.name = "Snacks".to_string();

        let mut chips = soda(5);
        chips.id = 2;
        chips.category = snacks;

        let mut juice = soda(5);
        juice.id = 3;

        let grouped: ProductsByCategory = vec![soda(5), juice, chips].into_iter().collect();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.product_count(), 3);
        assert_eq!(grouped.get(1).map(|p| p.len()), Some(2));
        assert_eq!(grouped.get(2).map(|p| p.len()), Some(1));
        assert!(grouped.get(99).is_none());
    }

    #[test]
    fn test_movement_kind_serializes_snake_case() {
        let json = serde_json::to_string(&MovementKind::Entry).unwrap();
        assert_eq!(json, "\"entry\"");
    }
}
