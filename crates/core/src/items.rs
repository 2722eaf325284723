//! Line Items

use std::fmt::{Display, Formatter, Result as FmtResult};

use rusty_money::{Money, iso};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency every price in the cart is denominated in.
pub const CURRENCY: &iso::Currency = iso::USD;

/// Converts an amount of minor units into displayable money.
///
/// Amounts beyond `i64::MAX` minor units saturate.
pub fn money_from_minor(minor: u64) -> Money<'static, iso::Currency> {
    Money::from_minor(i64::try_from(minor).unwrap_or(i64::MAX), CURRENCY)
}

/// Errors raised when line-item input fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemError {
    /// The requested quantity is zero or above the per-line bound.
    #[error("quantity {0} is outside 1..=99")]
    InvalidQuantity(u32),

    /// Unit prices must be a positive number of minor units.
    #[error("unit price must be positive")]
    InvalidPrice,
}

/// Number of units on a cart line, kept within `1..=99`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32")]
pub struct Quantity(u8);

impl Quantity {
    /// Upper bound for a single line.
    pub const MAX: Quantity = Quantity(99);

    /// Lower bound for a single line.
    pub const MIN: Quantity = Quantity(1);

    /// Validates an exact quantity.
    ///
    /// # Errors
    ///
    /// Returns a `LineItemError` if the value is outside `1..=99`.
    pub fn new(value: u32) -> Result<Self, LineItemError> {
        match u8::try_from(value) {
            Ok(units) if (Self::MIN.0..=Self::MAX.0).contains(&units) => Ok(Quantity(units)),
            _ => Err(LineItemError::InvalidQuantity(value)),
        }
    }

    /// Validates a requested quantity, clamping overshoot down to [`Quantity::MAX`].
    ///
    /// Clamping never invents a unit: zero is still rejected.
    ///
    /// # Errors
    ///
    /// Returns a `LineItemError` if the value is zero.
    pub fn clamped(value: u32) -> Result<Self, LineItemError> {
        if value == 0 {
            return Err(LineItemError::InvalidQuantity(value));
        }

        Ok(Self::new(value).unwrap_or(Self::MAX))
    }

    /// Adds two quantities, saturating at [`Quantity::MAX`].
    #[must_use]
    pub fn saturating_add(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_add(other.0).min(Self::MAX.0))
    }

    /// Returns the number of units.
    pub fn units(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = LineItemError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Price of a single unit, in minor units of [`CURRENCY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64")]
pub struct UnitPrice(u64);

impl UnitPrice {
    /// Validates a price given in minor units.
    ///
    /// # Errors
    ///
    /// Returns a `LineItemError` if the amount is zero.
    pub fn from_minor(minor: u64) -> Result<Self, LineItemError> {
        if minor == 0 {
            return Err(LineItemError::InvalidPrice);
        }

        Ok(UnitPrice(minor))
    }

    /// Returns the amount in minor units.
    pub fn minor(self) -> u64 {
        self.0
    }

    /// Returns the price as displayable money.
    pub fn to_money(self) -> Money<'static, iso::Currency> {
        money_from_minor(self.0)
    }
}

impl TryFrom<u64> for UnitPrice {
    type Error = LineItemError;

    fn try_from(minor: u64) -> Result<Self, Self::Error> {
        UnitPrice::from_minor(minor)
    }
}

impl Display for UnitPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.to_money(), f)
    }
}

/// Product identity; lines in a cart are unique by this id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        ProductId(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// One cart line: a product snapshot plus the quantity held.
///
/// Name, price, image and variant are captured when the line is first
/// added; later additions of the same product only raise the quantity,
/// so catalog changes never reach existing lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identity, unique within a cart.
    pub id: ProductId,

    /// Display name captured at add time.
    pub name: String,

    /// Unit price captured at add time.
    pub unit_price: UnitPrice,

    /// Units of this product on the line.
    pub quantity: Quantity,

    /// Catalog image, when one was known at add time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Display-only variant such as a colour; not part of identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl LineItem {
    /// Returns the minor units this line contributes to the subtotal.
    pub fn line_total_minor(&self) -> u64 {
        self.unit_price
            .minor()
            .saturating_mul(u64::from(self.quantity.units()))
    }

    /// Returns the line total as displayable money.
    pub fn line_total(&self) -> Money<'static, iso::Currency> {
        money_from_minor(self.line_total_minor())
    }
}

/// An add-to-cart request before validation.
///
/// Quantities above [`Quantity::MAX`] are clamped rather than rejected;
/// zero quantities and zero prices fail conversion outright.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewLineItem {
    /// Product identity.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Unit price in minor units.
    pub unit_price: u64,

    /// Requested quantity.
    pub quantity: u32,

    /// Catalog image.
    pub image_url: Option<String>,

    /// Display-only variant.
    pub variant: Option<String>,
}

impl TryFrom<NewLineItem> for LineItem {
    type Error = LineItemError;

    fn try_from(new: NewLineItem) -> Result<Self, Self::Error> {
        Ok(LineItem {
            id: new.id,
            name: new.name,
            unit_price: UnitPrice::from_minor(new.unit_price)?,
            quantity: Quantity::clamped(new.quantity)?,
            image_url: new.image_url,
            variant: new.variant,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::fixtures;

    use super::*;

    #[test]
    fn quantity_accepts_the_full_range() -> TestResult {
        assert_eq!(Quantity::new(1)?, Quantity::MIN);
        assert_eq!(Quantity::new(99)?, Quantity::MAX);

        Ok(())
    }

    #[test]
    fn quantity_rejects_zero() {
        let result = Quantity::new(0);

        assert!(
            matches!(result, Err(LineItemError::InvalidQuantity(0))),
            "expected InvalidQuantity, got {result:?}"
        );
    }

    #[test]
    fn quantity_rejects_values_above_the_bound() {
        let result = Quantity::new(100);

        assert!(
            matches!(result, Err(LineItemError::InvalidQuantity(100))),
            "expected InvalidQuantity, got {result:?}"
        );
    }

    #[test]
    fn clamped_caps_overshoot_at_the_bound() -> TestResult {
        assert_eq!(Quantity::clamped(150)?, Quantity::MAX);
        assert_eq!(Quantity::clamped(7)?, Quantity::new(7)?);

        Ok(())
    }

    #[test]
    fn clamped_still_rejects_zero() {
        let result = Quantity::clamped(0);

        assert!(
            matches!(result, Err(LineItemError::InvalidQuantity(0))),
            "expected InvalidQuantity, got {result:?}"
        );
    }

    #[test]
    fn saturating_add_stops_at_the_bound() -> TestResult {
        let quantity = Quantity::new(95)?.saturating_add(Quantity::new(10)?);

        assert_eq!(quantity, Quantity::MAX);

        Ok(())
    }

    #[test]
    fn unit_price_rejects_zero() {
        let result = UnitPrice::from_minor(0);

        assert!(
            matches!(result, Err(LineItemError::InvalidPrice)),
            "expected InvalidPrice, got {result:?}"
        );
    }

    #[test]
    fn unit_price_converts_to_money() -> TestResult {
        use rusty_money::{Money, iso};

        assert_eq!(
            UnitPrice::from_minor(35_00)?.to_money(),
            Money::from_minor(35_00, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() -> TestResult {
        let line = LineItem::try_from(fixtures::socks(5))?;

        assert_eq!(line.line_total_minor(), 5 * 7_00);

        Ok(())
    }

    #[test]
    fn conversion_clamps_oversized_requests() -> TestResult {
        let line = LineItem::try_from(fixtures::socks(150))?;

        assert_eq!(line.quantity, Quantity::MAX);

        Ok(())
    }

    #[test]
    fn conversion_rejects_zero_quantity() {
        let result = LineItem::try_from(fixtures::socks(0));

        assert!(
            matches!(result, Err(LineItemError::InvalidQuantity(0))),
            "expected InvalidQuantity, got {result:?}"
        );
    }

    #[test]
    fn conversion_rejects_zero_price() {
        let mut new = fixtures::socks(1);
        new.unit_price = 0;

        let result = LineItem::try_from(new);

        assert!(
            matches!(result, Err(LineItemError::InvalidPrice)),
            "expected InvalidPrice, got {result:?}"
        );
    }

    #[test]
    fn stored_lines_round_trip_as_json() -> TestResult {
        let line = LineItem::try_from(fixtures::lamp(2))?;

        let json = serde_json::to_string(&line)?;
        let restored: LineItem = serde_json::from_str(&json)?;

        assert_eq!(restored, line);

        Ok(())
    }

    #[test]
    fn stored_quantities_outside_the_bound_are_rejected() {
        let json = r#"{"id":"sku-1","name":"Socks","unit_price":700,"quantity":0}"#;

        let result: Result<LineItem, _> = serde_json::from_str(json);

        assert!(result.is_err(), "expected a deserialization error");
    }

    #[test]
    fn absent_optional_fields_deserialize_as_none() -> TestResult {
        let json = r#"{"id":"sku-1","name":"Socks","unit_price":700,"quantity":3}"#;

        let line: LineItem = serde_json::from_str(json)?;

        assert_eq!(line.image_url, None);
        assert_eq!(line.variant, None);

        Ok(())
    }
}
