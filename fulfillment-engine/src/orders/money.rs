//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done on `Decimal` internally, then converted back to
//! `f64` for storage and serialization. Inputs are validated before any
//! write: non-finite floats never reach the store.

use rust_decimal::prelude::*;
use shared::models::{ItemInput, OrderItem};
use shared::{AppError, AppResult};

/// Rounding for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed monetary amount per value
const MAX_AMOUNT: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
const MAX_QUANTITY: i64 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::invalid_argument(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a ledger or payment amount: finite, strictly positive, bounded
pub fn validate_amount(amount: f64) -> AppResult<()> {
    require_finite(amount, "amount")?;
    if amount <= 0.0 {
        return Err(AppError::invalid_amount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::invalid_amount(format!(
            "amount exceeds maximum allowed ({}), got {}",
            MAX_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Validate a line item before it is priced
pub fn validate_item(item: &ItemInput) -> AppResult<()> {
    if item.quantity <= 0 {
        return Err(AppError::invalid_argument(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(AppError::invalid_argument(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    require_finite(item.unit_price, "unit_price")?;
    if item.unit_price < 0.0 {
        return Err(AppError::invalid_argument(format!(
            "unit_price must be non-negative, got {}",
            item.unit_price
        )));
    }
    if item.unit_price > MAX_AMOUNT {
        return Err(AppError::invalid_argument(format!(
            "unit_price exceeds maximum allowed ({}), got {}",
            MAX_AMOUNT, item.unit_price
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal (invalid values become 0; inputs are validated
/// finite before they get here)
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded for storage
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Line subtotal: quantity × unit_price, rounded to 2 decimals
pub fn line_subtotal(quantity: i64, unit_price: f64) -> f64 {
    to_f64(Decimal::from(quantity) * to_decimal(unit_price))
}

/// Precise a + b on monetary values
pub fn add(a: f64, b: f64) -> f64 {
    to_f64(to_decimal(a) + to_decimal(b))
}

/// Precise a - b on monetary values
pub fn sub(a: f64, b: f64) -> f64 {
    to_f64(to_decimal(a) - to_decimal(b))
}

/// Sum of item subtotals with Decimal accumulation
pub fn items_total(items: &[OrderItem]) -> f64 {
    to_f64(items.iter().map(|i| to_decimal(i.subtotal)).sum::<Decimal>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal_avoids_float_drift() {
        // 3 × 0.1 in plain f64 is 0.30000000000000004
        assert_eq!(line_subtotal(3, 0.1), 0.3);
        assert_eq!(line_subtotal(10, 100.0), 1000.0);
    }

    #[test]
    fn test_add_sub_precise() {
        assert_eq!(add(0.1, 0.2), 0.3);
        assert_eq!(sub(1.0, 0.9), 0.1);
    }

    #[test]
    fn test_validate_amount_rejects_bad_values() {
        assert!(validate_amount(100.0).is_ok());
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-5.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
        assert!(validate_amount(2_000_000.0).is_err());
    }

    #[test]
    fn test_validate_item() {
        let ok = ItemInput {
            product_id: 1,
            quantity: 2,
            unit_price: 10.5,
        };
        assert!(validate_item(&ok).is_ok());

        let zero_qty = ItemInput { quantity: 0, ..ok.clone() };
        assert!(validate_item(&zero_qty).is_err());

        let negative_price = ItemInput { unit_price: -1.0, ..ok.clone() };
        assert!(validate_item(&negative_price).is_err());

        let nan_price = ItemInput { unit_price: f64::NAN, ..ok };
        assert!(validate_item(&nan_price).is_err());
    }
}
