//! Prices

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors that can occur while calculating a total price.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TotalPriceError {
    /// The total can't be represented as a decimal.
    #[error("total price overflowed")]
    Overflow,

    /// A positive quantity and price produced a total that isn't positive.
    #[error("total price must be greater than zero")]
    NotPositive,
}

/// Calculates `quantity * unit_price` exactly, keeping any fraction of a minor unit.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: the product can't be represented.
/// - [`TotalPriceError::NotPositive`]: the product is zero or negative.
pub fn total_price(
    quantity: Decimal,
    unit_price: &Money<'static, Currency>,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    let total = unit_price
        .mul(quantity)
        .map_err(|_overflow| TotalPriceError::Overflow)?;

    if !total.is_positive() {
        return Err(TotalPriceError::NotPositive);
    }

    Ok(total)
}
