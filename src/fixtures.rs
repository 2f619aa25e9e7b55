//! Fixtures

use std::path::PathBuf;

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::{Currency, IDR, USD};
use thiserror::Error;

use crate::{fixtures::scenarios::Scenario, lifecycle::LifecycleError};

pub mod scenarios;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid quantity
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The transaction in the scenario couldn't be created
    #[error("Failed to create transaction: {0}")]
    Request(#[source] LifecycleError),

    /// A step was rejected by the lifecycle
    #[error("Step {index} ({action}) failed: {source}")]
    Step {
        /// Zero-based index of the failing step
        index: usize,

        /// The step's action
        action: &'static str,

        /// Why it failed
        #[source]
        source: LifecycleError,
    },
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a named scenario from `<base>/scenarios/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_scenario(&self, name: &str) -> Result<Scenario, FixtureError> {
        let file_path = self
            .base_path
            .join("scenarios")
            .join(format!("{name}.yml"));

        Scenario::from_file(file_path)
    }
}

/// Parse price string (e.g., "12000 IDR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(|amount| amount.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, parse_currency(currency_code)?))
}

/// Look up one of the supported currency codes
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for anything but IDR and USD.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "IDR" => Ok(IDR),
        "USD" => Ok(USD),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a positive quantity (e.g., "1000" or "2.5")
///
/// # Errors
///
/// Returns an error if the string is not a decimal greater than zero.
pub fn parse_quantity(s: &str) -> Result<Decimal, FixtureError> {
    s.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|quantity| quantity.is_sign_positive() && !quantity.is_zero())
        .ok_or_else(|| FixtureError::InvalidQuantity(s.to_string()))
}

/// Parse an RFC 3339 timestamp (e.g., "2024-03-01T08:00:00Z")
///
/// # Errors
///
/// Returns an error if the string is not a valid timestamp.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, FixtureError> {
    s.trim()
        .parse::<Timestamp>()
        .map_err(|_err| FixtureError::InvalidTimestamp(s.to_string()))
}
