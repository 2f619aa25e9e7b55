//! Scenario Fixtures
//!
//! A scenario describes one requested transaction and the steps taken on it:
//!
//! ```yaml
//! transaction:
//!   commodity: Padi
//!   quantity: "1000"
//!   unit: kg
//!   started_at: "2024-03-01T08:00:00Z"
//! steps:
//!   - action: confirm
//!   - action: set_price
//!     price: "12000 IDR"
//!   - action: start_delivery
//!     estimated_delivery: "2024-03-05T08:00:00Z"
//!     courier: JNE
//! ```
//!
//! Steps without an `at` happen one hour after the previous step.

use std::{fs, path::Path};

use jiff::{SignedDuration, Timestamp};
use rusty_money::Money;
use serde::Deserialize;
use tracing::debug;

use crate::{
    fixtures::{FixtureError, parse_currency, parse_price, parse_quantity, parse_timestamp},
    ids::UserId,
    lifecycle::{Action, Command, DeliveryEvidence, Dispatch},
    transactions::{CommodityUnit, NewTransaction, Transaction, TransactionKind},
};

/// Wrapper for a scenario in YAML
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// The requested transaction
    pub transaction: TransactionFixture,

    /// Steps applied in order
    #[serde(default)]
    pub steps: Vec<StepFixture>,
}

/// Transaction Fixture
#[derive(Debug, Deserialize)]
pub struct TransactionFixture {
    /// Regular or order book
    #[serde(default = "default_kind")]
    pub kind: TransactionKind,

    /// Commodity name
    pub commodity: String,

    /// Quantity (e.g., "1000" or "2.5")
    pub quantity: String,

    /// Quantity unit
    pub unit: CommodityUnit,

    /// Currency code (e.g., "IDR"), IDR when omitted
    pub currency: Option<String>,

    /// Buyer's notes
    pub notes: Option<String>,

    /// When the buyer placed the request, now when omitted
    pub started_at: Option<String>,
}

/// Step Fixture
#[derive(Debug, Deserialize)]
pub struct StepFixture {
    /// Action to take
    pub action: Action,

    /// When the step happens
    pub at: Option<String>,

    /// Unit price for `set_price` (e.g., "12000 IDR")
    pub price: Option<String>,

    /// Estimated arrival for `start_delivery`
    pub estimated_delivery: Option<String>,

    /// Courier for `start_delivery`
    pub courier: Option<String>,

    /// Tracking number for `complete_delivery`
    pub tracking_number: Option<String>,

    /// Proof of delivery flag for `complete_delivery`
    #[serde(default)]
    pub proof_provided: bool,
}

const fn default_kind() -> TransactionKind {
    TransactionKind::Regular
}

impl StepFixture {
    /// Build the lifecycle command this step describes.
    ///
    /// # Errors
    ///
    /// Returns an error if an input the action needs is missing or malformed.
    pub fn command(&self) -> Result<Command, FixtureError> {
        Ok(match self.action {
            Action::Confirm => Command::Confirm,
            Action::Decline => Command::Decline,
            Action::SetPrice => {
                let price = self
                    .price
                    .as_deref()
                    .ok_or_else(|| FixtureError::InvalidPrice("missing price".to_string()))?;

                let (minor_units, currency) = parse_price(price)?;

                Command::SetPrice(Money::from_minor(minor_units, currency))
            }
            Action::AgreeTerms => Command::AgreeTerms,
            Action::StartPreparation => Command::StartPreparation,
            Action::StartDelivery => {
                let estimated = self.estimated_delivery.as_deref().ok_or_else(|| {
                    FixtureError::InvalidTimestamp("missing estimated_delivery".to_string())
                })?;

                Command::StartDelivery(Dispatch {
                    estimated_delivery_date: parse_timestamp(estimated)?,
                    courier: self.courier.clone(),
                })
            }
            Action::CompleteDelivery => Command::CompleteDelivery(DeliveryEvidence {
                tracking_number: self.tracking_number.clone(),
                proof_provided: self.proof_provided,
            }),
            Action::ConfirmReceipt => Command::ConfirmReceipt,
            Action::Complete => Command::Complete,
            Action::Cancel => Command::Cancel,
        })
    }
}

impl Scenario {
    /// Parse a scenario from YAML
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Read and parse a scenario file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Request the transaction on behalf of fresh buyer and seller ids.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is malformed or the request is rejected.
    pub fn request(&self) -> Result<Transaction, FixtureError> {
        let fixture = &self.transaction;

        let currency = match fixture.currency.as_deref() {
            Some(code) => parse_currency(code)?,
            None => rusty_money::iso::IDR,
        };

        let mut new = NewTransaction::regular(
            fixture.commodity.clone(),
            UserId::generate(),
            UserId::generate(),
            parse_quantity(&fixture.quantity)?,
            fixture.unit,
        )
        .with_kind(fixture.kind)
        .with_currency(currency);

        if let Some(notes) = &fixture.notes {
            new = new.with_notes(notes.clone());
        }

        let started_at = match fixture.started_at.as_deref() {
            Some(at) => parse_timestamp(at)?,
            None => Timestamp::now(),
        };

        Transaction::request(new, started_at).map_err(FixtureError::Request)
    }

    /// Request the transaction and apply every step in order.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first step that is malformed or rejected.
    pub fn replay(&self) -> Result<Transaction, FixtureError> {
        let mut transaction = self.request()?;

        for (index, step) in self.steps.iter().enumerate() {
            let at = match step.at.as_deref() {
                Some(at) => parse_timestamp(at)?,
                None => transaction.updated_at() + SignedDuration::from_hours(1),
            };

            let command = step.command()?;

            transaction = transaction
                .apply(&command, at)
                .map_err(|source| FixtureError::Step {
                    index,
                    action: step.action.as_str(),
                    source,
                })?;

            debug!(
                index,
                action = %step.action,
                status = %transaction.status(),
                "replayed scenario step"
            );
        }

        Ok(transaction)
    }
}
