//! Transaction snapshots
//!
//! A plain, fully public view of a [`Transaction`] for storage layers. Rebuilding a
//! transaction from a snapshot re-checks the invariants the lifecycle maintains, so a
//! corrupted row can't smuggle an inconsistent transaction back in.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    ids::{TransactionId, UserId},
    pricing::{TotalPriceError, total_price},
    status::TransactionStatus,
    transactions::{CommodityUnit, HistoryEntry, Shipment, Transaction, TransactionKind},
};

/// Reasons a snapshot can't be turned back into a transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Every transaction has at least its creation entry.
    #[error("history is empty")]
    EmptyHistory,

    /// The latest history entry disagrees with the status.
    #[error("status is {status}, but the latest history entry is {latest}")]
    StatusMismatch {
        /// Stored status
        status: TransactionStatus,

        /// Status of the latest history entry
        latest: TransactionStatus,
    },

    /// Quantity isn't positive.
    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    /// Unit price isn't positive.
    #[error("unit price must be greater than zero")]
    InvalidPrice,

    /// Unit price is in a different currency from the transaction (price currency, transaction currency).
    #[error("unit price is in {0}, but the transaction is priced in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Only one of unit price and total price is present.
    #[error("unit price and total price must be set together")]
    PartialPrice,

    /// Total price isn't quantity times unit price.
    #[error("total price does not match quantity times unit price")]
    TotalMismatch,

    /// Total price can't be recomputed.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// Every field of a [`Transaction`], as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSnapshot {
    /// See [`Transaction::id`].
    pub id: TransactionId,
    /// See [`Transaction::kind`].
    pub kind: TransactionKind,
    /// See [`Transaction::commodity`].
    pub commodity: String,
    /// See [`Transaction::buyer`].
    pub buyer: UserId,
    /// See [`Transaction::seller`].
    pub seller: UserId,
    /// See [`Transaction::status`].
    pub status: TransactionStatus,
    /// See [`Transaction::quantity`].
    pub quantity: Decimal,
    /// See [`Transaction::unit`].
    pub unit: CommodityUnit,
    /// See [`Transaction::currency`].
    pub currency: &'static Currency,
    /// See [`Transaction::unit_price`].
    pub unit_price: Option<Money<'static, Currency>>,
    /// See [`Transaction::total_price`].
    pub total_price: Option<Money<'static, Currency>>,
    /// See [`Transaction::history`].
    pub history: Vec<HistoryEntry>,
    /// See [`Transaction::shipment`].
    pub shipment: Shipment,
    /// See [`Transaction::notes`].
    pub notes: Option<String>,
    /// See [`Transaction::created_at`].
    pub created_at: Timestamp,
    /// See [`Transaction::updated_at`].
    pub updated_at: Timestamp,
}

impl From<Transaction> for TransactionSnapshot {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            kind: transaction.kind,
            commodity: transaction.commodity,
            buyer: transaction.buyer,
            seller: transaction.seller,
            status: transaction.status,
            quantity: transaction.quantity,
            unit: transaction.unit,
            currency: transaction.currency,
            unit_price: transaction.unit_price,
            total_price: transaction.total_price,
            history: transaction.history,
            shipment: transaction.shipment,
            notes: transaction.notes,
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }
}

impl TryFrom<TransactionSnapshot> for Transaction {
    type Error = SnapshotError;

    fn try_from(snapshot: TransactionSnapshot) -> Result<Self, Self::Error> {
        let latest = snapshot
            .history
            .last()
            .ok_or(SnapshotError::EmptyHistory)?
            .status;

        if latest != snapshot.status {
            return Err(SnapshotError::StatusMismatch {
                status: snapshot.status,
                latest,
            });
        }

        if snapshot.quantity <= Decimal::ZERO {
            return Err(SnapshotError::InvalidQuantity);
        }

        match (&snapshot.unit_price, &snapshot.total_price) {
            (None, None) => {}
            (Some(unit_price), Some(total)) => {
                if !unit_price.is_positive() {
                    return Err(SnapshotError::InvalidPrice);
                }

                if unit_price.currency() != snapshot.currency {
                    return Err(SnapshotError::CurrencyMismatch(
                        unit_price.currency().iso_alpha_code,
                        snapshot.currency.iso_alpha_code,
                    ));
                }

                if total_price(snapshot.quantity, unit_price)? != *total {
                    return Err(SnapshotError::TotalMismatch);
                }
            }
            _ => return Err(SnapshotError::PartialPrice),
        }

        Ok(Self {
            id: snapshot.id,
            kind: snapshot.kind,
            commodity: snapshot.commodity,
            buyer: snapshot.buyer,
            seller: snapshot.seller,
            status: snapshot.status,
            quantity: snapshot.quantity,
            unit: snapshot.unit,
            currency: snapshot.currency,
            unit_price: snapshot.unit_price,
            total_price: snapshot.total_price,
            history: snapshot.history,
            shipment: snapshot.shipment,
            notes: snapshot.notes,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{IDR, USD};
    use testresult::TestResult;

    use super::*;
    use crate::transactions::NewTransaction;

    fn snapshot() -> Result<TransactionSnapshot, crate::lifecycle::LifecycleError> {
        let transaction = Transaction::request(
            NewTransaction::regular(
                "Kedelai",
                UserId::generate(),
                UserId::generate(),
                Decimal::from(3),
                CommodityUnit::Kuintal,
            ),
            Timestamp::UNIX_EPOCH,
        )?;

        Ok(transaction.into())
    }

    #[test]
    fn round_trips_an_unchanged_transaction() -> TestResult {
        let original = snapshot()?;

        let restored = Transaction::try_from(original.clone())?;

        assert_eq!(TransactionSnapshot::from(restored), original);

        Ok(())
    }

    #[test]
    fn rejects_empty_history() -> TestResult {
        let mut broken = snapshot()?;
        broken.history.clear();

        assert_eq!(
            Transaction::try_from(broken),
            Err(SnapshotError::EmptyHistory)
        );

        Ok(())
    }

    #[test]
    fn rejects_status_that_disagrees_with_history() -> TestResult {
        let mut broken = snapshot()?;
        broken.status = TransactionStatus::Dibayar;

        assert_eq!(
            Transaction::try_from(broken),
            Err(SnapshotError::StatusMismatch {
                status: TransactionStatus::Dibayar,
                latest: TransactionStatus::MenungguKonfirmasi,
            })
        );

        Ok(())
    }

    #[test]
    fn rejects_a_unit_price_without_a_total() -> TestResult {
        let mut broken = snapshot()?;
        broken.unit_price = Some(Money::from_minor(100, IDR));

        assert_eq!(
            Transaction::try_from(broken),
            Err(SnapshotError::PartialPrice)
        );

        Ok(())
    }

    #[test]
    fn rejects_a_total_that_does_not_match() -> TestResult {
        let mut broken = snapshot()?;
        broken.unit_price = Some(Money::from_minor(100, IDR));
        broken.total_price = Some(Money::from_minor(100, IDR));

        assert_eq!(
            Transaction::try_from(broken),
            Err(SnapshotError::TotalMismatch)
        );

        Ok(())
    }

    #[test]
    fn rejects_non_positive_unit_prices() -> TestResult {
        let mut broken = snapshot()?;
        broken.unit_price = Some(Money::from_minor(-500, IDR));
        broken.total_price = Some(Money::from_minor(-1500, IDR));

        assert_eq!(
            Transaction::try_from(broken),
            Err(SnapshotError::InvalidPrice)
        );

        Ok(())
    }

    #[test]
    fn rejects_a_unit_price_in_another_currency() -> TestResult {
        let mut broken = snapshot()?;
        broken.unit_price = Some(Money::from_minor(500, USD));
        broken.total_price = Some(Money::from_minor(1500, USD));

        assert_eq!(
            Transaction::try_from(broken),
            Err(SnapshotError::CurrencyMismatch(
                USD.iso_alpha_code,
                IDR.iso_alpha_code
            ))
        );

        Ok(())
    }

    #[test]
    fn restores_a_priced_transaction() -> TestResult {
        let mut priced = snapshot()?;
        priced.unit_price = Some(Money::from_minor(500, IDR));
        priced.total_price = Some(Money::from_minor(1500, IDR));

        let restored = Transaction::try_from(priced)?;

        assert_eq!(restored.total_price(), Some(&Money::from_minor(1500, IDR)));

        Ok(())
    }

    #[test]
    fn rejects_non_positive_quantities() -> TestResult {
        let mut broken = snapshot()?;
        broken.quantity = Decimal::ZERO;

        assert_eq!(
            Transaction::try_from(broken),
            Err(SnapshotError::InvalidQuantity)
        );

        Ok(())
    }
}
