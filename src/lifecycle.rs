//! Transaction lifecycle
//!
//! The single transition table for transactions, and the operations that
//! move a [`Transaction`] along it. Every operation takes the current value
//! and returns a new one; a rejected operation returns an error and leaves
//! the input as it was.
//!
//! ```text
//! menunggu_konfirmasi -> dikonfirmasi -> negosiasi -> dibayar -> persiapan_pengiriman
//!     -> sedang_dikirim -> sudah_dikirim -> diterima -> selesai
//!
//! any non-terminal status -> dibatalkan
//! ```

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    ids::UserId,
    pricing::{TotalPriceError, total_price},
    status::{ShippingStatus, TransactionStatus},
    transactions::{HistoryEntry, HistoryEvent, NewTransaction, Shipment, Transaction},
};

/// Errors for rejected lifecycle operations. A rejection never changes the transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The operation isn't allowed from the transaction's current status.
    #[error("cannot {action} a transaction that is {from}")]
    InvalidTransition {
        /// The rejected operation
        action: Action,

        /// Status the transaction was in
        from: TransactionStatus,
    },

    /// A price or quantity was zero or negative.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Terms can't be agreed before the seller has set a price.
    #[error("unit price has not been set")]
    PriceNotSet,

    /// Delivery was marked complete with neither a tracking number nor proof.
    #[error("delivery requires a tracking number or proof of delivery")]
    MissingDeliveryEvidence,

    /// A price was given in a different currency from the transaction (price currency, transaction currency).
    #[error("price is in {0}, but the transaction is priced in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The total price can't be represented.
    #[error("total price overflowed")]
    PriceOverflow,
}

impl From<TotalPriceError> for LifecycleError {
    fn from(error: TotalPriceError) -> Self {
        match error {
            TotalPriceError::Overflow => LifecycleError::PriceOverflow,
            TotalPriceError::NotPositive => LifecycleError::InvalidAmount,
        }
    }
}

/// Which side of the sale an actor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Seller
    Farmer,

    /// Purchaser
    Buyer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Farmer => "farmer",
            Role::Buyer => "buyer",
        })
    }
}

/// An authenticated user acting on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// User id from the identity provider
    pub id: UserId,

    /// Role the user acts in
    pub role: Role,
}

impl Actor {
    /// A farmer acting as seller.
    pub const fn farmer(id: UserId) -> Self {
        Self {
            id,
            role: Role::Farmer,
        }
    }

    /// A buyer.
    pub const fn buyer(id: UserId) -> Self {
        Self {
            id,
            role: Role::Buyer,
        }
    }
}

/// A lifecycle operation, independent of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Seller accepts the request.
    Confirm,

    /// Seller turns the request down.
    Decline,

    /// Seller sets or revises the unit price.
    SetPrice,

    /// Terms accepted and payment recorded.
    AgreeTerms,

    /// Seller starts preparing the shipment.
    StartPreparation,

    /// Shipment leaves.
    StartDelivery,

    /// Seller marks the shipment delivered.
    CompleteDelivery,

    /// Buyer confirms receipt.
    ConfirmReceipt,

    /// Transaction is closed.
    Complete,

    /// Either party abandons the transaction.
    Cancel,
}

impl Action {
    /// Every action, in happy-path order with the cancelling ones last.
    pub const ALL: [Action; 10] = [
        Action::Confirm,
        Action::SetPrice,
        Action::AgreeTerms,
        Action::StartPreparation,
        Action::StartDelivery,
        Action::CompleteDelivery,
        Action::ConfirmReceipt,
        Action::Complete,
        Action::Decline,
        Action::Cancel,
    ];

    /// Statuses this action may be applied from.
    pub const fn sources(self) -> &'static [TransactionStatus] {
        use TransactionStatus::{
            Dibayar, Dikonfirmasi, Diterima, MenungguKonfirmasi, Negosiasi, PersiapanPengiriman,
            SedangDikirim, SudahDikirim,
        };

        match self {
            Action::Confirm => &[MenungguKonfirmasi],
            Action::Decline => &[MenungguKonfirmasi, Dikonfirmasi],
            Action::SetPrice => &[Dikonfirmasi, Negosiasi],
            Action::AgreeTerms => &[Negosiasi],
            Action::StartPreparation => &[Dibayar],
            Action::StartDelivery => &[PersiapanPengiriman],
            Action::CompleteDelivery => &[SedangDikirim],
            Action::ConfirmReceipt => &[SudahDikirim],
            Action::Complete => &[Diterima],
            Action::Cancel => &[
                MenungguKonfirmasi,
                Dikonfirmasi,
                Negosiasi,
                Dibayar,
                PersiapanPengiriman,
                SedangDikirim,
                SudahDikirim,
                Diterima,
            ],
        }
    }

    /// Status a successful application of this action leads to.
    pub const fn target(self) -> TransactionStatus {
        match self {
            Action::Confirm => TransactionStatus::Dikonfirmasi,
            Action::SetPrice => TransactionStatus::Negosiasi,
            Action::AgreeTerms => TransactionStatus::Dibayar,
            Action::StartPreparation => TransactionStatus::PersiapanPengiriman,
            Action::StartDelivery => TransactionStatus::SedangDikirim,
            Action::CompleteDelivery => TransactionStatus::SudahDikirim,
            Action::ConfirmReceipt => TransactionStatus::Diterima,
            Action::Complete => TransactionStatus::Selesai,
            Action::Decline | Action::Cancel => TransactionStatus::Dibatalkan,
        }
    }

    /// Whether the action may be applied from `status`.
    pub fn permits(self, status: TransactionStatus) -> bool {
        self.sources().contains(&status)
    }

    /// Whether an actor in `role` may perform this action.
    ///
    /// The seller drives the sale up to delivery; the buyer confirms receipt
    /// and closes it. Either side may cancel.
    pub const fn allowed_for(self, role: Role) -> bool {
        match self {
            Action::Confirm
            | Action::Decline
            | Action::SetPrice
            | Action::AgreeTerms
            | Action::StartPreparation
            | Action::StartDelivery
            | Action::CompleteDelivery => matches!(role, Role::Farmer),
            Action::ConfirmReceipt | Action::Complete => matches!(role, Role::Buyer),
            Action::Cancel => true,
        }
    }

    /// Actions `role` could take on a transaction in `status`.
    pub fn available(status: TransactionStatus, role: Role) -> SmallVec<[Action; 4]> {
        Self::ALL
            .into_iter()
            .filter(|action| action.permits(status) && action.allowed_for(role))
            .collect()
    }

    /// Machine name
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Confirm => "confirm",
            Action::Decline => "decline",
            Action::SetPrice => "set_price",
            Action::AgreeTerms => "agree_terms",
            Action::StartPreparation => "start_preparation",
            Action::StartDelivery => "start_delivery",
            Action::CompleteDelivery => "complete_delivery",
            Action::ConfirmReceipt => "confirm_receipt",
            Action::Complete => "complete",
            Action::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch details given when a shipment leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Expected arrival
    pub estimated_delivery_date: Timestamp,

    /// Courier carrying the shipment
    pub courier: Option<String>,
}

impl Dispatch {
    /// Dispatch with an estimated arrival and no named courier.
    pub const fn arriving(estimated_delivery_date: Timestamp) -> Self {
        Self {
            estimated_delivery_date,
            courier: None,
        }
    }
}

/// Evidence that a shipment arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryEvidence {
    /// Courier tracking number
    pub tracking_number: Option<String>,

    /// Whether a photo or signed proof of delivery was uploaded
    pub proof_provided: bool,
}

impl DeliveryEvidence {
    /// Evidence consisting of a tracking number.
    pub fn tracking(number: impl Into<String>) -> Self {
        Self {
            tracking_number: Some(number.into()),
            proof_provided: false,
        }
    }

    /// Evidence consisting of uploaded proof.
    pub const fn proof() -> Self {
        Self {
            tracking_number: None,
            proof_provided: true,
        }
    }

    /// Tracking number with surrounding whitespace removed, `None` if blank.
    fn tracking_number(&self) -> Option<&str> {
        self.tracking_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
    }
}

/// A lifecycle operation together with its input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// See [`Transaction::confirm`].
    Confirm,

    /// See [`Transaction::decline`].
    Decline,

    /// See [`Transaction::set_price`].
    SetPrice(Money<'static, Currency>),

    /// See [`Transaction::agree_terms`].
    AgreeTerms,

    /// See [`Transaction::start_preparation`].
    StartPreparation,

    /// See [`Transaction::start_delivery`].
    StartDelivery(Dispatch),

    /// See [`Transaction::complete_delivery`].
    CompleteDelivery(DeliveryEvidence),

    /// See [`Transaction::confirm_receipt`].
    ConfirmReceipt,

    /// See [`Transaction::complete`].
    Complete,

    /// See [`Transaction::cancel`].
    Cancel,
}

impl Command {
    /// The action this command performs.
    pub const fn action(&self) -> Action {
        match self {
            Command::Confirm => Action::Confirm,
            Command::Decline => Action::Decline,
            Command::SetPrice(_) => Action::SetPrice,
            Command::AgreeTerms => Action::AgreeTerms,
            Command::StartPreparation => Action::StartPreparation,
            Command::StartDelivery(_) => Action::StartDelivery,
            Command::CompleteDelivery(_) => Action::CompleteDelivery,
            Command::ConfirmReceipt => Action::ConfirmReceipt,
            Command::Complete => Action::Complete,
            Command::Cancel => Action::Cancel,
        }
    }
}

impl Transaction {
    /// Creates a transaction from a buyer's request, awaiting seller confirmation.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidAmount`]: the quantity isn't positive.
    pub fn request(new: NewTransaction, at: Timestamp) -> Result<Self, LifecycleError> {
        if new.quantity <= Decimal::ZERO {
            return Err(LifecycleError::InvalidAmount);
        }

        Ok(Self {
            id: new.id,
            kind: new.kind,
            commodity: new.commodity,
            buyer: new.buyer,
            seller: new.seller,
            status: TransactionStatus::INITIAL,
            quantity: new.quantity,
            unit: new.unit,
            currency: new.currency,
            unit_price: None,
            total_price: None,
            history: vec![HistoryEntry {
                at,
                status: TransactionStatus::INITIAL,
                event: HistoryEvent::Requested(new.kind),
            }],
            shipment: Shipment::default(),
            notes: new.notes,
            created_at: at,
            updated_at: at,
        })
    }

    /// Applies `command`, dispatching to the matching operation.
    ///
    /// # Errors
    ///
    /// Returns whatever the dispatched operation returns.
    pub fn apply(&self, command: &Command, at: Timestamp) -> Result<Self, LifecycleError> {
        match command {
            Command::Confirm => self.confirm(at),
            Command::Decline => self.decline(at),
            Command::SetPrice(unit_price) => self.set_price(*unit_price, at),
            Command::AgreeTerms => self.agree_terms(at),
            Command::StartPreparation => self.start_preparation(at),
            Command::StartDelivery(dispatch) => self.start_delivery(dispatch, at),
            Command::CompleteDelivery(evidence) => self.complete_delivery(evidence, at),
            Command::ConfirmReceipt => self.confirm_receipt(at),
            Command::Complete => self.complete(at),
            Command::Cancel => self.cancel(at),
        }
    }

    /// Seller confirms the request.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: not awaiting confirmation.
    pub fn confirm(&self, at: Timestamp) -> Result<Self, LifecycleError> {
        self.advance(Action::Confirm, at, HistoryEvent::Confirmed, |_| {})
    }

    /// Seller declines the request, before any price has been negotiated.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: already past confirmation.
    pub fn decline(&self, at: Timestamp) -> Result<Self, LifecycleError> {
        self.advance(Action::Decline, at, HistoryEvent::Declined, |_| {})
    }

    /// Seller sets, or revises, the unit price. The total is recomputed from the quantity.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: not confirmed or negotiating.
    /// - [`LifecycleError::InvalidAmount`]: the price isn't positive.
    /// - [`LifecycleError::CurrencyMismatch`]: the price is in another currency.
    /// - [`LifecycleError::PriceOverflow`]: the total can't be represented.
    pub fn set_price(
        &self,
        unit_price: Money<'static, Currency>,
        at: Timestamp,
    ) -> Result<Self, LifecycleError> {
        self.ensure_permits(Action::SetPrice)?;

        if !unit_price.is_positive() {
            return Err(LifecycleError::InvalidAmount);
        }

        if unit_price.currency() != self.currency {
            return Err(LifecycleError::CurrencyMismatch(
                unit_price.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let total = total_price(self.quantity, &unit_price)?;
        let event = HistoryEvent::PriceSet {
            unit_price,
            unit: self.unit,
        };

        self.advance(Action::SetPrice, at, event, |transaction| {
            transaction.unit_price = Some(unit_price);
            transaction.total_price = Some(total);
        })
    }

    /// Terms are accepted and payment recorded.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: not negotiating.
    /// - [`LifecycleError::PriceNotSet`]: no unit price yet.
    pub fn agree_terms(&self, at: Timestamp) -> Result<Self, LifecycleError> {
        self.ensure_permits(Action::AgreeTerms)?;

        if self.unit_price.is_none() {
            return Err(LifecycleError::PriceNotSet);
        }

        self.advance(Action::AgreeTerms, at, HistoryEvent::TermsAgreed, |_| {})
    }

    /// Seller starts preparing the shipment.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: not paid.
    pub fn start_preparation(&self, at: Timestamp) -> Result<Self, LifecycleError> {
        self.advance(
            Action::StartPreparation,
            at,
            HistoryEvent::PreparationStarted,
            |transaction| transaction.shipment.status = Some(ShippingStatus::BelumDikirim),
        )
    }

    /// The shipment leaves.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: not preparing a shipment.
    pub fn start_delivery(
        &self,
        dispatch: &Dispatch,
        at: Timestamp,
    ) -> Result<Self, LifecycleError> {
        let event = HistoryEvent::Dispatched {
            courier: dispatch.courier.clone(),
        };

        self.advance(Action::StartDelivery, at, event, |transaction| {
            let shipment = &mut transaction.shipment;

            shipment.status = Some(ShippingStatus::SedangDikirim);
            shipment.delivery_started_at = Some(at);
            shipment.estimated_delivery_date = Some(dispatch.estimated_delivery_date);
            shipment.courier.clone_from(&dispatch.courier);
        })
    }

    /// Seller marks the shipment delivered.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: not in transit.
    /// - [`LifecycleError::MissingDeliveryEvidence`]: no tracking number and no proof.
    pub fn complete_delivery(
        &self,
        evidence: &DeliveryEvidence,
        at: Timestamp,
    ) -> Result<Self, LifecycleError> {
        self.ensure_permits(Action::CompleteDelivery)?;

        let tracking_number = evidence.tracking_number();

        if tracking_number.is_none() && !evidence.proof_provided {
            return Err(LifecycleError::MissingDeliveryEvidence);
        }

        let event = HistoryEvent::Delivered {
            tracking_number: tracking_number.map(str::to_string),
        };

        self.advance(Action::CompleteDelivery, at, event, |transaction| {
            let shipment = &mut transaction.shipment;

            shipment.status = Some(ShippingStatus::SudahDikirim);
            shipment.actual_delivery_date = Some(at);
            shipment.tracking_number = tracking_number.map(str::to_string);
        })
    }

    /// Buyer confirms the goods arrived.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: not marked delivered.
    pub fn confirm_receipt(&self, at: Timestamp) -> Result<Self, LifecycleError> {
        self.advance(
            Action::ConfirmReceipt,
            at,
            HistoryEvent::Received,
            |transaction| transaction.shipment.status = Some(ShippingStatus::Diterima),
        )
    }

    /// Closes a received transaction.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: receipt not confirmed.
    pub fn complete(&self, at: Timestamp) -> Result<Self, LifecycleError> {
        self.advance(Action::Complete, at, HistoryEvent::Completed, |_| {})
    }

    /// Cancels a transaction that hasn't finished.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidTransition`]: already completed or cancelled.
    pub fn cancel(&self, at: Timestamp) -> Result<Self, LifecycleError> {
        self.advance(Action::Cancel, at, HistoryEvent::Cancelled, |_| {})
    }

    /// Progress through the happy path, `None` once cancelled.
    pub fn progress_percent(&self) -> Option<Decimal> {
        self.status.progress_percent()
    }

    fn ensure_permits(&self, action: Action) -> Result<(), LifecycleError> {
        if action.permits(self.status) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                action,
                from: self.status,
            })
        }
    }

    /// Checks the source status, then returns a copy moved to the action's target with one
    /// history entry appended. `update` may only touch fields the action owns.
    fn advance(
        &self,
        action: Action,
        at: Timestamp,
        event: HistoryEvent,
        update: impl FnOnce(&mut Transaction),
    ) -> Result<Self, LifecycleError> {
        self.ensure_permits(action)?;

        let mut next = self.clone();
        let status = action.target();

        update(&mut next);

        next.status = status;
        next.updated_at = at;
        next.history.push(HistoryEntry {
            at,
            status,
            event,
        });

        Ok(next)
    }
}
