//! Transactions

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};

use crate::{
    ids::{TransactionId, UserId},
    status::{Locale, ShippingStatus, TransactionStatus},
};

pub mod snapshot;

/// The flow a transaction originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// A buyer requested a listed commodity directly.
    Regular,

    /// A farmer accepted a buyer's standing order book request.
    OrderBook,
}

/// Unit a commodity quantity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommodityUnit {
    /// Kilograms
    Kg,

    /// Metric tonnes
    Ton,

    /// Sacks
    Karung,

    /// Quintals (100 kg)
    Kuintal,

    /// Grams
    Gram,

    /// Bundles
    Ikat,
}

impl CommodityUnit {
    /// Unit label as shown to users.
    pub const fn as_str(self) -> &'static str {
        match self {
            CommodityUnit::Kg => "kg",
            CommodityUnit::Ton => "ton",
            CommodityUnit::Karung => "karung",
            CommodityUnit::Kuintal => "kuintal",
            CommodityUnit::Gram => "gram",
            CommodityUnit::Ikat => "ikat",
        }
    }
}

impl fmt::Display for CommodityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// When the change happened.
    pub at: Timestamp,

    /// Status entered.
    pub status: TransactionStatus,

    /// What happened.
    pub event: HistoryEvent,
}

impl HistoryEntry {
    /// What happened, for timelines.
    pub fn description(&self, locale: Locale) -> String {
        self.event.describe(locale)
    }
}

/// The change a history entry records, with whatever details its description needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// Transaction created from the given flow.
    Requested(TransactionKind),

    /// Seller confirmed.
    Confirmed,

    /// Seller declined.
    Declined,

    /// Seller set or revised the unit price.
    PriceSet {
        /// Price per unit
        unit_price: Money<'static, Currency>,

        /// Unit the price applies to
        unit: CommodityUnit,
    },

    /// Terms accepted and payment recorded.
    TermsAgreed,

    /// Shipment preparation began.
    PreparationStarted,

    /// Shipment left.
    Dispatched {
        /// Courier, if named
        courier: Option<String>,
    },

    /// Shipment arrived.
    Delivered {
        /// Courier tracking number, if given
        tracking_number: Option<String>,
    },

    /// Buyer confirmed receipt.
    Received,

    /// Transaction closed.
    Completed,

    /// Transaction cancelled.
    Cancelled,
}

impl HistoryEvent {
    /// Human readable description.
    pub fn describe(&self, locale: Locale) -> String {
        use Locale::{English, Indonesian};

        match (self, locale) {
            (HistoryEvent::Requested(TransactionKind::Regular), English) => {
                "Order placed by buyer".to_string()
            }
            (HistoryEvent::Requested(TransactionKind::Regular), Indonesian) => {
                "Pesanan dibuat oleh pembeli".to_string()
            }
            (HistoryEvent::Requested(TransactionKind::OrderBook), English) => {
                "Order created from order book".to_string()
            }
            (HistoryEvent::Requested(TransactionKind::OrderBook), Indonesian) => {
                "Pesanan dari order book".to_string()
            }
            (HistoryEvent::Confirmed, English) => "Order confirmed by seller".to_string(),
            (HistoryEvent::Confirmed, Indonesian) => {
                "Transaksi dikonfirmasi oleh penjual".to_string()
            }
            (HistoryEvent::Declined, English) => "Order declined by seller".to_string(),
            (HistoryEvent::Declined, Indonesian) => "Transaksi ditolak oleh penjual".to_string(),
            (HistoryEvent::PriceSet { unit_price, unit }, English) => {
                format!("Price set to {unit_price} per {unit}")
            }
            (HistoryEvent::PriceSet { unit_price, unit }, Indonesian) => {
                format!("Harga ditetapkan {unit_price} per {unit}")
            }
            (HistoryEvent::TermsAgreed, English) => "Terms and conditions approved".to_string(),
            (HistoryEvent::TermsAgreed, Indonesian) => "Syarat dan ketentuan disetujui".to_string(),
            (HistoryEvent::PreparationStarted, English) => {
                "Shipment preparation started".to_string()
            }
            (HistoryEvent::PreparationStarted, Indonesian) => {
                "Mulai persiapan pengiriman".to_string()
            }
            (HistoryEvent::Dispatched { courier: Some(courier) }, English) => {
                format!("Shipment dispatched via {courier}")
            }
            (HistoryEvent::Dispatched { courier: Some(courier) }, Indonesian) => {
                format!("Komoditas dikirim melalui {courier}")
            }
            (HistoryEvent::Dispatched { courier: None }, English) => {
                "Shipment dispatched".to_string()
            }
            (HistoryEvent::Dispatched { courier: None }, Indonesian) => {
                "Komoditas sedang dalam pengiriman".to_string()
            }
            (HistoryEvent::Delivered { tracking_number: Some(number) }, English) => {
                format!("Commodity delivered, tracking number {number}")
            }
            (HistoryEvent::Delivered { tracking_number: Some(number) }, Indonesian) => {
                format!("Komoditas telah dikirim, nomor resi {number}")
            }
            (HistoryEvent::Delivered { tracking_number: None }, English) => {
                "Commodity delivered".to_string()
            }
            (HistoryEvent::Delivered { tracking_number: None }, Indonesian) => {
                "Komoditas telah dikirim".to_string()
            }
            (HistoryEvent::Received, English) => "Goods received by buyer".to_string(),
            (HistoryEvent::Received, Indonesian) => "Komoditas diterima oleh pembeli".to_string(),
            (HistoryEvent::Completed, English) => "Transaction completed".to_string(),
            (HistoryEvent::Completed, Indonesian) => "Transaksi selesai".to_string(),
            (HistoryEvent::Cancelled, English) => "Transaction cancelled".to_string(),
            (HistoryEvent::Cancelled, Indonesian) => "Transaksi dibatalkan".to_string(),
        }
    }
}

/// Delivery details, filled in progressively as the shipment moves.
///
/// The dates and tracking number are each set by exactly one transition and never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shipment {
    /// Delivery sub-status, absent until preparation starts.
    pub status: Option<ShippingStatus>,

    /// Courier named at dispatch.
    pub courier: Option<String>,

    /// Courier tracking number recorded at delivery.
    pub tracking_number: Option<String>,

    /// When the shipment left.
    pub delivery_started_at: Option<Timestamp>,

    /// Expected arrival given at dispatch.
    pub estimated_delivery_date: Option<Timestamp>,

    /// When the seller marked it delivered.
    pub actual_delivery_date: Option<Timestamp>,
}

/// Details of a buyer's request, before it becomes a [`Transaction`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Identifier to create the transaction under.
    pub id: TransactionId,

    /// Originating flow.
    pub kind: TransactionKind,

    /// Commodity name, e.g. "Padi".
    pub commodity: String,

    /// Requesting buyer.
    pub buyer: UserId,

    /// Selling farmer.
    pub seller: UserId,

    /// Requested amount, must be positive.
    pub quantity: Decimal,

    /// Unit of `quantity`.
    pub unit: CommodityUnit,

    /// Currency prices will be quoted in.
    pub currency: &'static Currency,

    /// Free-form buyer notes.
    pub notes: Option<String>,
}

impl NewTransaction {
    /// A regular request priced in rupiah, with a freshly generated id.
    pub fn regular(
        commodity: impl Into<String>,
        buyer: UserId,
        seller: UserId,
        quantity: Decimal,
        unit: CommodityUnit,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            kind: TransactionKind::Regular,
            commodity: commodity.into(),
            buyer,
            seller,
            quantity,
            unit,
            currency: iso::IDR,
            notes: None,
        }
    }

    /// Change the originating flow.
    #[must_use]
    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Change the pricing currency.
    #[must_use]
    pub fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Attach buyer notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A commodity sale between a buyer and a farmer.
///
/// Fields are private: a transaction is created by [`Transaction::request`]
/// (or restored from a checked [`snapshot::TransactionSnapshot`]) and only
/// changes through the operations in [`crate::lifecycle`], which keep the
/// history and price invariants intact.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub(crate) id: TransactionId,
    pub(crate) kind: TransactionKind,
    pub(crate) commodity: String,
    pub(crate) buyer: UserId,
    pub(crate) seller: UserId,
    pub(crate) status: TransactionStatus,
    pub(crate) quantity: Decimal,
    pub(crate) unit: CommodityUnit,
    pub(crate) currency: &'static Currency,
    pub(crate) unit_price: Option<Money<'static, Currency>>,
    pub(crate) total_price: Option<Money<'static, Currency>>,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) shipment: Shipment,
    pub(crate) notes: Option<String>,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
}

impl Transaction {
    /// Transaction id
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Originating flow
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Commodity name
    pub fn commodity(&self) -> &str {
        &self.commodity
    }

    /// Buyer
    pub fn buyer(&self) -> UserId {
        self.buyer
    }

    /// Seller
    pub fn seller(&self) -> UserId {
        self.seller
    }

    /// Current status
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Quantity
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Unit of the quantity
    pub fn unit(&self) -> CommodityUnit {
        self.unit
    }

    /// Pricing currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Agreed or proposed price per unit, if the seller has set one.
    pub fn unit_price(&self) -> Option<&Money<'static, Currency>> {
        self.unit_price.as_ref()
    }

    /// `quantity * unit_price`, present exactly when the unit price is.
    pub fn total_price(&self) -> Option<&Money<'static, Currency>> {
        self.total_price.as_ref()
    }

    /// Status history, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Delivery details
    pub fn shipment(&self) -> &Shipment {
        &self.shipment
    }

    /// Delivery sub-status
    pub fn shipping_status(&self) -> Option<ShippingStatus> {
        self.shipment.status
    }

    /// Buyer notes
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Creation time
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Time of the latest accepted change
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Whether `user` is the buyer or the seller.
    pub fn involves(&self, user: UserId) -> bool {
        self.buyer == user || self.seller == user
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::IDR;

    use super::*;

    #[test]
    fn history_descriptions_follow_the_locale() {
        let entry = HistoryEntry {
            at: Timestamp::UNIX_EPOCH,
            status: TransactionStatus::Dikonfirmasi,
            event: HistoryEvent::Confirmed,
        };

        assert_eq!(
            entry.description(Locale::Indonesian),
            "Transaksi dikonfirmasi oleh penjual"
        );
        assert_eq!(entry.description(Locale::English), "Order confirmed by seller");
    }

    #[test]
    fn history_descriptions_include_event_details() {
        let priced = HistoryEvent::PriceSet {
            unit_price: Money::from_minor(1_200_000, IDR),
            unit: CommodityUnit::Kg,
        };
        let delivered = HistoryEvent::Delivered {
            tracking_number: Some("JNE0042".to_string()),
        };

        assert!(priced.describe(Locale::English).starts_with("Price set to "));
        assert!(priced.describe(Locale::Indonesian).ends_with(" per kg"));
        assert_eq!(
            delivered.describe(Locale::Indonesian),
            "Komoditas telah dikirim, nomor resi JNE0042"
        );
        assert_eq!(
            HistoryEvent::Dispatched { courier: None }.describe(Locale::English),
            "Shipment dispatched"
        );
    }

    #[test]
    fn new_transaction_builders_override_defaults() {
        let new = NewTransaction::regular(
            "Kopi",
            UserId::generate(),
            UserId::generate(),
            Decimal::from(50),
            CommodityUnit::Karung,
        )
        .with_kind(TransactionKind::OrderBook)
        .with_currency(iso::USD)
        .with_notes("Grade A only");

        assert_eq!(new.kind, TransactionKind::OrderBook);
        assert_eq!(new.currency, iso::USD);
        assert_eq!(new.notes.as_deref(), Some("Grade A only"));
    }

    #[test]
    fn regular_requests_default_to_rupiah() {
        let new = NewTransaction::regular(
            "Padi",
            UserId::generate(),
            UserId::generate(),
            Decimal::ONE,
            CommodityUnit::Kg,
        );

        assert_eq!(new.kind, TransactionKind::Regular);
        assert_eq!(new.currency, iso::IDR);
        assert!(new.notes.is_none());
    }

    #[test]
    fn unit_labels() {
        assert_eq!(CommodityUnit::Kuintal.to_string(), "kuintal");
        assert_eq!(CommodityUnit::Kg.as_str(), "kg");
    }
}
