//! Agrichain prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    fixtures::{Fixture, FixtureError, scenarios::Scenario},
    ids::{TransactionId, TypedUuid, UserId},
    lifecycle::{Action, Actor, Command, DeliveryEvidence, Dispatch, LifecycleError, Role},
    pricing::{TotalPriceError, total_price},
    report::{ReportError, TransactionReport, TransitionTable},
    service::{
        InMemoryTransactionRepository, RepositoryError, TracingNotifier, TransactionFilter,
        TransactionRepository, TransactionsService, TransactionsServiceError, TransitionNotifier,
        notifier::{Change, TransitionEvent},
        repository::{Revision, StoredTransaction},
    },
    status::{Locale, ShippingStatus, TransactionStatus, UnknownStatus},
    transactions::{
        CommodityUnit, HistoryEntry, HistoryEvent, NewTransaction, Shipment, Transaction,
        TransactionKind,
        snapshot::{SnapshotError, TransactionSnapshot},
    },
};
