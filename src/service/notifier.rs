//! Transition notifications.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    ids::{TransactionId, UserId},
    lifecycle::{Action, Actor},
    status::TransactionStatus,
};

/// What happened to the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A buyer created the transaction.
    Requested,

    /// An action moved the transaction on.
    Applied {
        /// The action taken
        action: Action,

        /// Status before the action
        from: TransactionStatus,
    },
}

/// A stored change, sent to the counterparty of whoever made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// Affected transaction
    pub transaction: TransactionId,

    /// What happened
    pub change: Change,

    /// Status after the change
    pub status: TransactionStatus,

    /// Who made the change
    pub actor: Actor,

    /// The other party, who should hear about it
    pub recipient: UserId,

    /// When it happened
    pub at: Timestamp,
}

/// Receives an event after every stored change, at most once per change.
///
/// Delivery is fire-and-forget: implementations handle their own failures and
/// can't fail the change that triggered them.
#[automock]
#[async_trait]
pub trait TransitionNotifier: Send + Sync {
    /// Deliver `event`.
    async fn notify(&self, event: TransitionEvent);
}

/// Notifier that writes each event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl TransitionNotifier for TracingNotifier {
    async fn notify(&self, event: TransitionEvent) {
        match event.change {
            Change::Requested => info!(
                transaction = %event.transaction,
                recipient = %event.recipient,
                "new transaction requested"
            ),
            Change::Applied { action, from } => info!(
                transaction = %event.transaction,
                recipient = %event.recipient,
                actor_role = %event.actor.role,
                %action,
                %from,
                to = %event.status,
                "transaction status changed"
            ),
        }
    }
}
