//! Transactions service
//!
//! Glue between the pure lifecycle and its collaborators: load from the
//! repository, check who is acting, apply the transition, store it against
//! the loaded revision, then notify the other party.

use jiff::Timestamp;
use tracing::{Span, debug, info, warn};

use crate::{
    ids::TransactionId,
    lifecycle::{Action, Actor, Command, Role},
    service::notifier::{Change, TransitionEvent},
    transactions::{NewTransaction, Transaction},
};

pub mod errors;
pub mod memory;
pub mod notifier;
pub mod repository;

pub use errors::TransactionsServiceError;
pub use memory::InMemoryTransactionRepository;
pub use notifier::{TracingNotifier, TransitionNotifier};
pub use repository::{RepositoryError, TransactionFilter, TransactionRepository};

/// Runs lifecycle operations on stored transactions on behalf of an [`Actor`].
#[derive(Debug)]
pub struct TransactionsService<R, N> {
    repository: R,
    notifier: N,
}

impl<R: TransactionRepository, N: TransitionNotifier> TransactionsService<R, N> {
    /// Create a service over the given collaborators.
    pub fn new(repository: R, notifier: N) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// A buyer requests a commodity, creating a transaction awaiting the seller.
    ///
    /// # Errors
    ///
    /// - [`TransactionsServiceError::Forbidden`]: the actor isn't the requesting buyer.
    /// - [`TransactionsServiceError::Lifecycle`]: the request is invalid.
    /// - [`TransactionsServiceError::Repository`]: the id is taken or storage failed.
    #[tracing::instrument(
        name = "transactions.service.request",
        skip(self, new),
        fields(transaction = %new.id, actor = %actor.id),
        err
    )]
    pub async fn request(
        &self,
        actor: Actor,
        new: NewTransaction,
    ) -> Result<Transaction, TransactionsServiceError> {
        if actor.role != Role::Buyer || actor.id != new.buyer {
            warn!(role = %actor.role, "only the buyer can request a transaction");

            return Err(TransactionsServiceError::Forbidden);
        }

        let recipient = new.seller;
        let transaction = Transaction::request(new, Timestamp::now())?;
        let stored = self.repository.insert(transaction).await?;

        info!(status = %stored.transaction.status(), "transaction requested");

        self.notifier
            .notify(TransitionEvent {
                transaction: stored.transaction.id(),
                change: Change::Requested,
                status: stored.transaction.status(),
                actor,
                recipient,
                at: stored.transaction.created_at(),
            })
            .await;

        Ok(stored.transaction)
    }

    /// Apply `command` to a stored transaction.
    ///
    /// Nothing is stored and nobody is notified unless every check passes.
    ///
    /// # Errors
    ///
    /// - [`TransactionsServiceError::Forbidden`]: the actor isn't the party that may take this action.
    /// - [`TransactionsServiceError::Lifecycle`]: the transition was rejected.
    /// - [`TransactionsServiceError::Repository`]: not found, or changed since it was loaded.
    #[tracing::instrument(
        name = "transactions.service.apply",
        skip(self, command),
        fields(actor = %actor.id, action = %command.action(), from = tracing::field::Empty),
        err
    )]
    pub async fn apply(
        &self,
        actor: Actor,
        id: TransactionId,
        command: Command,
    ) -> Result<Transaction, TransactionsServiceError> {
        let stored = self.repository.get(id).await?;
        let action = command.action();
        let from = stored.transaction.status();

        Span::current().record("from", tracing::field::display(from));

        authorize(actor, action, &stored.transaction)?;

        let next = stored
            .transaction
            .apply(&command, Timestamp::now())
            .inspect_err(|error| warn!(%error, "transition rejected"))?;

        let saved = self
            .repository
            .update(next, stored.revision)
            .await
            .inspect_err(|error| debug!(%error, "transition not stored"))?;

        let transaction = saved.transaction;

        info!(to = %transaction.status(), revision = saved.revision, "transition stored");

        self.notifier
            .notify(TransitionEvent {
                transaction: id,
                change: Change::Applied { action, from },
                status: transaction.status(),
                actor,
                recipient: counterparty(actor, &transaction),
                at: transaction.updated_at(),
            })
            .await;

        Ok(transaction)
    }

    /// Load a transaction the actor is party to.
    ///
    /// # Errors
    ///
    /// - [`TransactionsServiceError::Forbidden`]: the actor is neither buyer nor seller.
    /// - [`TransactionsServiceError::Repository`]: not found.
    pub async fn get(
        &self,
        actor: Actor,
        id: TransactionId,
    ) -> Result<Transaction, TransactionsServiceError> {
        let stored = self.repository.get(id).await?;

        if !stored.transaction.involves(actor.id) {
            return Err(TransactionsServiceError::Forbidden);
        }

        Ok(stored.transaction)
    }

    /// The actor's transactions matching `filter`, most recent first.
    ///
    /// The filter is always narrowed to the actor; a `party` naming anyone else is refused.
    ///
    /// # Errors
    ///
    /// - [`TransactionsServiceError::Forbidden`]: the filter names another party.
    /// - [`TransactionsServiceError::Repository`]: storage failed.
    pub async fn list(
        &self,
        actor: Actor,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, TransactionsServiceError> {
        if filter.party.is_some_and(|party| party != actor.id) {
            warn!(role = %actor.role, "actor may not list another party's transactions");

            return Err(TransactionsServiceError::Forbidden);
        }

        let stored = self.repository.list(filter.with_party(actor.id)).await?;

        Ok(stored.into_iter().map(|stored| stored.transaction).collect())
    }
}

/// The actor must hold the role the action needs and be that side of this transaction.
fn authorize(
    actor: Actor,
    action: Action,
    transaction: &Transaction,
) -> Result<(), TransactionsServiceError> {
    let party = match actor.role {
        Role::Farmer => transaction.seller(),
        Role::Buyer => transaction.buyer(),
    };

    if actor.id == party && action.allowed_for(actor.role) {
        Ok(())
    } else {
        warn!(role = %actor.role, %action, "actor may not perform action");

        Err(TransactionsServiceError::Forbidden)
    }
}

fn counterparty(actor: Actor, transaction: &Transaction) -> crate::ids::UserId {
    match actor.role {
        Role::Farmer => transaction.buyer(),
        Role::Buyer => transaction.seller(),
    }
}
