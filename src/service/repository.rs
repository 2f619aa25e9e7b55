//! Transaction persistence seam.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    ids::{TransactionId, UserId},
    status::TransactionStatus,
    transactions::Transaction,
};

/// Per-transaction revision, bumped on every stored change.
pub type Revision = u64;

/// Errors raised by a [`TransactionRepository`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No transaction with the given id.
    #[error("transaction not found")]
    NotFound,

    /// A transaction with the same id is already stored.
    #[error("transaction already exists")]
    AlreadyExists,

    /// Someone else stored a change since the transaction was loaded.
    #[error("transaction was modified concurrently (expected revision {expected}, found {actual})")]
    Conflict {
        /// Revision the writer loaded
        expected: Revision,

        /// Revision currently stored
        actual: Revision,
    },
}

/// A transaction together with the revision it was stored at.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTransaction {
    /// The stored value
    pub transaction: Transaction,

    /// Revision to pass back to [`TransactionRepository::update`]
    pub revision: Revision,
}

/// Which transactions [`TransactionRepository::list`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only transactions currently in this status
    pub status: Option<TransactionStatus>,

    /// Only transactions this user buys or sells in
    pub party: Option<UserId>,
}

impl TransactionFilter {
    /// Matches every transaction.
    pub const fn all() -> Self {
        Self {
            status: None,
            party: None,
        }
    }

    /// Restrict to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to one party.
    #[must_use]
    pub const fn with_party(mut self, party: UserId) -> Self {
        self.party = Some(party);
        self
    }

    /// Whether `transaction` passes the filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.status
            .is_none_or(|status| transaction.status() == status)
            && self.party.is_none_or(|party| transaction.involves(party))
    }
}

/// Storage for transactions.
///
/// Implementations must store a transaction's status and history together: a reader never
/// sees one without the other.
#[automock]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Load a transaction.
    async fn get(&self, id: TransactionId) -> Result<StoredTransaction, RepositoryError>;

    /// Store a new transaction at revision 1.
    async fn insert(&self, transaction: Transaction) -> Result<StoredTransaction, RepositoryError>;

    /// Replace a transaction, provided it is still at `expected` revision.
    async fn update(
        &self,
        transaction: Transaction,
        expected: Revision,
    ) -> Result<StoredTransaction, RepositoryError>;

    /// List matching transactions, most recently created first.
    async fn list(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<StoredTransaction>, RepositoryError>;
}
