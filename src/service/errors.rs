//! Transactions service errors.

use thiserror::Error;

use crate::{lifecycle::LifecycleError, service::repository::RepositoryError};

/// Errors returned by [`crate::service::TransactionsService`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionsServiceError {
    /// The actor's role or identity doesn't allow the operation.
    #[error("not allowed to perform this operation")]
    Forbidden,

    /// The lifecycle rejected the operation.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Storage failed or the transaction changed concurrently.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
