//! In-memory transaction repository.

use std::cmp::Reverse;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::{
    ids::TransactionId,
    service::repository::{
        RepositoryError, Revision, StoredTransaction, TransactionFilter, TransactionRepository,
    },
    transactions::Transaction,
};

/// A [`TransactionRepository`] holding everything in a map, for tests, demos and replay.
#[derive(Debug, Default)]
pub struct InMemoryTransactionRepository {
    transactions: RwLock<FxHashMap<TransactionId, StoredTransaction>>,
}

impl InMemoryTransactionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions.
    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.transactions.read().await.is_empty()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn get(&self, id: TransactionId) -> Result<StoredTransaction, RepositoryError> {
        self.transactions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn insert(&self, transaction: Transaction) -> Result<StoredTransaction, RepositoryError> {
        let mut transactions = self.transactions.write().await;

        if transactions.contains_key(&transaction.id()) {
            return Err(RepositoryError::AlreadyExists);
        }

        let stored = StoredTransaction {
            transaction,
            revision: 1,
        };

        transactions.insert(stored.transaction.id(), stored.clone());

        Ok(stored)
    }

    async fn update(
        &self,
        transaction: Transaction,
        expected: Revision,
    ) -> Result<StoredTransaction, RepositoryError> {
        let mut transactions = self.transactions.write().await;

        let current = transactions
            .get_mut(&transaction.id())
            .ok_or(RepositoryError::NotFound)?;

        if current.revision != expected {
            return Err(RepositoryError::Conflict {
                expected,
                actual: current.revision,
            });
        }

        current.transaction = transaction;
        current.revision += 1;

        Ok(current.clone())
    }

    async fn list(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<StoredTransaction>, RepositoryError> {
        let mut matching: Vec<StoredTransaction> = self
            .transactions
            .read()
            .await
            .values()
            .filter(|stored| filter.matches(&stored.transaction))
            .cloned()
            .collect();

        matching.sort_by_key(|stored| {
            Reverse((stored.transaction.created_at(), stored.transaction.id()))
        });

        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{
        ids::UserId,
        status::TransactionStatus,
        transactions::{CommodityUnit, NewTransaction},
    };

    fn transaction(buyer: UserId, hours: i64) -> Result<Transaction, crate::lifecycle::LifecycleError> {
        Transaction::request(
            NewTransaction::regular(
                "Padi",
                buyer,
                UserId::generate(),
                Decimal::from(100),
                CommodityUnit::Kg,
            ),
            Timestamp::UNIX_EPOCH + SignedDuration::from_hours(hours),
        )
    }

    #[tokio::test]
    async fn insert_then_get_returns_revision_one() -> TestResult {
        let repository = InMemoryTransactionRepository::new();
        let transaction = transaction(UserId::generate(), 0)?;
        let id = transaction.id();

        repository.insert(transaction).await?;

        let stored = repository.get(id).await?;

        assert_eq!(stored.revision, 1);
        assert_eq!(stored.transaction.id(), id);
        assert_eq!(repository.len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let repository = InMemoryTransactionRepository::new();

        let result = repository.get(TransactionId::generate()).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() -> TestResult {
        let repository = InMemoryTransactionRepository::new();
        let transaction = transaction(UserId::generate(), 0)?;

        repository.insert(transaction.clone()).await?;

        let result = repository.insert(transaction).await;

        assert_eq!(result, Err(RepositoryError::AlreadyExists));

        Ok(())
    }

    #[tokio::test]
    async fn update_bumps_the_revision() -> TestResult {
        let repository = InMemoryTransactionRepository::new();
        let stored = repository.insert(transaction(UserId::generate(), 0)?).await?;

        let confirmed = stored.transaction.confirm(Timestamp::UNIX_EPOCH)?;
        let updated = repository.update(confirmed, stored.revision).await?;

        assert_eq!(updated.revision, 2);
        assert_eq!(updated.transaction.status(), TransactionStatus::Dikonfirmasi);

        Ok(())
    }

    #[tokio::test]
    async fn stale_update_conflicts_and_keeps_the_stored_value() -> TestResult {
        let repository = InMemoryTransactionRepository::new();
        let stored = repository.insert(transaction(UserId::generate(), 0)?).await?;

        let confirmed = stored.transaction.confirm(Timestamp::UNIX_EPOCH)?;
        repository.update(confirmed, stored.revision).await?;

        let cancelled = stored.transaction.cancel(Timestamp::UNIX_EPOCH)?;
        let result = repository.update(cancelled, stored.revision).await;

        assert_eq!(
            result,
            Err(RepositoryError::Conflict {
                expected: 1,
                actual: 2
            })
        );

        let current = repository.get(stored.transaction.id()).await?;

        assert_eq!(current.transaction.status(), TransactionStatus::Dikonfirmasi);

        Ok(())
    }

    #[tokio::test]
    async fn update_of_unknown_transaction_is_not_found() -> TestResult {
        let repository = InMemoryTransactionRepository::new();

        let result = repository.update(transaction(UserId::generate(), 0)?, 1).await;

        assert_eq!(result, Err(RepositoryError::NotFound));

        Ok(())
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() -> TestResult {
        let repository = InMemoryTransactionRepository::new();
        let buyer = UserId::generate();

        let older = repository.insert(transaction(buyer, 0)?).await?;
        let newer = repository.insert(transaction(buyer, 5)?).await?;
        let other = repository.insert(transaction(UserId::generate(), 3)?).await?;

        let confirmed = other.transaction.confirm(Timestamp::UNIX_EPOCH)?;
        repository.update(confirmed, other.revision).await?;

        let mine = repository
            .list(TransactionFilter::all().with_party(buyer))
            .await?;

        let ids: Vec<_> = mine.iter().map(|stored| stored.transaction.id()).collect();

        assert_eq!(ids, [newer.transaction.id(), older.transaction.id()]);

        let confirmed = repository
            .list(TransactionFilter::all().with_status(TransactionStatus::Dikonfirmasi))
            .await?;

        assert_eq!(confirmed.len(), 1);
        assert_eq!(repository.list(TransactionFilter::all()).await?.len(), 3);

        Ok(())
    }
}
