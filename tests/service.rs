//! End-to-end runs through the transactions service with the in-memory repository.

use std::sync::Arc;

use agrichain::prelude::*;
use async_trait::async_trait;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::IDR};
use testresult::TestResult;
use tokio::sync::Mutex;

#[derive(Debug, Default, Clone)]
struct RecordingNotifier {
    events: Arc<Mutex<Vec<TransitionEvent>>>,
}

impl RecordingNotifier {
    async fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl TransitionNotifier for RecordingNotifier {
    async fn notify(&self, event: TransitionEvent) {
        self.events.lock().await.push(event);
    }
}

struct Market {
    service: TransactionsService<InMemoryTransactionRepository, RecordingNotifier>,
    notifier: RecordingNotifier,
    farmer: Actor,
    buyer: Actor,
}

impl Market {
    fn new() -> Self {
        let notifier = RecordingNotifier::default();

        Self {
            service: TransactionsService::new(
                InMemoryTransactionRepository::new(),
                notifier.clone(),
            ),
            notifier,
            farmer: Actor::farmer(UserId::generate()),
            buyer: Actor::buyer(UserId::generate()),
        }
    }

    async fn request(&self) -> Result<Transaction, TransactionsServiceError> {
        self.service
            .request(
                self.buyer,
                NewTransaction::regular(
                    "Padi",
                    self.buyer.id,
                    self.farmer.id,
                    Decimal::from(1000),
                    CommodityUnit::Kg,
                ),
            )
            .await
    }
}

#[tokio::test]
async fn full_sale_alternates_notifications_between_the_parties() -> TestResult {
    let market = Market::new();
    let id = market.request().await?.id();

    let steps = [
        (market.farmer, Command::Confirm),
        (market.farmer, Command::SetPrice(Money::from_major(12_000, IDR))),
        (market.farmer, Command::AgreeTerms),
        (market.farmer, Command::StartPreparation),
        (
            market.farmer,
            Command::StartDelivery(Dispatch::arriving(Timestamp::now())),
        ),
        (
            market.farmer,
            Command::CompleteDelivery(DeliveryEvidence::tracking("JNE123")),
        ),
        (market.buyer, Command::ConfirmReceipt),
        (market.buyer, Command::Complete),
    ];

    for (actor, command) in steps {
        market.service.apply(actor, id, command).await?;
    }

    let completed = market.service.get(market.buyer, id).await?;

    assert_eq!(completed.status(), TransactionStatus::Selesai);
    assert_eq!(completed.history().len(), 9);
    assert_eq!(
        completed.total_price(),
        Some(&Money::from_major(12_000_000, IDR))
    );

    let events = market.notifier.events().await;

    assert_eq!(events.len(), 9);
    assert_eq!(events.first().map(|event| event.change), Some(Change::Requested));

    for event in &events {
        let expected = if event.actor == market.buyer {
            market.farmer.id
        } else {
            market.buyer.id
        };

        assert_eq!(event.recipient, expected);
        assert_eq!(event.transaction, id);
    }

    assert_eq!(
        events.last().map(|event| event.status),
        Some(TransactionStatus::Selesai)
    );

    Ok(())
}

#[tokio::test]
async fn buyers_cannot_drive_the_seller_side() -> TestResult {
    let market = Market::new();
    let id = market.request().await?.id();

    let result = market.service.apply(market.buyer, id, Command::Confirm).await;

    assert_eq!(result, Err(TransactionsServiceError::Forbidden));
    assert_eq!(market.notifier.events().await.len(), 1);

    Ok(())
}

#[tokio::test]
async fn either_party_can_cancel() -> TestResult {
    let market = Market::new();

    let first = market.request().await?.id();
    let second = market.request().await?.id();

    let by_buyer = market.service.apply(market.buyer, first, Command::Cancel).await?;
    let by_farmer = market.service.apply(market.farmer, second, Command::Cancel).await?;

    assert_eq!(by_buyer.status(), TransactionStatus::Dibatalkan);
    assert_eq!(by_farmer.status(), TransactionStatus::Dibatalkan);

    let again = market.service.apply(market.buyer, first, Command::Cancel).await;

    assert_eq!(
        again,
        Err(TransactionsServiceError::Lifecycle(
            LifecycleError::InvalidTransition {
                action: Action::Cancel,
                from: TransactionStatus::Dibatalkan,
            }
        ))
    );

    Ok(())
}

#[tokio::test]
async fn listing_filters_by_status() -> TestResult {
    let market = Market::new();

    let confirmed = market.request().await?.id();
    market.request().await?;

    market
        .service
        .apply(market.farmer, confirmed, Command::Confirm)
        .await?;

    let waiting = market
        .service
        .list(
            market.farmer,
            TransactionFilter::all().with_status(TransactionStatus::MenungguKonfirmasi),
        )
        .await?;

    let all = market
        .service
        .list(market.buyer, TransactionFilter::all())
        .await?;

    assert_eq!(waiting.len(), 1);
    assert_eq!(all.len(), 2);

    Ok(())
}

#[tokio::test]
async fn unknown_transactions_are_not_found() {
    let market = Market::new();

    let result = market
        .service
        .apply(market.farmer, TransactionId::generate(), Command::Confirm)
        .await;

    assert_eq!(
        result,
        Err(TransactionsServiceError::Repository(RepositoryError::NotFound))
    );
}
