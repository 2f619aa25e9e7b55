//! Acceptance scenarios for the transaction lifecycle.
//!
//! A: a confirmed 1000 kg request priced at 12,000 per kg is under negotiation
//!    with a 12,000,000 total.
//! B: terms can't be agreed on a negotiation that has no price.
//! C: delivery can't be completed without a tracking number or proof.
//! D: a tracking number completes delivery and records the arrival.
//! E: a completed transaction can no longer be cancelled.

use agrichain::prelude::*;
use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::IDR};
use testresult::TestResult;

fn at(hours: i64) -> Timestamp {
    Timestamp::UNIX_EPOCH + SignedDuration::from_hours(hours)
}

fn request(quantity: i64) -> Result<Transaction, LifecycleError> {
    Transaction::request(
        NewTransaction::regular(
            "Padi",
            UserId::generate(),
            UserId::generate(),
            Decimal::from(quantity),
            CommodityUnit::Kg,
        ),
        at(0),
    )
}

fn in_transit() -> Result<Transaction, LifecycleError> {
    request(1000)?
        .confirm(at(1))?
        .set_price(Money::from_major(12_000, IDR), at(2))?
        .agree_terms(at(3))?
        .start_preparation(at(4))?
        .start_delivery(&Dispatch::arriving(at(72)), at(5))
}

#[test]
fn scenario_a_pricing_a_confirmed_request() -> TestResult {
    let transaction = request(1000)?
        .confirm(at(1))?
        .set_price(Money::from_major(12_000, IDR), at(2))?;

    assert_eq!(transaction.status(), TransactionStatus::Negosiasi);
    assert_eq!(
        transaction.total_price(),
        Some(&Money::from_major(12_000_000, IDR))
    );

    Ok(())
}

#[test]
fn scenario_b_agreeing_without_a_price() -> TestResult {
    // Only a stored record can be in negotiation without a price.
    let negotiating = request(1000)?
        .confirm(at(1))?
        .set_price(Money::from_major(12_000, IDR), at(2))?;
    let mut snapshot = TransactionSnapshot::from(negotiating);

    snapshot.unit_price = None;
    snapshot.total_price = None;

    let transaction = Transaction::try_from(snapshot)?;

    let result = transaction.agree_terms(at(3));

    assert_eq!(result, Err(LifecycleError::PriceNotSet));
    assert_eq!(transaction.status(), TransactionStatus::Negosiasi);

    Ok(())
}

#[test]
fn scenario_c_delivery_without_evidence() -> TestResult {
    let transaction = in_transit()?;

    let result = transaction.complete_delivery(
        &DeliveryEvidence {
            tracking_number: None,
            proof_provided: false,
        },
        at(40),
    );

    assert_eq!(result, Err(LifecycleError::MissingDeliveryEvidence));
    assert_eq!(transaction.status(), TransactionStatus::SedangDikirim);

    Ok(())
}

#[test]
fn scenario_d_delivery_with_a_tracking_number() -> TestResult {
    let transaction = in_transit()?.complete_delivery(
        &DeliveryEvidence {
            tracking_number: Some("JNE123".to_string()),
            proof_provided: false,
        },
        at(40),
    )?;

    assert_eq!(transaction.status(), TransactionStatus::SudahDikirim);
    assert_eq!(
        transaction.shipping_status(),
        Some(ShippingStatus::SudahDikirim)
    );
    assert_eq!(transaction.shipment().actual_delivery_date, Some(at(40)));
    assert_eq!(
        transaction.shipment().tracking_number.as_deref(),
        Some("JNE123")
    );

    Ok(())
}

#[test]
fn scenario_e_completed_transactions_cannot_be_cancelled() -> TestResult {
    let received = in_transit()?
        .complete_delivery(&DeliveryEvidence::tracking("JNE123"), at(40))?
        .confirm_receipt(at(41))?;

    let completed = received.complete(at(42))?;

    assert_eq!(completed.status(), TransactionStatus::Selesai);

    let result = completed.cancel(at(43));

    assert_eq!(
        result,
        Err(LifecycleError::InvalidTransition {
            action: Action::Cancel,
            from: TransactionStatus::Selesai,
        })
    );

    Ok(())
}
