mod common;

use anyhow::Result;
use chrono::Utc;
use common::{Newsroom, payout_draft, seed_order, test_service};
use uuid::Uuid;
use vestnik::application::{AppError, PayoutDraft};
use vestnik::domain::{
    CATEGORY_PAYOUT, CATEGORY_PAYOUT_CANCELLATION, EmployeePayment, LedgerEntry, LedgerEntryKind,
    PaymentMethod,
};

#[tokio::test]
async fn test_payout_increments_order_total_and_writes_expense() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Spring festival supplement", 100000).await?;

    // Pay Ivan 500.00 for the order
    let mut draft = payout_draft(order.id, 50000);
    draft.employee_name = Some("Ivan Petrov".to_string());
    let recorded = service.add_employee_payment(&room.chief, draft).await?;

    assert_eq!(recorded.payment.amount, 50000);
    assert_eq!(recorded.payment.recipient.as_deref(), Some("Ivan Petrov"));
    assert_eq!(recorded.payment.processed_by.as_deref(), Some("Maria Koleva"));

    // The order's stored total moved with the payout
    let order = service.get_order(order.id).await?;
    assert_eq!(order.employee_paid_amount, 50000);

    // The mirroring expense entry is linked to both order and payout
    let entry = &recorded.entry;
    assert_eq!(entry.kind, LedgerEntryKind::Expense);
    assert_eq!(entry.amount, 50000);
    assert_eq!(entry.category, CATEGORY_PAYOUT);
    assert_eq!(entry.order_id, Some(order.id));
    assert_eq!(entry.employee_payment_id, Some(recorded.payment.id));
    assert!(entry.description.contains("Ivan Petrov"));

    let stored = service.get_ledger_entry(entry.id).await?;
    assert_eq!(stored.amount, 50000);

    Ok(())
}

#[tokio::test]
async fn test_delete_payout_restores_total_and_writes_reversal() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Spring festival supplement", 100000).await?;

    let mut draft = payout_draft(order.id, 50000);
    draft.employee_name = Some("Ivan Petrov".to_string());
    let recorded = service.add_employee_payment(&room.chief, draft).await?;

    let removal = service
        .delete_employee_payment(&room.chief, recorded.payment.id)
        .await?;

    // The order total is back where it started
    let order = service.get_order(order.id).await?;
    assert_eq!(order.employee_paid_amount, 0);

    // The compensating entry is income, same amount, order-linked but
    // deliberately not payout-linked
    assert_eq!(removal.reversal.kind, LedgerEntryKind::Income);
    assert_eq!(removal.reversal.amount, 50000);
    assert_eq!(removal.reversal.category, CATEGORY_PAYOUT_CANCELLATION);
    assert_eq!(removal.reversal.order_id, Some(order.id));
    assert_eq!(removal.reversal.employee_payment_id, None);
    assert!(removal.reversal.description.contains("Ivan Petrov"));

    // The original expense entry survives; the pair nets to zero
    let expenses = service
        .list_ledger_entries(None, Some(CATEGORY_PAYOUT), Some(order.id), None)
        .await?;
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 50000);
    assert_eq!(expenses[0].employee_payment_id, Some(recorded.payment.id));

    // The payout row itself is gone
    let err = service
        .get_employee_payment(recorded.payment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    Ok(())
}

#[tokio::test]
async fn test_paid_total_stays_reconciled_through_mixed_sequence() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Election coverage", 200000).await?;

    let first = service
        .add_employee_payment(&room.chief, payout_draft(order.id, 20000))
        .await?;
    let second = service
        .add_employee_payment(&room.chief, payout_draft(order.id, 30000))
        .await?;
    service
        .add_employee_payment(&room.admin, payout_draft(order.id, 15000))
        .await?;

    service
        .delete_employee_payment(&room.admin, second.payment.id)
        .await?;

    service
        .add_employee_payment(&room.chief, payout_draft(order.id, 5000))
        .await?;

    // Stored total equals the SQL sum of surviving payouts
    let stored = service.get_order(order.id).await?.employee_paid_amount;
    let summed = service
        .repository()
        .sum_employee_payments_for_order(order.id)
        .await?;
    assert_eq!(stored, 20000 + 15000 + 5000);
    assert_eq!(stored, summed);

    // And the first payout is still intact
    let survivor = service.get_employee_payment(first.payment.id).await?;
    assert_eq!(survivor.amount, 20000);

    Ok(())
}

#[tokio::test]
async fn test_payout_against_missing_order_fails_cleanly() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let err = service
        .add_employee_payment(&room.chief, payout_draft(Uuid::new_v4(), 10000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    // Nothing was persisted by the aborted transaction
    assert!(service.list_employee_payments(None).await?.is_empty());
    assert!(
        service
            .list_ledger_entries(None, None, None, None)
            .await?
            .is_empty()
    );

    Ok(())
}

#[tokio::test]
async fn test_delete_missing_payout_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let err = service
        .delete_employee_payment(&room.admin, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    Ok(())
}

#[tokio::test]
async fn test_payout_rolls_back_when_ledger_write_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Harvest photo essay", 80000).await?;
    let repo = service.repository();

    // Occupy the payout's slot in the ledger up front; the unique index on
    // employee_payment_id will reject the expense entry written inside the
    // payout transaction.
    let payout = EmployeePayment::new(order.id, 40000, Utc::now(), PaymentMethod::Bank)
        .with_recipient("Ivan Petrov");
    let decoy = LedgerEntry::new(
        LedgerEntryKind::Expense,
        1,
        "misc".to_string(),
        Utc::now(),
        "occupies the payout link".to_string(),
    )
    .with_employee_payment(payout.id);
    repo.save_ledger_entry(&decoy).await?;

    let result = repo.add_employee_payment(&payout, &room.chief).await;
    assert!(result.is_err());

    // The whole transaction rolled back: no payout row, untouched total
    assert!(repo.get_employee_payment(payout.id).await?.is_none());
    let order = service.get_order(order.id).await?;
    assert_eq!(order.employee_paid_amount, 0);
    assert_eq!(repo.sum_employee_payments_for_order(order.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_recipient_resolution_chain() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    // An explicit name wins over the linked staff member
    let order = seed_order(&service, &room.chief, "Obituaries page", 30000).await?;
    let draft = PayoutDraft {
        employee_name: Some("Stringer from Plovdiv".to_string()),
        target_employee_id: Some(room.author.id),
        ..payout_draft(order.id, 5000)
    };
    let recorded = service.add_employee_payment(&room.chief, draft).await?;
    assert_eq!(
        recorded.payment.recipient.as_deref(),
        Some("Stringer from Plovdiv")
    );

    // A linked staff member alone resolves through the users table
    let draft = PayoutDraft {
        target_employee_id: Some(room.author.id),
        ..payout_draft(order.id, 5000)
    };
    let recorded = service.add_employee_payment(&room.chief, draft).await?;
    assert_eq!(recorded.payment.recipient.as_deref(), Some("Ivan Petrov"));

    // Neither set: the order's legacy employee text carries the description
    let legacy_order = service
        .create_order(
            &room.chief,
            "Archive digitization".to_string(),
            "City Library".to_string(),
            60000,
            None,
            Some("G. Dimitrov".to_string()),
            None,
        )
        .await?;
    let recorded = service
        .add_employee_payment(&room.chief, payout_draft(legacy_order.id, 10000))
        .await?;
    assert_eq!(recorded.payment.recipient, None);
    assert!(recorded.entry.description.contains("G. Dimitrov"));

    Ok(())
}

#[tokio::test]
async fn test_payout_amount_must_be_positive() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Weather page", 10000).await?;

    for amount in [0, -500] {
        let err = service
            .add_employee_payment(&room.chief, payout_draft(order.id, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount(_)));
    }

    assert!(service.list_employee_payments(None).await?.is_empty());
    assert_eq!(service.get_order(order.id).await?.employee_paid_amount, 0);

    Ok(())
}
