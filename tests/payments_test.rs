mod common;

use anyhow::Result;
use common::{Newsroom, payment_draft, seed_order, test_service};
use uuid::Uuid;
use vestnik::application::AppError;
use vestnik::domain::{PaymentMethod, PaymentPatch};

#[tokio::test]
async fn test_payment_records_receiver() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.editor, "Bakery anniversary ad", 60000).await?;

    let payment = service
        .add_payment(&room.author, payment_draft(order.id, 25000))
        .await?;

    assert_eq!(payment.received_by.as_deref(), Some("Ivan Petrov"));
    assert_eq!(payment.received_by_id, Some(room.author.id));

    let stored = service.get_payment(payment.id).await?;
    assert_eq!(stored.amount, 25000);
    assert_eq!(stored.order_id, order.id);

    Ok(())
}

#[tokio::test]
async fn test_customer_payments_leave_order_total_alone() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.editor, "Bakery anniversary ad", 60000).await?;

    service
        .add_payment(&room.editor, payment_draft(order.id, 30000))
        .await?;
    service
        .add_payment(&room.editor, payment_draft(order.id, 30000))
        .await?;

    // Customer money is bookkeeping only; the payout total never moves
    let order = service.get_order(order.id).await?;
    assert_eq!(order.employee_paid_amount, 0);
    assert_eq!(service.list_payments(Some(order.id)).await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_any_staff_may_update_payments() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.editor, "Classifieds block", 20000).await?;
    let payment = service
        .add_payment(&room.editor, payment_draft(order.id, 8000))
        .await?;

    // An author carries no special role and may still fix a typo
    let patch = PaymentPatch {
        amount: Some(8500),
        method: Some(PaymentMethod::Cash),
        ..Default::default()
    };
    let updated = service
        .update_payment(&room.author, payment.id, patch)
        .await?;
    assert_eq!(updated.amount, 8500);
    assert_eq!(updated.method, PaymentMethod::Cash);

    let stored = service.get_payment(payment.id).await?;
    assert_eq!(stored.amount, 8500);

    Ok(())
}

#[tokio::test]
async fn test_update_rejects_non_positive_amount() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.editor, "Classifieds block", 20000).await?;
    let payment = service
        .add_payment(&room.editor, payment_draft(order.id, 8000))
        .await?;

    let patch = PaymentPatch {
        amount: Some(0),
        ..Default::default()
    };
    let err = service
        .update_payment(&room.editor, payment.id, patch)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    // The stored row kept its amount
    assert_eq!(service.get_payment(payment.id).await?.amount, 8000);

    Ok(())
}

#[tokio::test]
async fn test_delete_payment_is_idempotent() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.editor, "Classifieds block", 20000).await?;
    let payment = service
        .add_payment(&room.editor, payment_draft(order.id, 8000))
        .await?;
    let id = payment.id.to_string();

    let first = service.delete_payment(&room.editor, &id).await?;
    assert!(!first.already_deleted);

    // Deleting the same row again still succeeds, only flagged
    let second = service.delete_payment(&room.editor, &id).await?;
    assert!(second.already_deleted);

    let err = service.get_payment(payment.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    Ok(())
}

#[tokio::test]
async fn test_delete_payment_rejects_malformed_id() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let err = service
        .delete_payment(&room.editor, "not-a-uuid")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidIdentifier(_)));

    Ok(())
}

#[tokio::test]
async fn test_update_missing_payment_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let err = service
        .update_payment(&room.editor, Uuid::new_v4(), PaymentPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    Ok(())
}
