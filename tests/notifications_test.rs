mod common;

use anyhow::Result;
use common::{Newsroom, payout_draft, seed_order, test_service};
use uuid::Uuid;
use vestnik::application::AppError;

#[tokio::test]
async fn test_mark_history_paid_links_payout() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Weekend issue", 50000).await?;

    let notification = service
        .create_notification(&room.editor, "Weekend issue assignments".to_string())
        .await?;
    let entry = service
        .add_history_entry(
            &room.editor,
            notification.id,
            "Ivan: market report".to_string(),
        )
        .await?;
    let recorded = service
        .add_employee_payment(&room.chief, payout_draft(order.id, 15000))
        .await?;

    let marked = service
        .mark_history_paid(&room.editor, entry.id, recorded.payment.id)
        .await?;
    assert!(marked.is_paid);
    assert_eq!(marked.employee_payment_id, Some(recorded.payment.id));

    // The stored row agrees
    let listed = service.list_notifications().await?;
    assert_eq!(listed.len(), 1);
    assert!(listed[0].entries[0].is_paid);
    assert_eq!(
        listed[0].entries[0].employee_payment_id,
        Some(recorded.payment.id)
    );

    Ok(())
}

#[tokio::test]
async fn test_mark_paid_requires_existing_payout() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let notification = service
        .create_notification(&room.editor, "Corrections queue".to_string())
        .await?;
    let entry = service
        .add_history_entry(&room.editor, notification.id, "Fix page 3".to_string())
        .await?;

    let err = service
        .mark_history_paid(&room.editor, entry.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    // The entry stayed unpaid
    let listed = service.list_notifications().await?;
    assert!(!listed[0].entries[0].is_paid);

    Ok(())
}

#[tokio::test]
async fn test_deleting_payout_clears_only_its_history() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Weekend issue", 80000).await?;

    let notification = service
        .create_notification(&room.editor, "Weekend issue assignments".to_string())
        .await?;
    let first_entry = service
        .add_history_entry(
            &room.editor,
            notification.id,
            "Ivan: market report".to_string(),
        )
        .await?;
    let second_entry = service
        .add_history_entry(
            &room.editor,
            notification.id,
            "Elena: school opening".to_string(),
        )
        .await?;

    let first_payout = service
        .add_employee_payment(&room.chief, payout_draft(order.id, 15000))
        .await?;
    let second_payout = service
        .add_employee_payment(&room.chief, payout_draft(order.id, 12000))
        .await?;
    service
        .mark_history_paid(&room.editor, first_entry.id, first_payout.payment.id)
        .await?;
    service
        .mark_history_paid(&room.editor, second_entry.id, second_payout.payment.id)
        .await?;

    let removal = service
        .delete_employee_payment(&room.chief, first_payout.payment.id)
        .await?;
    assert_eq!(removal.cleared_history, 1);

    // Only the line the deleted payout covered was unlinked
    let listed = service.list_notifications().await?;
    let entries = &listed[0].entries;
    let first = entries.iter().find(|e| e.id == first_entry.id).unwrap();
    let second = entries.iter().find(|e| e.id == second_entry.id).unwrap();

    assert!(!first.is_paid);
    assert_eq!(first.employee_payment_id, None);
    assert!(second.is_paid);
    assert_eq!(second.employee_payment_id, Some(second_payout.payment.id));

    Ok(())
}

#[tokio::test]
async fn test_history_requires_existing_notification() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let err = service
        .add_history_entry(&room.editor, Uuid::new_v4(), "orphan line".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    Ok(())
}

#[tokio::test]
async fn test_history_lists_oldest_first() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let notification = service
        .create_notification(&room.editor, "Print deadlines".to_string())
        .await?;
    service
        .add_history_entry(&room.editor, notification.id, "first".to_string())
        .await?;
    service
        .add_history_entry(&room.editor, notification.id, "second".to_string())
        .await?;

    let listed = service.list_notifications().await?;
    let messages: Vec<&str> = listed[0]
        .entries
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(messages, vec!["first", "second"]);

    Ok(())
}
