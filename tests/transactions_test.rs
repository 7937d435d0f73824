mod common;

use anyhow::Result;
use common::{Newsroom, entry_draft, seed_order, test_service};
use uuid::Uuid;
use vestnik::application::{AppError, LedgerEntryDraft};
use vestnik::domain::{Identity, LedgerEntryKind, LedgerEntryPatch, Role};

#[tokio::test]
async fn test_author_cannot_create_ledger_entries() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let err = service
        .create_ledger_entry(
            &room.author,
            entry_draft(LedgerEntryKind::Expense, 7500, "printing"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    // Same for plain editors
    let err = service
        .create_ledger_entry(
            &room.editor,
            entry_draft(LedgerEntryKind::Expense, 7500, "printing"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    assert!(
        service
            .list_ledger_entries(None, None, None, None)
            .await?
            .is_empty()
    );

    Ok(())
}

#[tokio::test]
async fn test_chief_editor_creates_entry() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let entry = service
        .create_ledger_entry(
            &room.chief,
            entry_draft(LedgerEntryKind::Income, 120000, "subscriptions"),
        )
        .await?;

    assert_eq!(entry.kind, LedgerEntryKind::Income);
    assert_eq!(entry.amount, 120000);
    assert_eq!(entry.category, "subscriptions");
    assert_eq!(entry.created_by.as_deref(), Some("Maria Koleva"));
    assert_eq!(entry.created_by_id, Some(room.chief.id));

    Ok(())
}

#[tokio::test]
async fn test_admin_deletes_entry() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let entry = service
        .create_ledger_entry(
            &room.admin,
            entry_draft(LedgerEntryKind::Expense, 4000, "office supplies"),
        )
        .await?;
    service.delete_ledger_entry(&room.admin, entry.id).await?;

    let err = service.get_ledger_entry(entry.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    Ok(())
}

#[tokio::test]
async fn test_update_entry_is_gated_and_applied() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let entry = service
        .create_ledger_entry(
            &room.chief,
            entry_draft(LedgerEntryKind::Expense, 9000, "rent"),
        )
        .await?;

    // Editing moves money just like creating; editors are shut out
    let patch = LedgerEntryPatch {
        amount: Some(9500),
        ..Default::default()
    };
    let err = service
        .update_ledger_entry(&room.editor, entry.id, patch.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    let updated = service
        .update_ledger_entry(&room.chief, entry.id, patch)
        .await?;
    assert_eq!(updated.amount, 9500);
    assert_eq!(service.get_ledger_entry(entry.id).await?.amount, 9500);

    Ok(())
}

#[tokio::test]
async fn test_forged_role_is_caught_by_stored_record() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    // The carried identity claims admin, but the stored record says author
    let forged = Identity {
        id: room.author.id,
        name: room.author.name.clone(),
        role: Role::Admin,
    };
    let err = service
        .create_ledger_entry(
            &forged,
            entry_draft(LedgerEntryKind::Income, 100000, "subscriptions"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    Ok(())
}

#[tokio::test]
async fn test_unknown_operator_is_unauthorized() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Newsroom::seed(&service).await?;

    let ghost = Identity {
        id: Uuid::new_v4(),
        name: "Nobody".to_string(),
        role: Role::Admin,
    };
    let err = service
        .create_ledger_entry(
            &ghost,
            entry_draft(LedgerEntryKind::Income, 100, "subscriptions"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    Ok(())
}

#[tokio::test]
async fn test_archived_operator_is_unauthorized() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let boris = service
        .create_user(
            &room.admin,
            "boris@vestnik.bg".into(),
            "Boris Hristov".into(),
            Role::Admin,
        )
        .await?;
    let boris_identity = boris.identity();
    service.archive_user(&room.admin, boris.id).await?;

    // The identity was minted before the archive and is now dead
    let err = service
        .create_ledger_entry(
            &boris_identity,
            entry_draft(LedgerEntryKind::Expense, 300, "misc"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    Ok(())
}

#[tokio::test]
async fn test_filtered_listing() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Sports section relaunch", 50000).await?;

    service
        .create_ledger_entry(
            &room.chief,
            entry_draft(LedgerEntryKind::Income, 120000, "subscriptions"),
        )
        .await?;
    service
        .create_ledger_entry(
            &room.chief,
            entry_draft(LedgerEntryKind::Expense, 7500, "printing"),
        )
        .await?;
    let linked = LedgerEntryDraft {
        order_id: Some(order.id),
        ..entry_draft(LedgerEntryKind::Expense, 2000, "printing")
    };
    service.create_ledger_entry(&room.chief, linked).await?;

    let incomes = service
        .list_ledger_entries(Some(LedgerEntryKind::Income), None, None, None)
        .await?;
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].category, "subscriptions");

    let printing = service
        .list_ledger_entries(None, Some("printing"), None, None)
        .await?;
    assert_eq!(printing.len(), 2);

    let for_order = service
        .list_ledger_entries(None, None, Some(order.id), None)
        .await?;
    assert_eq!(for_order.len(), 1);
    assert_eq!(for_order[0].amount, 2000);

    let limited = service
        .list_ledger_entries(None, None, None, Some(2))
        .await?;
    assert_eq!(limited.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_entry_against_missing_order_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;

    let draft = LedgerEntryDraft {
        order_id: Some(Uuid::new_v4()),
        ..entry_draft(LedgerEntryKind::Expense, 1000, "misc")
    };
    let err = service
        .create_ledger_entry(&room.admin, draft)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    Ok(())
}
