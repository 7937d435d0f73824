mod common;

use anyhow::Result;
use chrono::Utc;
use common::{Newsroom, entry_draft, payment_draft, payout_draft, seed_order, test_service};
use uuid::Uuid;
use vestnik::domain::{AdPlacement, LedgerEntryKind, NoteColor, Payment, PaymentMethod};
use vestnik::io::{Exporter, Importer};

#[tokio::test]
async fn test_snapshot_round_trip() -> Result<()> {
    let (source, _source_temp) = test_service().await?;
    let room = Newsroom::seed(&source).await?;

    // A little of everything
    let order = seed_order(&source, &room.chief, "Spring festival supplement", 100000).await?;
    source
        .add_payment(&room.editor, payment_draft(order.id, 60000))
        .await?;
    let recorded = source
        .add_employee_payment(&room.chief, payout_draft(order.id, 40000))
        .await?;
    source
        .create_ledger_entry(
            &room.admin,
            entry_draft(LedgerEntryKind::Income, 15000, "subscriptions"),
        )
        .await?;
    let notification = source
        .create_notification(&room.editor, "Weekend assignments".to_string())
        .await?;
    let history = source
        .add_history_entry(&room.editor, notification.id, "Ivan: market".to_string())
        .await?;
    source
        .mark_history_paid(&room.editor, history.id, recorded.payment.id)
        .await?;
    let category = source
        .create_category(&room.editor, "Local News".to_string())
        .await?;
    source
        .create_article(
            &room.author,
            "Bridge repairs delayed".to_string(),
            "The bridge stays closed another month.".to_string(),
            Some(category.id),
        )
        .await?;
    source
        .create_ad(
            &room.chief,
            "Corner Bakery".to_string(),
            "https://cdn.example/bakery.png".to_string(),
            None,
            AdPlacement::Banner,
        )
        .await?;
    source
        .add_note(&room.author, "Call the printer".to_string(), NoteColor::Yellow)
        .await?;
    source
        .write_whiteboard(&room.chief, "Deadline moved to Thursday".to_string())
        .await?;

    let mut buf = Vec::new();
    let snapshot = Exporter::new(source.repository())
        .write_snapshot(&mut buf)
        .await?;
    assert_eq!(Importer::preview(&snapshot).total(), 16);

    // Restore into a fresh database
    let (target, _target_temp) = test_service().await?;
    let report = Importer::new(target.repository())
        .restore_from(buf.as_slice())
        .await?;
    assert_eq!(report.users, 4);
    assert_eq!(report.orders, 1);
    assert_eq!(report.payments, 1);
    assert_eq!(report.employee_payments, 1);
    assert_eq!(report.ledger_entries, 2);
    assert_eq!(report.total(), 16);

    // Rows came through intact, the stored paid total included
    let restored_order = target.get_order(order.id).await?;
    assert_eq!(restored_order.title, "Spring festival supplement");
    assert_eq!(restored_order.employee_paid_amount, 40000);

    let restored_payout = target.get_employee_payment(recorded.payment.id).await?;
    assert_eq!(restored_payout.amount, 40000);

    let users = target.list_users().await?;
    assert_eq!(users.len(), 4);
    assert!(users.iter().any(|u| u.email == "dana@vestnik.bg"));

    let notifications = target.list_notifications().await?;
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].entries[0].is_paid);

    let board = target.whiteboard().await?;
    assert_eq!(board.content, "Deadline moved to Thursday");
    assert_eq!(board.updated_by.as_deref(), Some("Maria Koleva"));

    Ok(())
}

#[tokio::test]
async fn test_restore_accepts_orphaned_references() -> Result<()> {
    let (source, _source_temp) = test_service().await?;
    Newsroom::seed(&source).await?;

    // A payment whose order never existed; restore must not reject it
    let orphan = Payment::new(Uuid::new_v4(), 7000, Utc::now(), PaymentMethod::Cash);
    source.repository().upsert_payment(&orphan).await?;

    let mut buf = Vec::new();
    Exporter::new(source.repository())
        .write_snapshot(&mut buf)
        .await?;

    let (target, _target_temp) = test_service().await?;
    let report = Importer::new(target.repository())
        .restore_from(buf.as_slice())
        .await?;
    assert_eq!(report.payments, 1);

    let restored = target.get_payment(orphan.id).await?;
    assert_eq!(restored.amount, 7000);

    Ok(())
}

#[tokio::test]
async fn test_restore_twice_is_idempotent() -> Result<()> {
    let (source, _source_temp) = test_service().await?;
    let room = Newsroom::seed(&source).await?;
    seed_order(&source, &room.chief, "Classifieds block", 20000).await?;

    let mut buf = Vec::new();
    let snapshot = Exporter::new(source.repository())
        .write_snapshot(&mut buf)
        .await?;

    let (target, _target_temp) = test_service().await?;
    let importer = Importer::new(target.repository());
    importer.restore(&snapshot).await?;

    // Drift the target, then restore again: rows are overwritten by id,
    // never duplicated
    let mut drifted = target.get_user(room.author.id).await?;
    drifted.name = "Renamed Locally".to_string();
    target.repository().upsert_user(&drifted).await?;

    let report = importer.restore(&snapshot).await?;
    assert_eq!(report.users, 4);
    assert_eq!(target.list_users().await?.len(), 4);
    assert_eq!(target.list_orders().await?.len(), 1);

    let healed = target.get_user(room.author.id).await?;
    assert_eq!(healed.name, "Ivan Petrov");

    Ok(())
}

#[tokio::test]
async fn test_ledger_csv_export() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let room = Newsroom::seed(&service).await?;
    let order = seed_order(&service, &room.chief, "Harvest photo essay", 80000).await?;

    service
        .add_employee_payment(&room.chief, payout_draft(order.id, 40000))
        .await?;
    service
        .create_ledger_entry(
            &room.admin,
            entry_draft(LedgerEntryKind::Income, 15000, "subscriptions"),
        )
        .await?;

    let mut buf = Vec::new();
    let count = Exporter::new(service.repository())
        .ledger_csv(&mut buf)
        .await?;
    assert_eq!(count, 2);

    let csv = String::from_utf8(buf)?;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,kind,amount_cents,category,entry_date,description,created_by,order_id,employee_payment_id")
    );
    assert_eq!(lines.count(), 2);

    // Amounts are raw cents, not formatted money
    assert!(csv.contains("40000"));
    assert!(csv.contains("15000"));
    assert!(csv.contains("payout"));

    Ok(())
}
