// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;
use vestnik::application::{BackofficeService, LedgerEntryDraft, PaymentDraft, PayoutDraft};
use vestnik::domain::{Cents, Identity, LedgerEntryKind, Order, OrderId, PaymentMethod, Role};

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BackofficeService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BackofficeService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Test fixture: a small newsroom with one identity per role
pub struct Newsroom {
    pub admin: Identity,
    pub chief: Identity,
    pub editor: Identity,
    pub author: Identity,
}

impl Newsroom {
    /// Seed the standard staff: admin, chief editor, editor, author
    pub async fn seed(service: &BackofficeService) -> Result<Newsroom> {
        let admin = service
            .bootstrap_admin("dana@vestnik.bg".into(), "Dana Petrova".into())
            .await?
            .identity();
        let chief = service
            .create_user(
                &admin,
                "maria@vestnik.bg".into(),
                "Maria Koleva".into(),
                Role::ChiefEditor,
            )
            .await?
            .identity();
        let editor = service
            .create_user(
                &admin,
                "georgi@vestnik.bg".into(),
                "Georgi Ivanov".into(),
                Role::Editor,
            )
            .await?
            .identity();
        let author = service
            .create_user(
                &admin,
                "ivan@vestnik.bg".into(),
                "Ivan Petrov".into(),
                Role::Author,
            )
            .await?
            .identity();
        Ok(Newsroom {
            admin,
            chief,
            editor,
            author,
        })
    }
}

/// Create an order for a standing test customer
pub async fn seed_order(
    service: &BackofficeService,
    actor: &Identity,
    title: &str,
    price: Cents,
) -> Result<Order> {
    let order = service
        .create_order(
            actor,
            title.to_string(),
            "Corner Bakery".to_string(),
            price,
            None,
            None,
            None,
        )
        .await?;
    Ok(order)
}

/// Payout draft with bank transfer defaults
pub fn payout_draft(order_id: OrderId, amount: Cents) -> PayoutDraft {
    PayoutDraft {
        order_id,
        amount,
        payment_date: Utc::now(),
        method: PaymentMethod::Bank,
        notes: None,
        employee_name: None,
        target_employee_id: None,
    }
}

/// Customer payment draft with bank transfer defaults
pub fn payment_draft(order_id: OrderId, amount: Cents) -> PaymentDraft {
    PaymentDraft {
        order_id,
        amount,
        payment_date: Utc::now(),
        method: PaymentMethod::Bank,
    }
}

/// Manual ledger entry draft
pub fn entry_draft(kind: LedgerEntryKind, amount: Cents, category: &str) -> LedgerEntryDraft {
    LedgerEntryDraft {
        kind,
        amount,
        category: category.to_string(),
        entry_date: Utc::now(),
        description: format!("{} for tests", category),
        order_id: None,
    }
}
