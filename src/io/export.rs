use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{
    Ad, Article, Category, EmployeePayment, HistoryEntry, LedgerEntry, Notification, Order,
    Payment, StickyNote, User, Whiteboard,
};
use crate::storage::Repository;

/// Full-database snapshot, keyed by collection. Rows are stored as their
/// domain shapes; the restore side upserts them by primary id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub users: Vec<User>,
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub employee_payments: Vec<EmployeePayment>,
    pub ledger_entries: Vec<LedgerEntry>,
    pub notifications: Vec<Notification>,
    pub notification_history: Vec<HistoryEntry>,
    pub categories: Vec<Category>,
    pub articles: Vec<Article>,
    pub ads: Vec<Ad>,
    pub notes: Vec<StickyNote>,
    pub whiteboard: Whiteboard,
}

/// Exporter for backups and the accounting CSV. Works directly against the
/// repository; the backup boundary sits beneath the service's authorization
/// layer.
pub struct Exporter<'a> {
    repo: &'a Repository,
}

impl<'a> Exporter<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Collect every collection into a snapshot document.
    pub async fn snapshot(&self) -> Result<DatabaseSnapshot> {
        Ok(DatabaseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            users: self.repo.list_users().await?,
            orders: self.repo.list_orders().await?,
            payments: self.repo.list_payments().await?,
            employee_payments: self.repo.list_employee_payments().await?,
            ledger_entries: self.repo.list_ledger_entries().await?,
            notifications: self.repo.list_notifications().await?,
            notification_history: self.repo.list_history_entries().await?,
            categories: self.repo.list_categories().await?,
            articles: self.repo.list_articles(None).await?,
            ads: self.repo.list_ads(false).await?,
            notes: self.repo.list_notes().await?,
            whiteboard: self.repo.get_whiteboard().await?,
        })
    }

    /// Export the full database as pretty-printed JSON.
    pub async fn write_snapshot<W: Write>(&self, mut writer: W) -> Result<DatabaseSnapshot> {
        let snapshot = self.snapshot().await?;
        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        Ok(snapshot)
    }

    /// Export the ledger to CSV for the accountant, newest entry first.
    /// Amounts stay in raw cents so the file re-imports without loss.
    pub async fn ledger_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.repo.list_ledger_entries().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "kind",
            "amount_cents",
            "category",
            "entry_date",
            "description",
            "created_by",
            "order_id",
            "employee_payment_id",
        ])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record(&[
                entry.id.to_string(),
                entry.kind.as_str().to_string(),
                entry.amount.to_string(),
                entry.category.clone(),
                entry.entry_date.to_rfc3339(),
                entry.description.clone(),
                entry.created_by.clone().unwrap_or_default(),
                entry.order_id.map(|id| id.to_string()).unwrap_or_default(),
                entry
                    .employee_payment_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}
