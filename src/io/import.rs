use anyhow::{Context, Result};
use std::io::Read;

use crate::io::export::DatabaseSnapshot;
use crate::storage::Repository;

/// Per-collection row counts written by a restore.
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub users: usize,
    pub orders: usize,
    pub payments: usize,
    pub employee_payments: usize,
    pub ledger_entries: usize,
    pub notifications: usize,
    pub notification_history: usize,
    pub categories: usize,
    pub articles: usize,
    pub ads: usize,
    pub notes: usize,
    pub whiteboard: usize,
}

impl RestoreReport {
    pub fn total(&self) -> usize {
        self.users
            + self.orders
            + self.payments
            + self.employee_payments
            + self.ledger_entries
            + self.notifications
            + self.notification_history
            + self.categories
            + self.articles
            + self.ads
            + self.notes
            + self.whiteboard
    }

    fn counted(snapshot: &DatabaseSnapshot) -> Self {
        Self {
            users: snapshot.users.len(),
            orders: snapshot.orders.len(),
            payments: snapshot.payments.len(),
            employee_payments: snapshot.employee_payments.len(),
            ledger_entries: snapshot.ledger_entries.len(),
            notifications: snapshot.notifications.len(),
            notification_history: snapshot.notification_history.len(),
            categories: snapshot.categories.len(),
            articles: snapshot.articles.len(),
            ads: snapshot.ads.len(),
            notes: snapshot.notes.len(),
            whiteboard: 1,
        }
    }
}

/// Importer for restoring snapshot documents into a migrated database.
pub struct Importer<'a> {
    repo: &'a Repository,
}

impl<'a> Importer<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Parse a snapshot document from a reader.
    pub fn read_snapshot<R: Read>(reader: R) -> Result<DatabaseSnapshot> {
        serde_json::from_reader(reader).context("Failed to parse snapshot JSON")
    }

    /// What a restore of this snapshot would write, without writing it.
    pub fn preview(snapshot: &DatabaseSnapshot) -> RestoreReport {
        RestoreReport::counted(snapshot)
    }

    /// Upsert every snapshot row by primary id. Rows already present are
    /// overwritten, rows missing are inserted, rows absent from the
    /// snapshot are left alone. Foreign keys are restored as-is with no
    /// referential checks; the read views already tolerate orphans.
    pub async fn restore(&self, snapshot: &DatabaseSnapshot) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();

        for user in &snapshot.users {
            self.repo.upsert_user(user).await?;
            report.users += 1;
        }
        for order in &snapshot.orders {
            self.repo.upsert_order(order).await?;
            report.orders += 1;
        }
        for payment in &snapshot.payments {
            self.repo.upsert_payment(payment).await?;
            report.payments += 1;
        }
        for payment in &snapshot.employee_payments {
            self.repo.upsert_employee_payment(payment).await?;
            report.employee_payments += 1;
        }
        for entry in &snapshot.ledger_entries {
            self.repo.upsert_ledger_entry(entry).await?;
            report.ledger_entries += 1;
        }
        for notification in &snapshot.notifications {
            self.repo.upsert_notification(notification).await?;
            report.notifications += 1;
        }
        for entry in &snapshot.notification_history {
            self.repo.upsert_history_entry(entry).await?;
            report.notification_history += 1;
        }
        for category in &snapshot.categories {
            self.repo.upsert_category(category).await?;
            report.categories += 1;
        }
        for article in &snapshot.articles {
            self.repo.upsert_article(article).await?;
            report.articles += 1;
        }
        for ad in &snapshot.ads {
            self.repo.upsert_ad(ad).await?;
            report.ads += 1;
        }
        for note in &snapshot.notes {
            self.repo.upsert_note(note).await?;
            report.notes += 1;
        }
        self.repo.update_whiteboard(&snapshot.whiteboard).await?;
        report.whiteboard = 1;

        Ok(report)
    }

    /// Parse and restore in one step.
    pub async fn restore_from<R: Read>(&self, reader: R) -> Result<RestoreReport> {
        let snapshot = Self::read_snapshot(reader)?;
        self.restore(&snapshot).await
    }
}
