use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::EmployeePaymentId;

pub type NotificationId = Uuid;
pub type HistoryEntryId = Uuid;

/// A newsroom notice (assignment, reminder) whose history entries track the
/// work items it produced. History lives in its own table, keyed by entry
/// id, so a single entry can be updated without rewriting its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            created_at: Utc::now(),
        }
    }
}

/// One history line under a notification. `employee_payment_id` is a weak
/// back-reference set when a payout covers the item; deleting that payout
/// must clear it again, leaving the line itself in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub notification_id: NotificationId,
    pub message: String,
    pub is_paid: bool,
    pub employee_payment_id: Option<EmployeePaymentId>,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(notification_id: NotificationId, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_id,
            message,
            is_paid: false,
            employee_payment_id: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the item as covered by the given payout.
    pub fn mark_paid(&mut self, payment_id: EmployeePaymentId) {
        self.is_paid = true;
        self.employee_payment_id = Some(payment_id);
    }

    /// Undo the payout link, returning the item to its unpaid state.
    pub fn clear_payment(&mut self) {
        self.is_paid = false;
        self.employee_payment_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_unpaid() {
        let notification = Notification::new("Weekend issue assignments".into());
        let entry = HistoryEntry::new(notification.id, "Ivan: market report".into());
        assert!(!entry.is_paid);
        assert!(entry.employee_payment_id.is_none());
    }

    #[test]
    fn test_mark_and_clear_payment() {
        let notification = Notification::new("Weekend issue assignments".into());
        let mut entry = HistoryEntry::new(notification.id, "Ivan: market report".into());

        let payment_id = Uuid::new_v4();
        entry.mark_paid(payment_id);
        assert!(entry.is_paid);
        assert_eq!(entry.employee_payment_id, Some(payment_id));

        entry.clear_payment();
        assert!(!entry.is_paid);
        assert!(entry.employee_payment_id.is_none());
    }
}
