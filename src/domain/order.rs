use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::UserId;
use super::money::Cents;

pub type OrderId = Uuid;

/// A billable unit of work (an ad campaign, a commissioned piece) with a
/// customer on one side and, optionally, a paid employee on the other.
///
/// `employee_paid_amount` is a stored running total of payouts against this
/// order. It is adjusted only inside the employee-payment transactions and
/// must always equal the sum of the order's surviving employee payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub title: String,
    pub customer: String,
    pub description: Option<String>,
    pub price: Cents,
    /// Legacy free-text payee name, kept for rows created before employees
    /// were linked by id. Used as a display fallback.
    pub employee: Option<String>,
    pub employee_id: Option<UserId>,
    pub employee_paid_amount: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(title: String, customer: String, price: Cents) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            customer,
            description: None,
            price,
            employee: None,
            employee_id: None,
            employee_paid_amount: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_employee(mut self, name: impl Into<String>) -> Self {
        self.employee = Some(name.into());
        self
    }

    pub fn with_employee_id(mut self, id: UserId) -> Self {
        self.employee_id = Some(id);
        self
    }

    /// Short reference used in ledger descriptions: the last 4 characters
    /// of the id, enough to find the order without quoting a full uuid.
    pub fn short_ref(&self) -> String {
        let hyphenated = self.id.to_string();
        hyphenated[hyphenated.len() - 4..].to_string()
    }
}

/// Descriptive fields an order update may touch. `employee_paid_amount` is
/// deliberately absent; only the payout transactions move it.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub title: Option<String>,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub price: Option<Cents>,
    pub employee: Option<String>,
    pub employee_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_starts_unpaid() {
        let order = Order::new("March banner".into(), "Corner Bakery".into(), 40000);
        assert_eq!(order.employee_paid_amount, 0);
        assert!(order.employee.is_none());
        assert!(order.employee_id.is_none());
    }

    #[test]
    fn test_short_ref_is_last_four_chars() {
        let order = Order::new("Ad".into(), "X".into(), 100);
        let short = order.short_ref();
        assert_eq!(short.len(), 4);
        assert!(order.id.to_string().ends_with(&short));
    }
}
