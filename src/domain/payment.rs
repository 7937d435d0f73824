use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::{Identity, UserId};
use super::money::Cents;
use super::order::OrderId;

pub type PaymentId = Uuid;
pub type EmployeePaymentId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Card => "card",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "bank" => Some(PaymentMethod::Bank),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer payment received against an order. Pure bookkeeping row:
/// it feeds no stored aggregate on the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub amount: Cents,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
    /// Free-text receiver name; display fallback for pre-migration rows.
    pub received_by: Option<String>,
    pub received_by_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        order_id: OrderId,
        amount: Cents,
        payment_date: DateTime<Utc>,
        method: PaymentMethod,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            amount,
            payment_date,
            method,
            received_by: None,
            received_by_id: None,
            created_at: Utc::now(),
        }
    }

    /// Stamp the receiving staff member onto the row for the audit trail.
    pub fn with_receiver(mut self, identity: &Identity) -> Self {
        self.received_by = Some(identity.name.clone());
        self.received_by_id = Some(identity.id);
        self
    }
}

/// Fields a payment update may change. Anything left `None` keeps the
/// stored value.
#[derive(Debug, Clone, Default)]
pub struct PaymentPatch {
    pub amount: Option<Cents>,
    pub payment_date: Option<DateTime<Utc>>,
    pub method: Option<PaymentMethod>,
}

/// A payout to an employee for work on an order. Its lifecycle is coupled
/// to `Order.employee_paid_amount` and to the ledger: creation increments
/// the order total and writes an expense entry, deletion decrements it and
/// writes a compensating income entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeePayment {
    pub id: EmployeePaymentId,
    pub order_id: OrderId,
    pub amount: Cents,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
    /// Resolved payee display name; absent on rows that predate linking,
    /// where the order's legacy `employee` text stands in.
    pub recipient: Option<String>,
    pub processed_by: Option<String>,
    pub processed_by_id: Option<UserId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EmployeePayment {
    pub fn new(
        order_id: OrderId,
        amount: Cents,
        payment_date: DateTime<Utc>,
        method: PaymentMethod,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            amount,
            payment_date,
            method,
            recipient: None,
            processed_by: None,
            processed_by_id: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_recipient(mut self, name: impl Into<String>) -> Self {
        self.recipient = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Stamp the staff member who recorded the payout.
    pub fn with_processor(mut self, identity: &Identity) -> Self {
        self.processed_by = Some(identity.name.clone());
        self.processed_by_id = Some(identity.id);
        self
    }
}

/// Sum of payout amounts; what `Order.employee_paid_amount` must equal.
pub fn paid_total(payments: &[EmployeePayment]) -> Cents {
    payments.iter().map(|p| p.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Role;

    fn actor() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            name: "Maria Koleva".into(),
            role: Role::ChiefEditor,
        }
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [PaymentMethod::Cash, PaymentMethod::Bank, PaymentMethod::Card] {
            assert_eq!(PaymentMethod::from_str(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::from_str("cheque"), None);
    }

    #[test]
    fn test_receiver_stamp() {
        let who = actor();
        let payment = Payment::new(Uuid::new_v4(), 5000, Utc::now(), PaymentMethod::Cash)
            .with_receiver(&who);
        assert_eq!(payment.received_by.as_deref(), Some("Maria Koleva"));
        assert_eq!(payment.received_by_id, Some(who.id));
    }

    #[test]
    fn test_processor_stamp() {
        let who = actor();
        let payout = EmployeePayment::new(Uuid::new_v4(), 50000, Utc::now(), PaymentMethod::Bank)
            .with_recipient("Ivan")
            .with_processor(&who);
        assert_eq!(payout.processed_by.as_deref(), Some("Maria Koleva"));
        assert_eq!(payout.processed_by_id, Some(who.id));
        assert_eq!(payout.recipient.as_deref(), Some("Ivan"));
    }

    #[test]
    fn test_paid_total() {
        let order = Uuid::new_v4();
        let payments = vec![
            EmployeePayment::new(order, 10000, Utc::now(), PaymentMethod::Cash),
            EmployeePayment::new(order, 2500, Utc::now(), PaymentMethod::Bank),
        ];
        assert_eq!(paid_total(&payments), 12500);
        assert_eq!(paid_total(&[]), 0);
    }
}
