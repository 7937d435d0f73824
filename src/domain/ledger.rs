use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::{Identity, UserId};
use super::money::Cents;
use super::order::{Order, OrderId};
use super::payment::{EmployeePayment, EmployeePaymentId};

pub type LedgerEntryId = Uuid;

/// Category stamped on the expense entry written when a payout is recorded.
pub const CATEGORY_PAYOUT: &str = "payout";
/// Category stamped on the compensating income entry written when a payout
/// is deleted. The original expense entry stays; the pair nets to zero.
pub const CATEGORY_PAYOUT_CANCELLATION: &str = "payout-cancellation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryKind {
    /// Money coming into the paper (customer revenue, reversals)
    Income,
    /// Money going out (payouts, running costs)
    Expense,
}

impl LedgerEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryKind::Income => "income",
            LedgerEntryKind::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(LedgerEntryKind::Income),
            "expense" => Some(LedgerEntryKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the financial ledger. Entries generated by payout operations
/// carry weak back-links to the order and (for the expense side) the payout
/// itself; manual entries may stand alone or reference an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub kind: LedgerEntryKind,
    pub amount: Cents,
    pub category: String,
    pub entry_date: DateTime<Utc>,
    pub description: String,
    pub created_by: Option<String>,
    pub created_by_id: Option<UserId>,
    pub order_id: Option<OrderId>,
    pub employee_payment_id: Option<EmployeePaymentId>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        kind: LedgerEntryKind,
        amount: Cents,
        category: String,
        entry_date: DateTime<Utc>,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            category,
            entry_date,
            description,
            created_by: None,
            created_by_id: None,
            order_id: None,
            employee_payment_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_creator(mut self, identity: &Identity) -> Self {
        self.created_by = Some(identity.name.clone());
        self.created_by_id = Some(identity.id);
        self
    }

    pub fn with_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_employee_payment(mut self, payment_id: EmployeePaymentId) -> Self {
        self.employee_payment_id = Some(payment_id);
        self
    }
}

/// Fields a manual ledger-entry update may change.
#[derive(Debug, Clone, Default)]
pub struct LedgerEntryPatch {
    pub kind: Option<LedgerEntryKind>,
    pub amount: Option<Cents>,
    pub category: Option<String>,
    pub entry_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

/// Display name for the payee of a payout: the resolved recipient if one
/// was recorded, else the order's legacy free-text employee, else a
/// placeholder for rows that never named anyone.
pub fn payee_name(payment: &EmployeePayment, order: &Order) -> String {
    payment
        .recipient
        .clone()
        .or_else(|| order.employee.clone())
        .unwrap_or_else(|| "unnamed employee".to_string())
}

/// The expense entry that mirrors a freshly recorded payout. Linked to both
/// the order and the payout row; dated on the payout date so the books show
/// when the money actually moved.
pub fn payout_entry(payment: &EmployeePayment, order: &Order, actor: &Identity) -> LedgerEntry {
    let description = format!(
        "Payout to {} for order #{}",
        payee_name(payment, order),
        order.short_ref()
    );
    LedgerEntry::new(
        LedgerEntryKind::Expense,
        payment.amount,
        CATEGORY_PAYOUT.to_string(),
        payment.payment_date,
        description,
    )
    .with_creator(actor)
    .with_order(order.id)
    .with_employee_payment(payment.id)
}

/// The compensating income entry for a deleted payout. Same amount as the
/// original expense, dated now, and deliberately not linked to the payout
/// row since that row is gone; the order link is kept for the audit trail.
pub fn payout_reversal(payment: &EmployeePayment, order: &Order, actor: &Identity) -> LedgerEntry {
    let description = format!(
        "Reversal of payout to {} for order #{}",
        payee_name(payment, order),
        order.short_ref()
    );
    LedgerEntry::new(
        LedgerEntryKind::Income,
        payment.amount,
        CATEGORY_PAYOUT_CANCELLATION.to_string(),
        Utc::now(),
        description,
    )
    .with_creator(actor)
    .with_order(order.id)
}
