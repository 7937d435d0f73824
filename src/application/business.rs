use std::collections::HashMap;

use serde::Serialize;

use crate::application::{AppError, BackofficeService};
use crate::domain::{
    Cents, EmployeePayment, LedgerEntry, LedgerEntryKind, Order, OrderId, Payment, UserId,
    payee_name,
};

/// The denormalized management view: every order with its payments and
/// payouts, the full ledger, and running totals. Foreign keys are resolved
/// to display names so the caller renders it as-is.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessData {
    pub orders: Vec<OrderView>,
    pub ledger: Vec<LedgerEntryView>,
    pub total_income: Cents,
    pub total_expense: Cents,
}

impl BusinessData {
    pub fn net(&self) -> Cents {
        self.total_income - self.total_expense
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order: Order,
    /// Resolved from `employee_id`, falling back to the legacy free-text
    /// field; absent when the order names nobody.
    pub employee_name: Option<String>,
    /// Sum of customer payments. Computed here; unlike the payout total it
    /// is not stored on the order.
    pub customer_paid: Cents,
    pub payments: Vec<PaymentView>,
    pub payouts: Vec<PayoutView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub payment: Payment,
    pub received_by_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayoutView {
    pub payment: EmployeePayment,
    pub recipient_name: String,
    pub processed_by_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntryView {
    pub entry: LedgerEntry,
    pub created_by_name: String,
}

/// Resolve a linked user id to a display name, falling back to the row's
/// legacy free-text field for rows created before identities were linked.
fn resolve_name(
    names: &HashMap<UserId, String>,
    id: Option<UserId>,
    legacy: Option<&str>,
) -> Option<String> {
    id.and_then(|id| names.get(&id).cloned())
        .or_else(|| legacy.map(str::to_string))
}

fn display_name(
    names: &HashMap<UserId, String>,
    id: Option<UserId>,
    legacy: Option<&str>,
) -> String {
    resolve_name(names, id, legacy).unwrap_or_else(|| "unknown".to_string())
}

impl BackofficeService {
    /// The business view, served from cache within its TTL. Every mutation
    /// that touches money or orders drops the cache, so a fresh read after
    /// a commit always reflects it.
    pub async fn business_data(&self) -> Result<BusinessData, AppError> {
        if let Some(view) = self.business_view.get() {
            return Ok(view);
        }
        let view = self.compute_business_data().await?;
        self.business_view.put(view.clone());
        Ok(view)
    }

    async fn compute_business_data(&self) -> Result<BusinessData, AppError> {
        let users = self.repo.list_users().await?;
        let names: HashMap<UserId, String> =
            users.into_iter().map(|u| (u.id, u.name)).collect();

        let mut payments_by_order: HashMap<OrderId, Vec<Payment>> = HashMap::new();
        for payment in self.repo.list_payments().await? {
            payments_by_order
                .entry(payment.order_id)
                .or_default()
                .push(payment);
        }
        let mut payouts_by_order: HashMap<OrderId, Vec<EmployeePayment>> = HashMap::new();
        for payout in self.repo.list_employee_payments().await? {
            payouts_by_order
                .entry(payout.order_id)
                .or_default()
                .push(payout);
        }

        let orders = self.repo.list_orders().await?;
        let mut order_views = Vec::with_capacity(orders.len());
        for order in orders {
            let payments = payments_by_order.remove(&order.id).unwrap_or_default();
            let payouts = payouts_by_order.remove(&order.id).unwrap_or_default();
            let customer_paid = payments.iter().map(|p| p.amount).sum();

            let payments = payments
                .into_iter()
                .map(|payment| PaymentView {
                    received_by_name: display_name(
                        &names,
                        payment.received_by_id,
                        payment.received_by.as_deref(),
                    ),
                    payment,
                })
                .collect();
            let payouts = payouts
                .into_iter()
                .map(|payment| PayoutView {
                    recipient_name: payee_name(&payment, &order),
                    processed_by_name: display_name(
                        &names,
                        payment.processed_by_id,
                        payment.processed_by.as_deref(),
                    ),
                    payment,
                })
                .collect();

            order_views.push(OrderView {
                employee_name: resolve_name(&names, order.employee_id, order.employee.as_deref()),
                customer_paid,
                payments,
                payouts,
                order,
            });
        }

        let mut total_income = 0;
        let mut total_expense = 0;
        let ledger = self
            .repo
            .list_ledger_entries()
            .await?
            .into_iter()
            .map(|entry| {
                match entry.kind {
                    LedgerEntryKind::Income => total_income += entry.amount,
                    LedgerEntryKind::Expense => total_expense += entry.amount,
                }
                LedgerEntryView {
                    created_by_name: display_name(
                        &names,
                        entry.created_by_id,
                        entry.created_by.as_deref(),
                    ),
                    entry,
                }
            })
            .collect();

        Ok(BusinessData {
            orders: order_views,
            ledger,
            total_income,
            total_expense,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_resolution_prefers_linked_identity() {
        let id = Uuid::new_v4();
        let names = HashMap::from([(id, "Ivan Petrov".to_string())]);
        assert_eq!(
            resolve_name(&names, Some(id), Some("Old Spelling")),
            Some("Ivan Petrov".to_string())
        );
    }

    #[test]
    fn test_resolution_falls_back_to_legacy_text() {
        let names = HashMap::new();
        assert_eq!(
            resolve_name(&names, Some(Uuid::new_v4()), Some("G. Dimitrov")),
            Some("G. Dimitrov".to_string())
        );
        assert_eq!(resolve_name(&names, None, None), None);
        assert_eq!(display_name(&names, None, None), "unknown");
    }
}
