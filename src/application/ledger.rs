use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::cache::{LEDGER_TAGS, PAYMENT_TAGS, PAYOUT_REMOVAL_TAGS, PAYOUT_TAGS};
use crate::application::{AppError, BackofficeService};
use crate::domain::{
    Cents, EmployeePayment, EmployeePaymentId, Identity, LedgerEntry, LedgerEntryId,
    LedgerEntryKind, LedgerEntryPatch, OrderId, Payment, PaymentId, PaymentMethod, PaymentPatch,
    UserId,
};
use crate::storage::PayoutRemoval;

/// Input for recording a payout against an order.
#[derive(Debug, Clone)]
pub struct PayoutDraft {
    pub order_id: OrderId,
    pub amount: Cents,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
    pub notes: Option<String>,
    /// Explicit payee name; wins over `target_employee_id`.
    pub employee_name: Option<String>,
    /// Staff member being paid; resolved to a display name when set.
    pub target_employee_id: Option<UserId>,
}

/// Input for recording a customer payment.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub order_id: OrderId,
    pub amount: Cents,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
}

/// Input for a manual ledger entry.
#[derive(Debug, Clone)]
pub struct LedgerEntryDraft {
    pub kind: LedgerEntryKind,
    pub amount: Cents,
    pub category: String,
    pub entry_date: DateTime<Utc>,
    pub description: String,
    pub order_id: Option<OrderId>,
}

/// A committed payout: the stored row plus the expense entry written in
/// the same transaction.
#[derive(Debug, Clone)]
pub struct PayoutRecorded {
    pub payment: EmployeePayment,
    pub entry: LedgerEntry,
}

/// Outcome of deleting a customer payment. Deleting a row that is already
/// gone counts as success; the flag lets callers warn about it.
#[derive(Debug, Clone)]
pub struct PaymentDeletion {
    pub already_deleted: bool,
}

impl BackofficeService {
    // ===== Employee payouts =====

    /// Record a payout to an employee. One transaction inserts the payout,
    /// bumps the order's paid total and writes the mirroring expense entry;
    /// a failure in any step persists nothing.
    pub async fn add_employee_payment(
        &self,
        actor: &Identity,
        draft: PayoutDraft,
    ) -> Result<PayoutRecorded, AppError> {
        if draft.amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Payout amounts must be positive".to_string(),
            ));
        }

        let mut payment =
            EmployeePayment::new(draft.order_id, draft.amount, draft.payment_date, draft.method)
                .with_processor(actor);
        if let Some(name) = draft.employee_name {
            payment = payment.with_recipient(name);
        } else if let Some(target) = draft.target_employee_id {
            // Unresolvable target: recipient stays unset and the order's
            // legacy employee text stands in at display time.
            if let Some(user) = self.repo.get_user(target).await? {
                payment = payment.with_recipient(user.name);
            }
        }
        if let Some(notes) = draft.notes {
            payment = payment.with_notes(notes);
        }

        let entry = Self::guard(
            "add_employee_payment",
            self.repo.add_employee_payment(&payment, actor).await,
        )?
        .ok_or_else(|| AppError::NotFound("Order", draft.order_id.to_string()))?;

        info!(
            payout = %payment.id,
            order = %payment.order_id,
            amount = payment.amount,
            by = %actor.name,
            "Recorded payout"
        );
        self.invalidate(PAYOUT_TAGS);
        Ok(PayoutRecorded { payment, entry })
    }

    /// Delete a payout. The payout amount is read inside the same
    /// transaction that removes the row, decrements the order's paid total,
    /// writes the compensating income entry and unlinks any notification
    /// history lines that pointed at the payout. The original expense entry
    /// is left in place; the income entry cancels it arithmetically.
    pub async fn delete_employee_payment(
        &self,
        actor: &Identity,
        id: EmployeePaymentId,
    ) -> Result<PayoutRemoval, AppError> {
        let removal = Self::guard(
            "delete_employee_payment",
            self.repo.delete_employee_payment(id, actor).await,
        )?
        .ok_or_else(|| AppError::NotFound("Employee payment", id.to_string()))?;

        info!(
            payout = %id,
            order = %removal.payment.order_id,
            amount = removal.payment.amount,
            cleared_history = removal.cleared_history,
            by = %actor.name,
            "Removed payout and wrote reversal"
        );
        self.invalidate(PAYOUT_REMOVAL_TAGS);
        Ok(removal)
    }

    pub async fn get_employee_payment(
        &self,
        id: EmployeePaymentId,
    ) -> Result<EmployeePayment, AppError> {
        self.repo
            .get_employee_payment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Employee payment", id.to_string()))
    }

    pub async fn list_employee_payments(
        &self,
        order_id: Option<OrderId>,
    ) -> Result<Vec<EmployeePayment>, AppError> {
        match order_id {
            Some(id) => Ok(self.repo.list_employee_payments_for_order(id).await?),
            None => Ok(self.repo.list_employee_payments().await?),
        }
    }

    // ===== Customer payments =====

    /// Record a customer payment against an order. Pure bookkeeping: no
    /// order aggregate moves and no ledger entry is written.
    pub async fn add_payment(
        &self,
        actor: &Identity,
        draft: PaymentDraft,
    ) -> Result<Payment, AppError> {
        if draft.amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Payment amounts must be positive".to_string(),
            ));
        }
        if self.repo.get_order(draft.order_id).await?.is_none() {
            return Err(AppError::NotFound("Order", draft.order_id.to_string()));
        }
        let payment =
            Payment::new(draft.order_id, draft.amount, draft.payment_date, draft.method)
                .with_receiver(actor);
        Self::guard("add_payment", self.repo.save_payment(&payment).await)?;

        info!(
            payment = %payment.id,
            order = %payment.order_id,
            amount = payment.amount,
            by = %actor.name,
            "Recorded customer payment"
        );
        self.invalidate(PAYMENT_TAGS);
        Ok(payment)
    }

    /// Update a customer payment. Any signed-in staff member may do this;
    /// only the ledger-entry operations carry a role gate.
    pub async fn update_payment(
        &self,
        actor: &Identity,
        id: PaymentId,
        patch: PaymentPatch,
    ) -> Result<Payment, AppError> {
        let mut payment = self
            .repo
            .get_payment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment", id.to_string()))?;
        if let Some(amount) = patch.amount {
            if amount <= 0 {
                return Err(AppError::InvalidAmount(
                    "Payment amounts must be positive".to_string(),
                ));
            }
            payment.amount = amount;
        }
        if let Some(payment_date) = patch.payment_date {
            payment.payment_date = payment_date;
        }
        if let Some(method) = patch.method {
            payment.method = method;
        }
        let updated = Self::guard("update_payment", self.repo.update_payment(&payment).await)?;
        if !updated {
            return Err(AppError::NotFound("Payment", id.to_string()));
        }
        info!(payment = %id, by = %actor.name, "Updated customer payment");
        self.invalidate(PAYMENT_TAGS);
        Ok(payment)
    }

    /// Delete a customer payment. Takes the raw identifier so a malformed
    /// one surfaces as its own error class; a well-formed identifier whose
    /// row is already gone is success, flagged so callers can warn.
    pub async fn delete_payment(
        &self,
        actor: &Identity,
        id: &str,
    ) -> Result<PaymentDeletion, AppError> {
        let payment_id =
            Uuid::parse_str(id).map_err(|_| AppError::InvalidIdentifier(id.to_string()))?;
        let removed = Self::guard("delete_payment", self.repo.delete_payment(payment_id).await)?;
        if removed {
            info!(payment = %payment_id, by = %actor.name, "Deleted customer payment");
        } else {
            warn!(payment = %payment_id, by = %actor.name, "Payment already deleted");
        }
        self.invalidate(PAYMENT_TAGS);
        Ok(PaymentDeletion {
            already_deleted: !removed,
        })
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .get_payment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment", id.to_string()))
    }

    pub async fn list_payments(
        &self,
        order_id: Option<OrderId>,
    ) -> Result<Vec<Payment>, AppError> {
        match order_id {
            Some(id) => Ok(self.repo.list_payments_for_order(id).await?),
            None => Ok(self.repo.list_payments().await?),
        }
    }

    // ===== Manual ledger entries =====

    pub async fn create_ledger_entry(
        &self,
        actor: &Identity,
        draft: LedgerEntryDraft,
    ) -> Result<LedgerEntry, AppError> {
        self.verify_ledger_operator(actor, "create ledger entries")
            .await?;
        if draft.amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Ledger amounts must be positive".to_string(),
            ));
        }
        let mut entry = LedgerEntry::new(
            draft.kind,
            draft.amount,
            draft.category,
            draft.entry_date,
            draft.description,
        )
        .with_creator(actor);
        if let Some(order_id) = draft.order_id {
            if self.repo.get_order(order_id).await?.is_none() {
                return Err(AppError::NotFound("Order", order_id.to_string()));
            }
            entry = entry.with_order(order_id);
        }
        Self::guard(
            "create_ledger_entry",
            self.repo.save_ledger_entry(&entry).await,
        )?;

        info!(
            entry = %entry.id,
            kind = %entry.kind,
            amount = entry.amount,
            category = %entry.category,
            by = %actor.name,
            "Created ledger entry"
        );
        self.invalidate(LEDGER_TAGS);
        Ok(entry)
    }

    /// Update a manual ledger entry. Gated like create and delete; an
    /// edit moves money just as surely as a fresh entry does.
    pub async fn update_ledger_entry(
        &self,
        actor: &Identity,
        id: LedgerEntryId,
        patch: LedgerEntryPatch,
    ) -> Result<LedgerEntry, AppError> {
        self.verify_ledger_operator(actor, "update ledger entries")
            .await?;
        let mut entry = self
            .repo
            .get_ledger_entry(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ledger entry", id.to_string()))?;
        if let Some(kind) = patch.kind {
            entry.kind = kind;
        }
        if let Some(amount) = patch.amount {
            if amount <= 0 {
                return Err(AppError::InvalidAmount(
                    "Ledger amounts must be positive".to_string(),
                ));
            }
            entry.amount = amount;
        }
        if let Some(category) = patch.category {
            entry.category = category;
        }
        if let Some(entry_date) = patch.entry_date {
            entry.entry_date = entry_date;
        }
        if let Some(description) = patch.description {
            entry.description = description;
        }
        let updated = Self::guard(
            "update_ledger_entry",
            self.repo.update_ledger_entry(&entry).await,
        )?;
        if !updated {
            return Err(AppError::NotFound("Ledger entry", id.to_string()));
        }
        info!(entry = %id, by = %actor.name, "Updated ledger entry");
        self.invalidate(LEDGER_TAGS);
        Ok(entry)
    }

    pub async fn delete_ledger_entry(
        &self,
        actor: &Identity,
        id: LedgerEntryId,
    ) -> Result<(), AppError> {
        self.verify_ledger_operator(actor, "delete ledger entries")
            .await?;
        let removed = Self::guard(
            "delete_ledger_entry",
            self.repo.delete_ledger_entry(id).await,
        )?;
        if !removed {
            return Err(AppError::NotFound("Ledger entry", id.to_string()));
        }
        info!(entry = %id, by = %actor.name, "Deleted ledger entry");
        self.invalidate(LEDGER_TAGS);
        Ok(())
    }

    pub async fn get_ledger_entry(&self, id: LedgerEntryId) -> Result<LedgerEntry, AppError> {
        self.repo
            .get_ledger_entry(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ledger entry", id.to_string()))
    }

    pub async fn list_ledger_entries(
        &self,
        kind: Option<LedgerEntryKind>,
        category: Option<&str>,
        order_id: Option<OrderId>,
        limit: Option<usize>,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        Ok(self
            .repo
            .list_ledger_entries_filtered(kind, category, order_id, limit)
            .await?)
    }
}
