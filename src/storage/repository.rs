use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::domain::{
    Ad, AdPlacement, Article, ArticleStatus, Category, CategoryId, Cents, EmployeePayment,
    EmployeePaymentId, HistoryEntry, HistoryEntryId, Identity, LedgerEntry, LedgerEntryId,
    LedgerEntryKind, NoteColor, Notification, NotificationId, Order, OrderId, Payment, PaymentId,
    PaymentMethod, Role, StickyNote, StickyNoteId, User, UserId, Whiteboard, payout_entry,
    payout_reversal,
};

use super::{MIGRATION_001_INITIAL, MIGRATION_002_CONTENT};

/// Everything a committed payout deletion produced: the removed row, the
/// compensating ledger entry, and how many notification-history lines were
/// unlinked from the payout.
#[derive(Debug, Clone)]
pub struct PayoutRemoval {
    pub payment: EmployeePayment,
    pub reversal: LedgerEntry,
    pub cleared_history: u64,
}

/// Repository owning all SQL against the back-office database.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::query(MIGRATION_002_CONTENT)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // User operations
    // ========================

    /// Save a new user to the database.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, created_at, archived_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.created_at.to_rfc3339())
        .bind(user.archived_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .context("Failed to save user")?;
        Ok(())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, role, created_at, archived_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, role, created_at, archived_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, name, role, created_at, archived_at
            FROM users
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        rows.iter().map(Self::row_to_user).collect()
    }

    /// Count users. Zero means the database is still unstaffed.
    pub async fn count_users(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(row.get("count"))
    }

    /// Mark a user as archived. Returns false if the user doesn't exist.
    pub async fn archive_user(&self, id: UserId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET archived_at = ?
            WHERE id = ? AND archived_at IS NULL
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to archive user")?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id_str: String = row.get("id");
        let role_str: String = row.get("role");
        let created_at_str: String = row.get("created_at");
        let archived_at_str: Option<String> = row.get("archived_at");

        Ok(User {
            id: Uuid::parse_str(&id_str).context("Invalid user ID")?,
            email: row.get("email"),
            name: row.get("name"),
            role: Role::from_str(&role_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid role: {}", role_str))?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            archived_at: archived_at_str
                .map(|s| DateTime::parse_from_rfc3339(&s))
                .transpose()
                .context("Invalid archived_at timestamp")?
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }

    // ========================
    // Order operations
    // ========================

    /// Save a new order to the database.
    pub async fn save_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, title, customer, description, price, employee, employee_id, employee_paid_amount, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id.to_string())
        .bind(&order.title)
        .bind(&order.customer)
        .bind(&order.description)
        .bind(order.price)
        .bind(&order.employee)
        .bind(order.employee_id.map(|id| id.to_string()))
        .bind(order.employee_paid_amount)
        .bind(order.created_at.to_rfc3339())
        .bind(order.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save order")?;
        Ok(())
    }

    /// Get an order by ID.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, customer, description, price, employee, employee_id, employee_paid_amount, created_at, updated_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch order")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_order(&row)?)),
            None => Ok(None),
        }
    }

    /// List all orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, customer, description, price, employee, employee_id, employee_paid_amount, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list orders")?;

        rows.iter().map(Self::row_to_order).collect()
    }

    /// Rewrite an order's descriptive fields. The paid total is deliberately
    /// not part of this statement; only the payout transactions move it.
    pub async fn update_order(&self, order: &Order) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET title = ?, customer = ?, description = ?, price = ?, employee = ?, employee_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&order.title)
        .bind(&order.customer)
        .bind(&order.description)
        .bind(order.price)
        .bind(&order.employee)
        .bind(order.employee_id.map(|id| id.to_string()))
        .bind(order.updated_at.to_rfc3339())
        .bind(order.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update order")?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch an order inside an open transaction.
    async fn fetch_order_tx(
        tx: &mut Transaction<'_, Sqlite>,
        id: OrderId,
    ) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, customer, description, price, employee, employee_id, employee_paid_amount, created_at, updated_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to fetch order")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_order(&row)?)),
            None => Ok(None),
        }
    }

    fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Result<Order> {
        let id_str: String = row.get("id");
        let employee_id_str: Option<String> = row.get("employee_id");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(Order {
            id: Uuid::parse_str(&id_str).context("Invalid order ID")?,
            title: row.get("title"),
            customer: row.get("customer"),
            description: row.get("description"),
            price: row.get("price"),
            employee: row.get("employee"),
            employee_id: employee_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid employee ID")?,
            employee_paid_amount: row.get("employee_paid_amount"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Customer payment operations
    // ========================

    /// Save a new customer payment.
    pub async fn save_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, amount, payment_date, method, received_by, received_by_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.order_id.to_string())
        .bind(payment.amount)
        .bind(payment.payment_date.to_rfc3339())
        .bind(payment.method.as_str())
        .bind(&payment.received_by)
        .bind(payment.received_by_id.map(|id| id.to_string()))
        .bind(payment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save payment")?;
        Ok(())
    }

    /// Get a customer payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, amount, payment_date, method, received_by, received_by_id, created_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch payment")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_payment(&row)?)),
            None => Ok(None),
        }
    }

    /// Rewrite a customer payment's mutable fields.
    pub async fn update_payment(&self, payment: &Payment) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET amount = ?, payment_date = ?, method = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.amount)
        .bind(payment.payment_date.to_rfc3339())
        .bind(payment.method.as_str())
        .bind(payment.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update payment")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a customer payment. Returns false when the row was already
    /// gone, which callers treat as success.
    pub async fn delete_payment(&self, id: PaymentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete payment")?;
        Ok(result.rows_affected() > 0)
    }

    /// List all customer payments, newest first.
    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, amount, payment_date, method, received_by, received_by_id, created_at
            FROM payments
            ORDER BY payment_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments")?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    /// List customer payments against one order.
    pub async fn list_payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, amount, payment_date, method, received_by, received_by_id, created_at
            FROM payments
            WHERE order_id = ?
            ORDER BY payment_date
            "#,
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments for order")?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    fn row_to_payment(row: &sqlx::sqlite::SqliteRow) -> Result<Payment> {
        let id_str: String = row.get("id");
        let order_id_str: String = row.get("order_id");
        let method_str: String = row.get("method");
        let payment_date_str: String = row.get("payment_date");
        let received_by_id_str: Option<String> = row.get("received_by_id");
        let created_at_str: String = row.get("created_at");

        Ok(Payment {
            id: Uuid::parse_str(&id_str).context("Invalid payment ID")?,
            order_id: Uuid::parse_str(&order_id_str).context("Invalid order ID")?,
            amount: row.get("amount"),
            payment_date: DateTime::parse_from_rfc3339(&payment_date_str)
                .context("Invalid payment_date timestamp")?
                .with_timezone(&Utc),
            method: PaymentMethod::from_str(&method_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid payment method: {}", method_str))?,
            received_by: row.get("received_by"),
            received_by_id: received_by_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid received_by ID")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Employee payment operations
    // ========================

    /// Record a payout and everything it implies in one transaction: the
    /// payout row, the bump of the order's paid total, and the linked
    /// expense entry. Returns `None` without committing when the order
    /// does not exist; any other failure rolls the whole transaction back.
    pub async fn add_employee_payment(
        &self,
        payment: &EmployeePayment,
        actor: &Identity,
    ) -> Result<Option<LedgerEntry>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO employee_payments (id, order_id, amount, payment_date, method, recipient, processed_by, processed_by_id, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.order_id.to_string())
        .bind(payment.amount)
        .bind(payment.payment_date.to_rfc3339())
        .bind(payment.method.as_str())
        .bind(&payment.recipient)
        .bind(&payment.processed_by)
        .bind(payment.processed_by_id.map(|id| id.to_string()))
        .bind(&payment.notes)
        .bind(payment.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Failed to insert employee payment")?;

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET employee_paid_amount = employee_paid_amount + ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.amount)
        .bind(Utc::now().to_rfc3339())
        .bind(payment.order_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to increment order paid total")?;

        if updated.rows_affected() == 0 {
            // No such order. Dropping the transaction rolls back the insert.
            return Ok(None);
        }

        // The order is read back inside the transaction for its legacy
        // employee text, which feeds the entry description.
        let order = Self::fetch_order_tx(&mut tx, payment.order_id)
            .await?
            .context("Order disappeared mid-transaction")?;

        let entry = payout_entry(payment, &order, actor);
        Self::insert_ledger_entry_tx(&mut tx, &entry).await?;

        tx.commit().await.context("Failed to commit payout")?;
        Ok(Some(entry))
    }

    /// Remove a payout and compensate for it in one transaction: delete the
    /// row, decrement the order's paid total by the amount read inside the
    /// same transaction, write the compensating income entry, and unlink
    /// every notification-history line pointing at the payout. Returns
    /// `None` without side effects when the payout does not exist.
    pub async fn delete_employee_payment(
        &self,
        id: EmployeePaymentId,
        actor: &Identity,
    ) -> Result<Option<PayoutRemoval>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            SELECT id, order_id, amount, payment_date, method, recipient, processed_by, processed_by_id, notes, created_at
            FROM employee_payments
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch employee payment")?;

        let payment = match row {
            Some(row) => Self::row_to_employee_payment(&row)?,
            None => return Ok(None),
        };

        sqlx::query("DELETE FROM employee_payments WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to delete employee payment")?;

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET employee_paid_amount = employee_paid_amount - ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.amount)
        .bind(Utc::now().to_rfc3339())
        .bind(payment.order_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to decrement order paid total")?;

        if updated.rows_affected() == 0 {
            // The payout pointed at an order that no longer exists. That is
            // an inconsistency, not a caller mistake; abort loudly.
            anyhow::bail!("order {} missing for payout {}", payment.order_id, id);
        }

        let order = Self::fetch_order_tx(&mut tx, payment.order_id)
            .await?
            .context("Order disappeared mid-transaction")?;

        let reversal = payout_reversal(&payment, &order, actor);
        Self::insert_ledger_entry_tx(&mut tx, &reversal).await?;

        let cleared = sqlx::query(
            r#"
            UPDATE notification_history
            SET is_paid = 0, employee_payment_id = NULL
            WHERE employee_payment_id = ?
            "#,
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to clear notification history")?;

        tx.commit()
            .await
            .context("Failed to commit payout removal")?;

        Ok(Some(PayoutRemoval {
            payment,
            reversal,
            cleared_history: cleared.rows_affected(),
        }))
    }

    /// Get an employee payment by ID.
    pub async fn get_employee_payment(
        &self,
        id: EmployeePaymentId,
    ) -> Result<Option<EmployeePayment>> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, amount, payment_date, method, recipient, processed_by, processed_by_id, notes, created_at
            FROM employee_payments
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch employee payment")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_employee_payment(&row)?)),
            None => Ok(None),
        }
    }

    /// List all employee payments, newest first.
    pub async fn list_employee_payments(&self) -> Result<Vec<EmployeePayment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, amount, payment_date, method, recipient, processed_by, processed_by_id, notes, created_at
            FROM employee_payments
            ORDER BY payment_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list employee payments")?;

        rows.iter().map(Self::row_to_employee_payment).collect()
    }

    /// List employee payments against one order.
    pub async fn list_employee_payments_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<EmployeePayment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, amount, payment_date, method, recipient, processed_by, processed_by_id, notes, created_at
            FROM employee_payments
            WHERE order_id = ?
            ORDER BY payment_date
            "#,
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list employee payments for order")?;

        rows.iter().map(Self::row_to_employee_payment).collect()
    }

    /// Sum payout amounts for one order with SQL aggregation. This is what
    /// the order's stored paid total must agree with.
    pub async fn sum_employee_payments_for_order(&self, order_id: OrderId) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) as total
            FROM employee_payments
            WHERE order_id = ?
            "#,
        )
        .bind(order_id.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum employee payments")?;

        Ok(row.get("total"))
    }

    fn row_to_employee_payment(row: &sqlx::sqlite::SqliteRow) -> Result<EmployeePayment> {
        let id_str: String = row.get("id");
        let order_id_str: String = row.get("order_id");
        let method_str: String = row.get("method");
        let payment_date_str: String = row.get("payment_date");
        let processed_by_id_str: Option<String> = row.get("processed_by_id");
        let created_at_str: String = row.get("created_at");

        Ok(EmployeePayment {
            id: Uuid::parse_str(&id_str).context("Invalid employee payment ID")?,
            order_id: Uuid::parse_str(&order_id_str).context("Invalid order ID")?,
            amount: row.get("amount"),
            payment_date: DateTime::parse_from_rfc3339(&payment_date_str)
                .context("Invalid payment_date timestamp")?
                .with_timezone(&Utc),
            method: PaymentMethod::from_str(&method_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid payment method: {}", method_str))?,
            recipient: row.get("recipient"),
            processed_by: row.get("processed_by"),
            processed_by_id: processed_by_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid processed_by ID")?,
            notes: row.get("notes"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Ledger entry operations
    // ========================

    /// Save a manual ledger entry.
    pub async fn save_ledger_entry(&self, entry: &LedgerEntry) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Self::insert_ledger_entry_tx(&mut tx, entry).await?;
        tx.commit().await.context("Failed to commit ledger entry")?;
        Ok(())
    }

    /// Insert a ledger entry inside an open transaction. The unique index
    /// on employee_payment_id rejects a second expense entry for the same
    /// payout, failing the surrounding transaction.
    async fn insert_ledger_entry_tx(
        tx: &mut Transaction<'_, Sqlite>,
        entry: &LedgerEntry,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, kind, amount, category, entry_date, description, created_by, created_by_id, order_id, employee_payment_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.kind.as_str())
        .bind(entry.amount)
        .bind(&entry.category)
        .bind(entry.entry_date.to_rfc3339())
        .bind(&entry.description)
        .bind(&entry.created_by)
        .bind(entry.created_by_id.map(|id| id.to_string()))
        .bind(entry.order_id.map(|id| id.to_string()))
        .bind(entry.employee_payment_id.map(|id| id.to_string()))
        .bind(entry.created_at.to_rfc3339())
        .execute(&mut **tx)
        .await
        .context("Failed to insert ledger entry")?;
        Ok(())
    }

    /// Get a ledger entry by ID.
    pub async fn get_ledger_entry(&self, id: LedgerEntryId) -> Result<Option<LedgerEntry>> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, amount, category, entry_date, description, created_by, created_by_id, order_id, employee_payment_id, created_at
            FROM ledger_entries
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch ledger entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_ledger_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// Rewrite a ledger entry's mutable fields.
    pub async fn update_ledger_entry(&self, entry: &LedgerEntry) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ledger_entries
            SET kind = ?, amount = ?, category = ?, entry_date = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.kind.as_str())
        .bind(entry.amount)
        .bind(&entry.category)
        .bind(entry.entry_date.to_rfc3339())
        .bind(&entry.description)
        .bind(entry.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update ledger entry")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a ledger entry.
    pub async fn delete_ledger_entry(&self, id: LedgerEntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ledger_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete ledger entry")?;
        Ok(result.rows_affected() > 0)
    }

    /// List all ledger entries, newest first.
    pub async fn list_ledger_entries(&self) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, amount, category, entry_date, description, created_by, created_by_id, order_id, employee_payment_id, created_at
            FROM ledger_entries
            ORDER BY entry_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list ledger entries")?;

        rows.iter().map(Self::row_to_ledger_entry).collect()
    }

    /// List ledger entries with optional filters.
    pub async fn list_ledger_entries_filtered(
        &self,
        kind: Option<LedgerEntryKind>,
        category: Option<&str>,
        order_id: Option<OrderId>,
        limit: Option<usize>,
    ) -> Result<Vec<LedgerEntry>> {
        // Build query dynamically based on filters
        let mut query = String::from(
            "SELECT id, kind, amount, category, entry_date, description, created_by, created_by_id, order_id, employee_payment_id, created_at FROM ledger_entries WHERE 1=1",
        );

        let order_id_str = order_id.map(|id| id.to_string());

        if kind.is_some() {
            query.push_str(" AND kind = ?");
        }
        if category.is_some() {
            query.push_str(" AND category = ?");
        }
        if order_id.is_some() {
            query.push_str(" AND order_id = ?");
        }

        query.push_str(" ORDER BY entry_date DESC");

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let mut sql_query = sqlx::query(&query);

        if let Some(k) = kind {
            sql_query = sql_query.bind(k.as_str());
        }
        if let Some(cat) = category {
            sql_query = sql_query.bind(cat);
        }
        if let Some(ref oid_str) = order_id_str {
            sql_query = sql_query.bind(oid_str);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list filtered ledger entries")?;

        rows.iter().map(Self::row_to_ledger_entry).collect()
    }

    fn row_to_ledger_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        let id_str: String = row.get("id");
        let kind_str: String = row.get("kind");
        let entry_date_str: String = row.get("entry_date");
        let created_by_id_str: Option<String> = row.get("created_by_id");
        let order_id_str: Option<String> = row.get("order_id");
        let employee_payment_id_str: Option<String> = row.get("employee_payment_id");
        let created_at_str: String = row.get("created_at");

        Ok(LedgerEntry {
            id: Uuid::parse_str(&id_str).context("Invalid ledger entry ID")?,
            kind: LedgerEntryKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid entry kind: {}", kind_str))?,
            amount: row.get("amount"),
            category: row.get("category"),
            entry_date: DateTime::parse_from_rfc3339(&entry_date_str)
                .context("Invalid entry_date timestamp")?
                .with_timezone(&Utc),
            description: row.get("description"),
            created_by: row.get("created_by"),
            created_by_id: created_by_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid created_by ID")?,
            order_id: order_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid order ID")?,
            employee_payment_id: employee_payment_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid employee payment ID")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Notification operations
    // ========================

    /// Save a new notification.
    pub async fn save_notification(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, title, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(notification.id.to_string())
        .bind(&notification.title)
        .bind(notification.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save notification")?;
        Ok(())
    }

    /// Get a notification by ID.
    pub async fn get_notification(&self, id: NotificationId) -> Result<Option<Notification>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, created_at
            FROM notifications
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch notification")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_notification(&row)?)),
            None => Ok(None),
        }
    }

    /// List all notifications, newest first.
    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, created_at
            FROM notifications
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list notifications")?;

        rows.iter().map(Self::row_to_notification).collect()
    }

    /// Save a new history entry under a notification.
    pub async fn save_history_entry(&self, entry: &HistoryEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_history (id, notification_id, message, is_paid, employee_payment_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.notification_id.to_string())
        .bind(&entry.message)
        .bind(entry.is_paid)
        .bind(entry.employee_payment_id.map(|id| id.to_string()))
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save history entry")?;
        Ok(())
    }

    /// Get a history entry by ID.
    pub async fn get_history_entry(&self, id: HistoryEntryId) -> Result<Option<HistoryEntry>> {
        let row = sqlx::query(
            r#"
            SELECT id, notification_id, message, is_paid, employee_payment_id, created_at
            FROM notification_history
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch history entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_history_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// List history entries under a notification, oldest first.
    pub async fn list_history_for_notification(
        &self,
        notification_id: NotificationId,
    ) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, notification_id, message, is_paid, employee_payment_id, created_at
            FROM notification_history
            WHERE notification_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(notification_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list history entries")?;

        rows.iter().map(Self::row_to_history_entry).collect()
    }

    /// List every history entry across all notifications, oldest first.
    pub async fn list_history_entries(&self) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, notification_id, message, is_paid, employee_payment_id, created_at
            FROM notification_history
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list history entries")?;

        rows.iter().map(Self::row_to_history_entry).collect()
    }

    /// Link one history entry to the payout that covers it. A targeted
    /// update; sibling entries are untouched.
    pub async fn mark_history_paid(
        &self,
        entry_id: HistoryEntryId,
        payment_id: EmployeePaymentId,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE notification_history
            SET is_paid = 1, employee_payment_id = ?
            WHERE id = ?
            "#,
        )
        .bind(payment_id.to_string())
        .bind(entry_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to mark history entry paid")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> Result<Notification> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Notification {
            id: Uuid::parse_str(&id_str).context("Invalid notification ID")?,
            title: row.get("title"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_history_entry(row: &sqlx::sqlite::SqliteRow) -> Result<HistoryEntry> {
        let id_str: String = row.get("id");
        let notification_id_str: String = row.get("notification_id");
        let employee_payment_id_str: Option<String> = row.get("employee_payment_id");
        let created_at_str: String = row.get("created_at");

        Ok(HistoryEntry {
            id: Uuid::parse_str(&id_str).context("Invalid history entry ID")?,
            notification_id: Uuid::parse_str(&notification_id_str)
                .context("Invalid notification ID")?,
            message: row.get("message"),
            is_paid: row.get::<i32, _>("is_paid") != 0,
            employee_payment_id: employee_payment_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid employee payment ID")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Category operations
    // ========================

    /// Save a new category.
    pub async fn save_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save category")?;
        Ok(())
    }

    /// Get a category by ID.
    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, created_at
            FROM categories
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch category")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_category(&row)?)),
            None => Ok(None),
        }
    }

    /// Get a category by slug.
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, created_at
            FROM categories
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch category by slug")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_category(&row)?)),
            None => Ok(None),
        }
    }

    /// List all categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, created_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        rows.iter().map(Self::row_to_category).collect()
    }

    /// Delete a category.
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Category {
            id: Uuid::parse_str(&id_str).context("Invalid category ID")?,
            name: row.get("name"),
            slug: row.get("slug"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Article operations
    // ========================

    /// Save a new article.
    pub async fn save_article(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles (id, title, body, category_id, author, author_id, status, published_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id.to_string())
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.category_id.map(|id| id.to_string()))
        .bind(&article.author)
        .bind(article.author_id.map(|id| id.to_string()))
        .bind(article.status.as_str())
        .bind(article.published_at.map(|dt| dt.to_rfc3339()))
        .bind(article.created_at.to_rfc3339())
        .bind(article.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save article")?;
        Ok(())
    }

    /// Get an article by ID.
    pub async fn get_article(&self, id: crate::domain::ArticleId) -> Result<Option<Article>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, body, category_id, author, author_id, status, published_at, created_at, updated_at
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch article")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_article(&row)?)),
            None => Ok(None),
        }
    }

    /// Rewrite an article's mutable fields, including status changes.
    pub async fn update_article(&self, article: &Article) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, body = ?, category_id = ?, status = ?, published_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.category_id.map(|id| id.to_string()))
        .bind(article.status.as_str())
        .bind(article.published_at.map(|dt| dt.to_rfc3339()))
        .bind(article.updated_at.to_rfc3339())
        .bind(article.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update article")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an article.
    pub async fn delete_article(&self, id: crate::domain::ArticleId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?;
        Ok(result.rows_affected() > 0)
    }

    /// List articles, optionally restricted to one status, newest first.
    pub async fn list_articles(&self, status: Option<ArticleStatus>) -> Result<Vec<Article>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT id, title, body, category_id, author, author_id, status, published_at, created_at, updated_at
                    FROM articles
                    WHERE status = ?
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, title, body, category_id, author, author_id, status, published_at, created_at, updated_at
                    FROM articles
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list articles")?;

        rows.iter().map(Self::row_to_article).collect()
    }

    fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
        let id_str: String = row.get("id");
        let category_id_str: Option<String> = row.get("category_id");
        let author_id_str: Option<String> = row.get("author_id");
        let status_str: String = row.get("status");
        let published_at_str: Option<String> = row.get("published_at");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(Article {
            id: Uuid::parse_str(&id_str).context("Invalid article ID")?,
            title: row.get("title"),
            body: row.get("body"),
            category_id: category_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid category ID")?,
            author: row.get("author"),
            author_id: author_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid author ID")?,
            status: ArticleStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid article status: {}", status_str))?,
            published_at: published_at_str
                .map(|s| DateTime::parse_from_rfc3339(&s))
                .transpose()
                .context("Invalid published_at timestamp")?
                .map(|dt| dt.with_timezone(&Utc)),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Ad operations
    // ========================

    /// Save a new ad.
    pub async fn save_ad(&self, ad: &Ad) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ads (id, advertiser, image_url, link_url, placement, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ad.id.to_string())
        .bind(&ad.advertiser)
        .bind(&ad.image_url)
        .bind(&ad.link_url)
        .bind(ad.placement.as_str())
        .bind(ad.active)
        .bind(ad.created_at.to_rfc3339())
        .bind(ad.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save ad")?;
        Ok(())
    }

    /// Get an ad by ID.
    pub async fn get_ad(&self, id: crate::domain::AdId) -> Result<Option<Ad>> {
        let row = sqlx::query(
            r#"
            SELECT id, advertiser, image_url, link_url, placement, active, created_at, updated_at
            FROM ads
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch ad")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_ad(&row)?)),
            None => Ok(None),
        }
    }

    /// Rewrite an ad's mutable fields.
    pub async fn update_ad(&self, ad: &Ad) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ads
            SET advertiser = ?, image_url = ?, link_url = ?, placement = ?, active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&ad.advertiser)
        .bind(&ad.image_url)
        .bind(&ad.link_url)
        .bind(ad.placement.as_str())
        .bind(ad.active)
        .bind(ad.updated_at.to_rfc3339())
        .bind(ad.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update ad")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an ad.
    pub async fn delete_ad(&self, id: crate::domain::AdId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ads WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete ad")?;
        Ok(result.rows_affected() > 0)
    }

    /// List ads, optionally only the active ones.
    pub async fn list_ads(&self, only_active: bool) -> Result<Vec<Ad>> {
        let query = if only_active {
            "SELECT id, advertiser, image_url, link_url, placement, active, created_at, updated_at FROM ads WHERE active = 1 ORDER BY created_at DESC"
        } else {
            "SELECT id, advertiser, image_url, link_url, placement, active, created_at, updated_at FROM ads ORDER BY created_at DESC"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list ads")?;

        rows.iter().map(Self::row_to_ad).collect()
    }

    fn row_to_ad(row: &sqlx::sqlite::SqliteRow) -> Result<Ad> {
        let id_str: String = row.get("id");
        let placement_str: String = row.get("placement");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(Ad {
            id: Uuid::parse_str(&id_str).context("Invalid ad ID")?,
            advertiser: row.get("advertiser"),
            image_url: row.get("image_url"),
            link_url: row.get("link_url"),
            placement: AdPlacement::from_str(&placement_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid ad placement: {}", placement_str))?,
            active: row.get::<i32, _>("active") != 0,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Widget operations
    // ========================

    /// Save a new sticky note.
    pub async fn save_note(&self, note: &StickyNote) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sticky_notes (id, body, color, author, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(note.id.to_string())
        .bind(&note.body)
        .bind(note.color.as_str())
        .bind(&note.author)
        .bind(note.author_id.map(|id| id.to_string()))
        .bind(note.created_at.to_rfc3339())
        .bind(note.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save note")?;
        Ok(())
    }

    /// Get a sticky note by ID.
    pub async fn get_note(&self, id: StickyNoteId) -> Result<Option<StickyNote>> {
        let row = sqlx::query(
            r#"
            SELECT id, body, color, author, author_id, created_at, updated_at
            FROM sticky_notes
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch note")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_note(&row)?)),
            None => Ok(None),
        }
    }

    /// Rewrite a sticky note's body and color.
    pub async fn update_note(&self, note: &StickyNote) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sticky_notes
            SET body = ?, color = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&note.body)
        .bind(note.color.as_str())
        .bind(note.updated_at.to_rfc3339())
        .bind(note.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update note")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a sticky note.
    pub async fn delete_note(&self, id: StickyNoteId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sticky_notes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete note")?;
        Ok(result.rows_affected() > 0)
    }

    /// List all sticky notes, newest first.
    pub async fn list_notes(&self) -> Result<Vec<StickyNote>> {
        let rows = sqlx::query(
            r#"
            SELECT id, body, color, author, author_id, created_at, updated_at
            FROM sticky_notes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list notes")?;

        rows.iter().map(Self::row_to_note).collect()
    }

    /// Read the shared whiteboard. The row is seeded by the migration, so
    /// it always exists.
    pub async fn get_whiteboard(&self) -> Result<Whiteboard> {
        let row = sqlx::query(
            r#"
            SELECT content, updated_by, updated_by_id, updated_at
            FROM whiteboard
            WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to fetch whiteboard")?;

        Self::row_to_whiteboard(&row)
    }

    /// Overwrite the shared whiteboard.
    pub async fn update_whiteboard(&self, board: &Whiteboard) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE whiteboard
            SET content = ?, updated_by = ?, updated_by_id = ?, updated_at = ?
            WHERE id = 1
            "#,
        )
        .bind(&board.content)
        .bind(&board.updated_by)
        .bind(board.updated_by_id.map(|id| id.to_string()))
        .bind(board.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to update whiteboard")?;
        Ok(())
    }

    fn row_to_note(row: &sqlx::sqlite::SqliteRow) -> Result<StickyNote> {
        let id_str: String = row.get("id");
        let color_str: String = row.get("color");
        let author_id_str: Option<String> = row.get("author_id");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(StickyNote {
            id: Uuid::parse_str(&id_str).context("Invalid note ID")?,
            body: row.get("body"),
            color: NoteColor::from_str(&color_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid note color: {}", color_str))?,
            author: row.get("author"),
            author_id: author_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid author ID")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_whiteboard(row: &sqlx::sqlite::SqliteRow) -> Result<Whiteboard> {
        let updated_by_id_str: Option<String> = row.get("updated_by_id");
        let updated_at_str: String = row.get("updated_at");

        Ok(Whiteboard {
            content: row.get("content"),
            updated_by: row.get("updated_by"),
            updated_by_id: updated_by_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid updated_by ID")?,
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .context("Invalid updated_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Snapshot restore
    // ========================
    //
    // Restore writes rows exactly as the snapshot holds them, keyed by
    // primary id. No referential checks: orphaned references are accepted.

    /// Upsert a user row by id.
    pub async fn upsert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO users (id, email, name, role, created_at, archived_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.created_at.to_rfc3339())
        .bind(user.archived_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .context("Failed to upsert user")?;
        Ok(())
    }

    /// Upsert an order row by id, stored paid total included.
    pub async fn upsert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO orders (id, title, customer, description, price, employee, employee_id, employee_paid_amount, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id.to_string())
        .bind(&order.title)
        .bind(&order.customer)
        .bind(&order.description)
        .bind(order.price)
        .bind(&order.employee)
        .bind(order.employee_id.map(|id| id.to_string()))
        .bind(order.employee_paid_amount)
        .bind(order.created_at.to_rfc3339())
        .bind(order.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert order")?;
        Ok(())
    }

    /// Upsert a customer payment row by id.
    pub async fn upsert_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO payments (id, order_id, amount, payment_date, method, received_by, received_by_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.order_id.to_string())
        .bind(payment.amount)
        .bind(payment.payment_date.to_rfc3339())
        .bind(payment.method.as_str())
        .bind(&payment.received_by)
        .bind(payment.received_by_id.map(|id| id.to_string()))
        .bind(payment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert payment")?;
        Ok(())
    }

    /// Upsert an employee payment row by id.
    pub async fn upsert_employee_payment(&self, payment: &EmployeePayment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO employee_payments (id, order_id, amount, payment_date, method, recipient, processed_by, processed_by_id, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.order_id.to_string())
        .bind(payment.amount)
        .bind(payment.payment_date.to_rfc3339())
        .bind(payment.method.as_str())
        .bind(&payment.recipient)
        .bind(&payment.processed_by)
        .bind(payment.processed_by_id.map(|id| id.to_string()))
        .bind(&payment.notes)
        .bind(payment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert employee payment")?;
        Ok(())
    }

    /// Upsert a ledger entry row by id.
    pub async fn upsert_ledger_entry(&self, entry: &LedgerEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO ledger_entries (id, kind, amount, category, entry_date, description, created_by, created_by_id, order_id, employee_payment_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.kind.as_str())
        .bind(entry.amount)
        .bind(&entry.category)
        .bind(entry.entry_date.to_rfc3339())
        .bind(&entry.description)
        .bind(&entry.created_by)
        .bind(entry.created_by_id.map(|id| id.to_string()))
        .bind(entry.order_id.map(|id| id.to_string()))
        .bind(entry.employee_payment_id.map(|id| id.to_string()))
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert ledger entry")?;
        Ok(())
    }

    /// Upsert a notification row by id.
    pub async fn upsert_notification(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO notifications (id, title, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(notification.id.to_string())
        .bind(&notification.title)
        .bind(notification.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert notification")?;
        Ok(())
    }

    /// Upsert a notification history row by id.
    pub async fn upsert_history_entry(&self, entry: &HistoryEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO notification_history (id, notification_id, message, is_paid, employee_payment_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.notification_id.to_string())
        .bind(&entry.message)
        .bind(entry.is_paid)
        .bind(entry.employee_payment_id.map(|id| id.to_string()))
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert history entry")?;
        Ok(())
    }

    /// Upsert a category row by id.
    pub async fn upsert_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO categories (id, name, slug, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert category")?;
        Ok(())
    }

    /// Upsert an article row by id.
    pub async fn upsert_article(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO articles (id, title, body, category_id, author, author_id, status, published_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id.to_string())
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.category_id.map(|id| id.to_string()))
        .bind(&article.author)
        .bind(article.author_id.map(|id| id.to_string()))
        .bind(article.status.as_str())
        .bind(article.published_at.map(|dt| dt.to_rfc3339()))
        .bind(article.created_at.to_rfc3339())
        .bind(article.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert article")?;
        Ok(())
    }

    /// Upsert an ad row by id.
    pub async fn upsert_ad(&self, ad: &Ad) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO ads (id, advertiser, image_url, link_url, placement, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ad.id.to_string())
        .bind(&ad.advertiser)
        .bind(&ad.image_url)
        .bind(&ad.link_url)
        .bind(ad.placement.as_str())
        .bind(ad.active)
        .bind(ad.created_at.to_rfc3339())
        .bind(ad.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert ad")?;
        Ok(())
    }

    /// Upsert a sticky note row by id.
    pub async fn upsert_note(&self, note: &StickyNote) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO sticky_notes (id, body, color, author, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(note.id.to_string())
        .bind(&note.body)
        .bind(note.color.as_str())
        .bind(&note.author)
        .bind(note.author_id.map(|id| id.to_string()))
        .bind(note.created_at.to_rfc3339())
        .bind(note.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert note")?;
        Ok(())
    }
}
