use chrono::Utc;
use tracing::{error, info};

use crate::application::business::BusinessData;
use crate::application::cache::{ORDER_TAGS, STAFF_TAGS, TaggedCache, VIEW_TTL, ViewTag};
use crate::application::AppError;
use crate::domain::{Cents, Identity, Order, OrderId, OrderPatch, Role, User, UserId};
use crate::storage::Repository;

/// Application service providing high-level operations for the back office.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct BackofficeService {
    pub(crate) repo: Repository,
    pub(crate) business_view: TaggedCache<BusinessData>,
}

impl BackofficeService {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            business_view: TaggedCache::new(&[ViewTag::Business], VIEW_TTL),
        }
    }

    /// Create a new service with a fresh database (runs migrations).
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Direct repository access for the backup boundary, which works
    /// beneath the service's authorization layer.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Unwrap a repository result at the operation boundary. Failures are
    /// logged with the full error chain here and surfaced to the caller
    /// only as the coarse storage error.
    pub(crate) fn guard<T>(
        operation: &'static str,
        result: anyhow::Result<T>,
    ) -> Result<T, AppError> {
        result.map_err(|err| {
            error!(operation, detail = format!("{err:#}"), "Storage failure");
            AppError::Storage(err)
        })
    }

    /// Apply a mutation's tag set to every registered view cache. New
    /// cached views subscribe here so no mutation can forget one.
    pub(crate) fn invalidate(&self, tags: &[ViewTag]) {
        self.business_view.invalidate(tags);
    }

    pub(crate) fn require_admin(actor: &Identity, action: &'static str) -> Result<(), AppError> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden {
                role: actor.role,
                action,
            });
        }
        Ok(())
    }

    pub(crate) fn require_editorial(
        actor: &Identity,
        action: &'static str,
    ) -> Result<(), AppError> {
        if !actor.role.is_editorial() {
            return Err(AppError::Forbidden {
                role: actor.role,
                action,
            });
        }
        Ok(())
    }

    pub(crate) fn require_privileged(
        actor: &Identity,
        action: &'static str,
    ) -> Result<(), AppError> {
        if !actor.role.is_privileged() {
            return Err(AppError::Forbidden {
                role: actor.role,
                action,
            });
        }
        Ok(())
    }

    /// Ledger entries move real money, so the privileged role is re-read
    /// from the stored user record at call time instead of trusted from
    /// the identity the caller carries.
    pub(crate) async fn verify_ledger_operator(
        &self,
        actor: &Identity,
        action: &'static str,
    ) -> Result<(), AppError> {
        let user = self
            .repo
            .get_user(actor.id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if user.is_archived() {
            return Err(AppError::Unauthorized);
        }
        if !user.role.is_privileged() {
            return Err(AppError::Forbidden {
                role: user.role,
                action,
            });
        }
        Ok(())
    }

    // ===== Identity =====

    /// Resolve a staff email to the identity carried through operations.
    pub async fn identify(&self, email: &str) -> Result<Identity, AppError> {
        let user = self
            .repo
            .get_user_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if user.is_archived() {
            return Err(AppError::Unauthorized);
        }
        Ok(user.identity())
    }

    /// Seed the first admin account. Only valid on an unstaffed database.
    pub async fn bootstrap_admin(&self, email: String, name: String) -> Result<User, AppError> {
        if self.repo.count_users().await? > 0 {
            return Err(AppError::AlreadyStaffed);
        }
        let user = User::new(email, name, Role::Admin);
        Self::guard("bootstrap_admin", self.repo.save_user(&user).await)?;
        info!(user = %user.id, email = %user.email, "Seeded first admin");
        self.invalidate(STAFF_TAGS);
        Ok(user)
    }

    // ===== Users =====

    pub async fn create_user(
        &self,
        actor: &Identity,
        email: String,
        name: String,
        role: Role,
    ) -> Result<User, AppError> {
        Self::require_admin(actor, "manage staff")?;
        if self.repo.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::AlreadyExists("User", email));
        }
        let user = User::new(email, name, role);
        Self::guard("create_user", self.repo.save_user(&user).await)?;
        info!(user = %user.id, role = %user.role, by = %actor.name, "Created staff member");
        self.invalidate(STAFF_TAGS);
        Ok(user)
    }

    /// Archive a staff member. Archived users keep their rows for name
    /// resolution but can no longer sign in.
    pub async fn archive_user(&self, actor: &Identity, id: UserId) -> Result<User, AppError> {
        Self::require_admin(actor, "manage staff")?;
        let mut user = self
            .repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User", id.to_string()))?;
        if user.is_archived() {
            return Ok(user);
        }
        user.archived_at = Some(Utc::now());
        let archived = Self::guard("archive_user", self.repo.archive_user(id).await)?;
        if !archived {
            return Err(AppError::NotFound("User", id.to_string()));
        }
        info!(user = %id, by = %actor.name, "Archived staff member");
        self.invalidate(STAFF_TAGS);
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User", id.to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repo.list_users().await?)
    }

    // ===== Orders =====

    #[allow(clippy::too_many_arguments)]
    pub async fn create_order(
        &self,
        actor: &Identity,
        title: String,
        customer: String,
        price: Cents,
        description: Option<String>,
        employee: Option<String>,
        employee_id: Option<UserId>,
    ) -> Result<Order, AppError> {
        Self::require_editorial(actor, "create orders")?;
        if price < 0 {
            return Err(AppError::InvalidAmount(
                "Order price cannot be negative".to_string(),
            ));
        }
        let mut order = Order::new(title, customer, price);
        if let Some(description) = description {
            order = order.with_description(description);
        }
        if let Some(employee) = employee {
            order = order.with_employee(employee);
        }
        if let Some(employee_id) = employee_id {
            order = order.with_employee_id(employee_id);
        }
        Self::guard("create_order", self.repo.save_order(&order).await)?;
        info!(order = %order.id, customer = %order.customer, by = %actor.name, "Created order");
        self.invalidate(ORDER_TAGS);
        Ok(order)
    }

    /// Update descriptive order fields. The paid total is owned by the
    /// payout operations and cannot be patched here.
    pub async fn update_order(
        &self,
        actor: &Identity,
        id: OrderId,
        patch: OrderPatch,
    ) -> Result<Order, AppError> {
        Self::require_editorial(actor, "update orders")?;
        let mut order = self
            .repo
            .get_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order", id.to_string()))?;
        if let Some(title) = patch.title {
            order.title = title;
        }
        if let Some(customer) = patch.customer {
            order.customer = customer;
        }
        if let Some(description) = patch.description {
            order.description = Some(description);
        }
        if let Some(price) = patch.price {
            if price < 0 {
                return Err(AppError::InvalidAmount(
                    "Order price cannot be negative".to_string(),
                ));
            }
            order.price = price;
        }
        if let Some(employee) = patch.employee {
            order.employee = Some(employee);
        }
        if let Some(employee_id) = patch.employee_id {
            order.employee_id = Some(employee_id);
        }
        order.updated_at = Utc::now();
        let updated = Self::guard("update_order", self.repo.update_order(&order).await)?;
        if !updated {
            return Err(AppError::NotFound("Order", id.to_string()));
        }
        info!(order = %order.id, by = %actor.name, "Updated order");
        self.invalidate(ORDER_TAGS);
        Ok(order)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order, AppError> {
        self.repo
            .get_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order", id.to_string()))
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.repo.list_orders().await?)
    }
}
