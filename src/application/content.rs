use chrono::Utc;
use tracing::info;

use crate::application::cache::{CONTENT_TAGS, NOTIFICATION_TAGS};
use crate::application::{AppError, BackofficeService};
use crate::domain::{
    Ad, AdId, AdPatch, AdPlacement, Article, ArticleId, ArticlePatch, ArticleStatus, Category,
    CategoryId, EmployeePaymentId, HistoryEntry, HistoryEntryId, Identity, NoteColor,
    Notification, NotificationId, Role, StickyNote, StickyNoteId, Whiteboard,
};

/// A notification together with its history lines, oldest first.
#[derive(Debug, Clone)]
pub struct NotificationWithHistory {
    pub notification: Notification,
    pub entries: Vec<HistoryEntry>,
}

impl BackofficeService {
    // ===== Notifications =====

    pub async fn create_notification(
        &self,
        actor: &Identity,
        title: String,
    ) -> Result<Notification, AppError> {
        let notification = Notification::new(title);
        Self::guard(
            "create_notification",
            self.repo.save_notification(&notification).await,
        )?;
        info!(notification = %notification.id, by = %actor.name, "Created notification");
        self.invalidate(NOTIFICATION_TAGS);
        Ok(notification)
    }

    pub async fn add_history_entry(
        &self,
        actor: &Identity,
        notification_id: NotificationId,
        message: String,
    ) -> Result<HistoryEntry, AppError> {
        if self.repo.get_notification(notification_id).await?.is_none() {
            return Err(AppError::NotFound(
                "Notification",
                notification_id.to_string(),
            ));
        }
        let entry = HistoryEntry::new(notification_id, message);
        Self::guard(
            "add_history_entry",
            self.repo.save_history_entry(&entry).await,
        )?;
        info!(
            notification = %notification_id,
            entry = %entry.id,
            by = %actor.name,
            "Added history entry"
        );
        self.invalidate(NOTIFICATION_TAGS);
        Ok(entry)
    }

    /// Link a history line to the payout that covers it. The payout must
    /// exist; history never references a payout that is gone.
    pub async fn mark_history_paid(
        &self,
        actor: &Identity,
        entry_id: HistoryEntryId,
        payment_id: EmployeePaymentId,
    ) -> Result<HistoryEntry, AppError> {
        let mut entry = self
            .repo
            .get_history_entry(entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound("History entry", entry_id.to_string()))?;
        if self.repo.get_employee_payment(payment_id).await?.is_none() {
            return Err(AppError::NotFound(
                "Employee payment",
                payment_id.to_string(),
            ));
        }
        let marked = Self::guard(
            "mark_history_paid",
            self.repo.mark_history_paid(entry_id, payment_id).await,
        )?;
        if !marked {
            return Err(AppError::NotFound("History entry", entry_id.to_string()));
        }
        entry.mark_paid(payment_id);
        info!(entry = %entry_id, payout = %payment_id, by = %actor.name, "Marked history entry paid");
        self.invalidate(NOTIFICATION_TAGS);
        Ok(entry)
    }

    pub async fn list_notifications(&self) -> Result<Vec<NotificationWithHistory>, AppError> {
        let notifications = self.repo.list_notifications().await?;
        let mut result = Vec::with_capacity(notifications.len());
        for notification in notifications {
            let entries = self
                .repo
                .list_history_for_notification(notification.id)
                .await?;
            result.push(NotificationWithHistory {
                notification,
                entries,
            });
        }
        Ok(result)
    }

    // ===== Categories =====

    pub async fn create_category(
        &self,
        actor: &Identity,
        name: String,
    ) -> Result<Category, AppError> {
        Self::require_editorial(actor, "manage categories")?;
        let category = Category::new(name);
        if self
            .repo
            .get_category_by_slug(&category.slug)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists("Category", category.slug));
        }
        Self::guard("create_category", self.repo.save_category(&category).await)?;
        info!(category = %category.slug, by = %actor.name, "Created category");
        self.invalidate(CONTENT_TAGS);
        Ok(category)
    }

    /// Delete a category. Articles keep their dangling reference; readers
    /// of the article view treat it as uncategorized.
    pub async fn delete_category(&self, actor: &Identity, id: CategoryId) -> Result<(), AppError> {
        Self::require_editorial(actor, "manage categories")?;
        let removed = Self::guard("delete_category", self.repo.delete_category(id).await)?;
        if !removed {
            return Err(AppError::NotFound("Category", id.to_string()));
        }
        info!(category = %id, by = %actor.name, "Deleted category");
        self.invalidate(CONTENT_TAGS);
        Ok(())
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, AppError> {
        self.repo
            .get_category_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Category", slug.to_string()))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.repo.list_categories().await?)
    }

    // ===== Articles =====

    pub async fn create_article(
        &self,
        actor: &Identity,
        title: String,
        body: String,
        category_id: Option<CategoryId>,
    ) -> Result<Article, AppError> {
        let mut article = Article::new(title, body).with_author(actor);
        if let Some(category_id) = category_id {
            if self.repo.get_category(category_id).await?.is_none() {
                return Err(AppError::NotFound("Category", category_id.to_string()));
            }
            article = article.with_category(category_id);
        }
        Self::guard("create_article", self.repo.save_article(&article).await)?;
        info!(article = %article.id, by = %actor.name, "Created article draft");
        self.invalidate(CONTENT_TAGS);
        Ok(article)
    }

    /// Update an article. Authors may only touch their own drafts; editors
    /// and above may touch any.
    pub async fn update_article(
        &self,
        actor: &Identity,
        id: ArticleId,
        patch: ArticlePatch,
    ) -> Result<Article, AppError> {
        let mut article = self
            .repo
            .get_article(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article", id.to_string()))?;
        Self::require_own_or_editorial(actor, article.author_id, "edit this article")?;
        if let Some(title) = patch.title {
            article.title = title;
        }
        if let Some(body) = patch.body {
            article.body = body;
        }
        if let Some(category_id) = patch.category_id {
            if let Some(category_id) = category_id {
                if self.repo.get_category(category_id).await?.is_none() {
                    return Err(AppError::NotFound("Category", category_id.to_string()));
                }
            }
            article.category_id = category_id;
        }
        article.updated_at = Utc::now();
        let updated = Self::guard("update_article", self.repo.update_article(&article).await)?;
        if !updated {
            return Err(AppError::NotFound("Article", id.to_string()));
        }
        info!(article = %id, by = %actor.name, "Updated article");
        self.invalidate(CONTENT_TAGS);
        Ok(article)
    }

    pub async fn delete_article(&self, actor: &Identity, id: ArticleId) -> Result<(), AppError> {
        let article = self
            .repo
            .get_article(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article", id.to_string()))?;
        Self::require_own_or_editorial(actor, article.author_id, "delete this article")?;
        let removed = Self::guard("delete_article", self.repo.delete_article(id).await)?;
        if !removed {
            return Err(AppError::NotFound("Article", id.to_string()));
        }
        info!(article = %id, by = %actor.name, "Deleted article");
        self.invalidate(CONTENT_TAGS);
        Ok(())
    }

    pub async fn publish_article(
        &self,
        actor: &Identity,
        id: ArticleId,
    ) -> Result<Article, AppError> {
        Self::require_editorial(actor, "publish articles")?;
        let mut article = self
            .repo
            .get_article(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article", id.to_string()))?;
        article.status = ArticleStatus::Published;
        article.published_at = Some(Utc::now());
        article.updated_at = Utc::now();
        let updated = Self::guard("publish_article", self.repo.update_article(&article).await)?;
        if !updated {
            return Err(AppError::NotFound("Article", id.to_string()));
        }
        info!(article = %id, by = %actor.name, "Published article");
        self.invalidate(CONTENT_TAGS);
        Ok(article)
    }

    pub async fn unpublish_article(
        &self,
        actor: &Identity,
        id: ArticleId,
    ) -> Result<Article, AppError> {
        Self::require_editorial(actor, "unpublish articles")?;
        let mut article = self
            .repo
            .get_article(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article", id.to_string()))?;
        article.status = ArticleStatus::Draft;
        article.published_at = None;
        article.updated_at = Utc::now();
        let updated = Self::guard(
            "unpublish_article",
            self.repo.update_article(&article).await,
        )?;
        if !updated {
            return Err(AppError::NotFound("Article", id.to_string()));
        }
        info!(article = %id, by = %actor.name, "Unpublished article");
        self.invalidate(CONTENT_TAGS);
        Ok(article)
    }

    pub async fn get_article(&self, id: ArticleId) -> Result<Article, AppError> {
        self.repo
            .get_article(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article", id.to_string()))
    }

    pub async fn list_articles(
        &self,
        status: Option<ArticleStatus>,
    ) -> Result<Vec<Article>, AppError> {
        Ok(self.repo.list_articles(status).await?)
    }

    // ===== Ads =====

    pub async fn create_ad(
        &self,
        actor: &Identity,
        advertiser: String,
        image_url: String,
        link_url: Option<String>,
        placement: AdPlacement,
    ) -> Result<Ad, AppError> {
        Self::require_privileged(actor, "manage ads")?;
        let mut ad = Ad::new(advertiser, image_url, placement);
        if let Some(link_url) = link_url {
            ad = ad.with_link(link_url);
        }
        Self::guard("create_ad", self.repo.save_ad(&ad).await)?;
        info!(ad = %ad.id, advertiser = %ad.advertiser, by = %actor.name, "Created ad");
        self.invalidate(CONTENT_TAGS);
        Ok(ad)
    }

    pub async fn update_ad(
        &self,
        actor: &Identity,
        id: AdId,
        patch: AdPatch,
    ) -> Result<Ad, AppError> {
        Self::require_privileged(actor, "manage ads")?;
        let mut ad = self
            .repo
            .get_ad(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ad", id.to_string()))?;
        if let Some(advertiser) = patch.advertiser {
            ad.advertiser = advertiser;
        }
        if let Some(image_url) = patch.image_url {
            ad.image_url = image_url;
        }
        if let Some(link_url) = patch.link_url {
            ad.link_url = link_url;
        }
        if let Some(placement) = patch.placement {
            ad.placement = placement;
        }
        if let Some(active) = patch.active {
            ad.active = active;
        }
        ad.updated_at = Utc::now();
        let updated = Self::guard("update_ad", self.repo.update_ad(&ad).await)?;
        if !updated {
            return Err(AppError::NotFound("Ad", id.to_string()));
        }
        info!(ad = %id, by = %actor.name, "Updated ad");
        self.invalidate(CONTENT_TAGS);
        Ok(ad)
    }

    pub async fn delete_ad(&self, actor: &Identity, id: AdId) -> Result<(), AppError> {
        Self::require_privileged(actor, "manage ads")?;
        let removed = Self::guard("delete_ad", self.repo.delete_ad(id).await)?;
        if !removed {
            return Err(AppError::NotFound("Ad", id.to_string()));
        }
        info!(ad = %id, by = %actor.name, "Deleted ad");
        self.invalidate(CONTENT_TAGS);
        Ok(())
    }

    pub async fn list_ads(&self, only_active: bool) -> Result<Vec<Ad>, AppError> {
        Ok(self.repo.list_ads(only_active).await?)
    }

    // ===== Sticky notes =====

    pub async fn add_note(
        &self,
        actor: &Identity,
        body: String,
        color: NoteColor,
    ) -> Result<StickyNote, AppError> {
        let note = StickyNote::new(body, color, actor);
        Self::guard("add_note", self.repo.save_note(&note).await)?;
        info!(note = %note.id, by = %actor.name, "Added sticky note");
        self.invalidate(CONTENT_TAGS);
        Ok(note)
    }

    /// Update a sticky note. Only the author may edit; not even an admin
    /// rewrites someone else's note.
    pub async fn update_note(
        &self,
        actor: &Identity,
        id: StickyNoteId,
        body: Option<String>,
        color: Option<NoteColor>,
    ) -> Result<StickyNote, AppError> {
        let mut note = self
            .repo
            .get_note(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sticky note", id.to_string()))?;
        if note.author_id != Some(actor.id) {
            return Err(AppError::Forbidden {
                role: actor.role,
                action: "edit someone else's note",
            });
        }
        if let Some(body) = body {
            note.body = body;
        }
        if let Some(color) = color {
            note.color = color;
        }
        note.updated_at = Utc::now();
        let updated = Self::guard("update_note", self.repo.update_note(&note).await)?;
        if !updated {
            return Err(AppError::NotFound("Sticky note", id.to_string()));
        }
        info!(note = %id, by = %actor.name, "Updated sticky note");
        self.invalidate(CONTENT_TAGS);
        Ok(note)
    }

    /// Take a note down. The author may always remove their own; an admin
    /// may remove anyone's.
    pub async fn delete_note(&self, actor: &Identity, id: StickyNoteId) -> Result<(), AppError> {
        let note = self
            .repo
            .get_note(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sticky note", id.to_string()))?;
        if note.author_id != Some(actor.id) && actor.role != Role::Admin {
            return Err(AppError::Forbidden {
                role: actor.role,
                action: "remove someone else's note",
            });
        }
        let removed = Self::guard("delete_note", self.repo.delete_note(id).await)?;
        if !removed {
            return Err(AppError::NotFound("Sticky note", id.to_string()));
        }
        info!(note = %id, by = %actor.name, "Removed sticky note");
        self.invalidate(CONTENT_TAGS);
        Ok(())
    }

    pub async fn list_notes(&self) -> Result<Vec<StickyNote>, AppError> {
        Ok(self.repo.list_notes().await?)
    }

    // ===== Whiteboard =====

    pub async fn whiteboard(&self) -> Result<Whiteboard, AppError> {
        Ok(self.repo.get_whiteboard().await?)
    }

    /// Replace the whiteboard wholesale. Last writer wins.
    pub async fn write_whiteboard(
        &self,
        actor: &Identity,
        content: String,
    ) -> Result<Whiteboard, AppError> {
        let board = Whiteboard {
            content,
            updated_by: Some(actor.name.clone()),
            updated_by_id: Some(actor.id),
            updated_at: Utc::now(),
        };
        Self::guard(
            "write_whiteboard",
            self.repo.update_whiteboard(&board).await,
        )?;
        info!(by = %actor.name, "Rewrote whiteboard");
        self.invalidate(CONTENT_TAGS);
        Ok(board)
    }

    fn require_own_or_editorial(
        actor: &Identity,
        owner: Option<crate::domain::UserId>,
        action: &'static str,
    ) -> Result<(), AppError> {
        if owner == Some(actor.id) || actor.role.is_editorial() {
            return Ok(());
        }
        Err(AppError::Forbidden {
            role: actor.role,
            action,
        })
    }
}
