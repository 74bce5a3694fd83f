use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::models::GuestbookEntry;
use crate::database::rate_limit::{start_of_utc_day, DailyLimit};
use crate::database::store::{GuestbookStore, Page};
use crate::error::DomainError;

const NOT_FOUND: &str = "guestbook entry not found";

#[derive(Clone)]
pub struct GuestbookRepository {
    store: Arc<dyn GuestbookStore>,
    providers: Arc<BTreeSet<String>>,
    limit: DailyLimit,
}

impl GuestbookRepository {
    pub fn new(store: Arc<dyn GuestbookStore>, providers: BTreeSet<String>, daily_limit: i64) -> Self {
        Self {
            store,
            providers: Arc::new(providers),
            limit: DailyLimit::new(daily_limit, "entries"),
        }
    }

    /// Record a new, unapproved entry for the given author
    pub async fn submit(
        &self,
        user_provider: &str,
        user_id: &str,
        display_name: &str,
        message: &str,
    ) -> Result<GuestbookEntry, DomainError> {
        let now = Utc::now();
        let entry = GuestbookEntry::new(user_provider, user_id, display_name, message, now);
        entry.validate(&self.providers)?;

        let prior = self
            .store
            .count_since(&entry.user_provider, &entry.user_id, start_of_utc_day(now))
            .await?;
        if let Err(err) = self.limit.check(prior) {
            tracing::warn!(user_provider, user_id, prior, "guestbook rate limit reached");
            return Err(err);
        }

        self.store.insert(&entry).await?;
        tracing::info!(entry_id = %entry.id, "guestbook entry submitted");
        Ok(entry)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<GuestbookEntry, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))
    }

    pub async fn list_approved(&self, page: Page) -> Result<Vec<GuestbookEntry>, DomainError> {
        Ok(self.store.list_approved(page).await?)
    }

    pub async fn list_pending(&self, page: Page) -> Result<Vec<GuestbookEntry>, DomainError> {
        Ok(self.store.list_pending(page).await?)
    }

    pub async fn approve(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.store.approve(id).await? {
            return Err(DomainError::not_found(NOT_FOUND));
        }
        Ok(())
    }

    /// Soft delete; used for both moderation rejection and removal
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.store.soft_delete(id, Utc::now()).await? {
            return Err(DomainError::not_found(NOT_FOUND));
        }
        Ok(())
    }
}
