use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::models::{ContactStatus, ContactSubmission};
use crate::database::rate_limit::{start_of_utc_day, DailyLimit};
use crate::database::store::{ContactStore, Page};
use crate::error::DomainError;

const NOT_FOUND: &str = "contact submission not found";

#[derive(Clone)]
pub struct ContactRepository {
    store: Arc<dyn ContactStore>,
    limit: DailyLimit,
    retention_days: i64,
}

impl ContactRepository {
    pub fn new(store: Arc<dyn ContactStore>, daily_limit: i64, retention_days: i64) -> Self {
        Self {
            store,
            limit: DailyLimit::new(daily_limit, "submissions"),
            retention_days,
        }
    }

    pub async fn submit(&self, email: &str, name: &str, message: &str) -> Result<ContactSubmission, DomainError> {
        let now = Utc::now();
        let submission = ContactSubmission::received(email, name, message, now, self.retention_days)?;
        submission.validate(now)?;

        let prior = self
            .store
            .count_since(&submission.email, start_of_utc_day(now), now)
            .await?;
        if let Err(err) = self.limit.check(prior) {
            tracing::warn!(prior, "contact rate limit reached");
            return Err(err);
        }

        self.store.insert(&submission).await?;
        tracing::info!(submission_id = %submission.id, "contact submission received");
        Ok(submission)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ContactSubmission, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))
    }

    /// Unexpired submissions, optionally with one status
    pub async fn list(
        &self,
        status: Option<ContactStatus>,
        page: Page,
    ) -> Result<Vec<ContactSubmission>, DomainError> {
        Ok(self.store.list_active(status, Utc::now(), page).await?)
    }

    pub async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<(), DomainError> {
        if !self.store.update_status(id, status).await? {
            return Err(DomainError::not_found(NOT_FOUND));
        }
        Ok(())
    }

    /// Hard-delete every expired submission
    pub async fn prune_expired(&self) -> Result<u64, DomainError> {
        let removed = self.store.delete_expired(Utc::now()).await?;
        tracing::info!(removed, "pruned expired contact submissions");
        Ok(removed)
    }
}
