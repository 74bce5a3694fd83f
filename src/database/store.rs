//! Storage capabilities, one trait per resource.
//!
//! Stores persist and query rows; they do not validate or apply lifecycle
//! rules. Those live in the repositories. Each trait has a Postgres adapter
//! (`database::postgres`) and an in-memory adapter (`database::memory`).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::models::{ContactStatus, ContactSubmission, GuestbookEntry, Post, VisitorStat};
use super::StoreError;

/// A window into an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Slice an already-ordered in-memory listing
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset.max(0) as usize)
            .take(self.limit.max(0) as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: Self::DEFAULT_LIMIT, offset: 0 }
    }
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError>;
    /// Published posts, newest publication first
    async fn list_published(&self, tag: Option<&str>, page: Page) -> Result<Vec<Post>, StoreError>;
    /// Returns false when no row has the post's id
    async fn update(&self, post: &Post) -> Result<bool, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait GuestbookStore: Send + Sync {
    async fn insert(&self, entry: &GuestbookEntry) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<GuestbookEntry>, StoreError>;
    /// Approved, live entries, newest first
    async fn list_approved(&self, page: Page) -> Result<Vec<GuestbookEntry>, StoreError>;
    /// Unapproved, live entries, oldest first
    async fn list_pending(&self, page: Page) -> Result<Vec<GuestbookEntry>, StoreError>;
    async fn approve(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError>;
    /// Live entries by one author created at or after `since`
    async fn count_since(
        &self,
        user_provider: &str,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, submission: &ContactSubmission) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactSubmission>, StoreError>;
    /// Unexpired submissions, newest first, optionally narrowed to one status
    async fn list_active(
        &self,
        status: Option<ContactStatus>,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<ContactSubmission>, StoreError>;
    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<bool, StoreError>;
    /// Unexpired submissions from one address created at or after `since`
    async fn count_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn insert(&self, stat: &VisitorStat) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<VisitorStat>, StoreError>;
    /// Inclusive date range, newest day first then by path
    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: Page,
    ) -> Result<Vec<VisitorStat>, StoreError>;
    async fn list_by_page(&self, page_path: &str, page: Page) -> Result<Vec<VisitorStat>, StoreError>;
    async fn update(&self, stat: &VisitorStat) -> Result<bool, StoreError>;
    async fn delete_before(&self, date: NaiveDate) -> Result<u64, StoreError>;
}
