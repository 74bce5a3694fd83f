//! In-memory adapters for the storage traits.
//!
//! They honour the same uniqueness and ordering contracts as the Postgres
//! adapters so the service can run (and be tested) without a database.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{ContactStatus, ContactSubmission, GuestbookEntry, Post, PostStatus, VisitorStat};
use super::store::{ContactStore, GuestbookStore, Page, PostStore, StatsStore};
use super::StoreError;

#[derive(Default)]
pub struct InMemoryPostStore {
    rows: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slug_taken(rows: &HashMap<Uuid, Post>, post: &Post) -> bool {
    rows.values().any(|other| other.slug == post.slug && other.id != post.id)
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&post.id) {
            return Err(StoreError::UniqueViolation("posts_pkey".to_string()));
        }
        if slug_taken(&rows, post) {
            return Err(StoreError::UniqueViolation("posts_slug_key".to_string()));
        }
        rows.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|p| p.slug == slug).cloned())
    }

    async fn list_published(&self, tag: Option<&str>, page: Page) -> Result<Vec<Post>, StoreError> {
        let rows = self.rows.read().await;
        let mut posts: Vec<Post> = rows
            .values()
            .filter(|p| p.status == PostStatus::Published)
            .filter(|p| tag.map_or(true, |t| p.tags.iter().any(|pt| pt == t)))
            .cloned()
            .collect();
        // NULLS LAST: Some(_) sorts above None under Reverse
        posts.sort_by_key(|p| Reverse(p.published_at));
        Ok(page.apply(posts))
    }

    async fn update(&self, post: &Post) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&post.id) {
            return Ok(false);
        }
        if slug_taken(&rows, post) {
            return Err(StoreError::UniqueViolation("posts_slug_key".to_string()));
        }
        rows.insert(post.id, post.clone());
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryGuestbookStore {
    rows: RwLock<HashMap<Uuid, GuestbookEntry>>,
}

impl InMemoryGuestbookStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn live(&self, approved: bool) -> Vec<GuestbookEntry> {
        let rows = self.rows.read().await;
        rows.values()
            .filter(|e| e.is_approved == approved && !e.is_deleted())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GuestbookStore for InMemoryGuestbookStore {
    async fn insert(&self, entry: &GuestbookEntry) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&entry.id) {
            return Err(StoreError::UniqueViolation("guestbook_entries_pkey".to_string()));
        }
        rows.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GuestbookEntry>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_approved(&self, page: Page) -> Result<Vec<GuestbookEntry>, StoreError> {
        let mut entries = self.live(true).await;
        entries.sort_by_key(|e| Reverse(e.created_at));
        Ok(page.apply(entries))
    }

    async fn list_pending(&self, page: Page) -> Result<Vec<GuestbookEntry>, StoreError> {
        let mut entries = self.live(false).await;
        entries.sort_by_key(|e| e.created_at);
        Ok(page.apply(entries))
    }

    async fn approve(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(entry) if !entry.is_deleted() => {
                entry.is_approved = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(entry) if !entry.is_deleted() => {
                entry.deleted_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_since(
        &self,
        user_provider: &str,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let rows = self.rows.read().await;
        let count = rows
            .values()
            .filter(|e| e.user_provider == user_provider && e.user_id == user_id)
            .filter(|e| e.created_at >= since && !e.is_deleted())
            .count();
        Ok(count as i64)
    }
}

#[derive(Default)]
pub struct InMemoryContactStore {
    rows: RwLock<HashMap<Uuid, ContactSubmission>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn insert(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&submission.id) {
            return Err(StoreError::UniqueViolation("contact_submissions_pkey".to_string()));
        }
        rows.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactSubmission>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_active(
        &self,
        status: Option<ContactStatus>,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<ContactSubmission>, StoreError> {
        let rows = self.rows.read().await;
        let mut submissions: Vec<ContactSubmission> = rows
            .values()
            .filter(|s| !s.is_expired(now))
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .cloned()
            .collect();
        submissions.sort_by_key(|s| Reverse(s.created_at));
        Ok(page.apply(submissions))
    }

    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(submission) => {
                submission.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let rows = self.rows.read().await;
        let count = rows
            .values()
            .filter(|s| s.email == email && s.created_at >= since && !s.is_expired(now))
            .count();
        Ok(count as i64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, s| !s.is_expired(now));
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryStatsStore {
    rows: RwLock<HashMap<Uuid, VisitorStat>>,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsStore for InMemoryStatsStore {
    async fn insert(&self, stat: &VisitorStat) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&stat.id) {
            return Err(StoreError::UniqueViolation("visitor_stats_pkey".to_string()));
        }
        if rows.values().any(|s| s.date == stat.date && s.page_path == stat.page_path) {
            return Err(StoreError::UniqueViolation(
                "visitor_stats_date_page_path_key".to_string(),
            ));
        }
        rows.insert(stat.id, stat.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VisitorStat>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: Page,
    ) -> Result<Vec<VisitorStat>, StoreError> {
        let rows = self.rows.read().await;
        let mut stats: Vec<VisitorStat> = rows
            .values()
            .filter(|s| s.date >= start && s.date <= end)
            .cloned()
            .collect();
        stats.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.page_path.cmp(&b.page_path)));
        Ok(page.apply(stats))
    }

    async fn list_by_page(&self, page_path: &str, page: Page) -> Result<Vec<VisitorStat>, StoreError> {
        let rows = self.rows.read().await;
        let mut stats: Vec<VisitorStat> = rows
            .values()
            .filter(|s| s.page_path == page_path)
            .cloned()
            .collect();
        stats.sort_by_key(|s| Reverse(s.date));
        Ok(page.apply(stats))
    }

    async fn update(&self, stat: &VisitorStat) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&stat.id) {
            Some(existing) => {
                *existing = stat.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_before(&self, date: NaiveDate) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, s| s.date >= date);
        Ok((before - rows.len()) as u64)
    }
}
