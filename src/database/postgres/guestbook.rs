use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::GuestbookEntry;
use crate::database::store::{GuestbookStore, Page};
use crate::database::StoreError;

const ENTRY_COLUMNS: &str =
    "id, user_provider, user_id, display_name, message, is_approved, deleted_at, created_at";

pub struct PostgresGuestbookStore {
    pool: PgPool,
}

impl PostgresGuestbookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, approved: bool, order: &str, page: Page) -> Result<Vec<GuestbookEntry>, StoreError> {
        let query = format!(
            "SELECT {} FROM guestbook_entries
             WHERE is_approved = $1 AND deleted_at IS NULL
             ORDER BY created_at {}
             LIMIT $2 OFFSET $3",
            ENTRY_COLUMNS, order
        );
        let entries = sqlx::query_as::<_, GuestbookEntry>(&query)
            .bind(approved)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}

#[async_trait]
impl GuestbookStore for PostgresGuestbookStore {
    async fn insert(&self, entry: &GuestbookEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO guestbook_entries (id, user_provider, user_id, display_name, message, is_approved, deleted_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(entry.id)
        .bind(&entry.user_provider)
        .bind(&entry.user_id)
        .bind(&entry.display_name)
        .bind(&entry.message)
        .bind(entry.is_approved)
        .bind(entry.deleted_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GuestbookEntry>, StoreError> {
        let query = format!("SELECT {} FROM guestbook_entries WHERE id = $1", ENTRY_COLUMNS);
        let entry = sqlx::query_as::<_, GuestbookEntry>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn list_approved(&self, page: Page) -> Result<Vec<GuestbookEntry>, StoreError> {
        self.list_where(true, "DESC", page).await
    }

    async fn list_pending(&self, page: Page) -> Result<Vec<GuestbookEntry>, StoreError> {
        self.list_where(false, "ASC", page).await
    }

    async fn approve(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE guestbook_entries SET is_approved = TRUE WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE guestbook_entries SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_since(
        &self,
        user_provider: &str,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM guestbook_entries
             WHERE user_provider = $1 AND user_id = $2 AND created_at >= $3 AND deleted_at IS NULL",
        )
        .bind(user_provider)
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
