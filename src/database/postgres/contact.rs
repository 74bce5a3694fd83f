use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{ContactStatus, ContactSubmission};
use crate::database::store::{ContactStore, Page};
use crate::database::StoreError;

const SUBMISSION_COLUMNS: &str = "id, email, name, message, status, created_at, expires_at";

pub struct PostgresContactStore {
    pool: PgPool,
}

impl PostgresContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PostgresContactStore {
    async fn insert(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO contact_submissions (id, email, name, message, status, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(submission.id)
        .bind(&submission.email)
        .bind(&submission.name)
        .bind(&submission.message)
        .bind(submission.status.as_str())
        .bind(submission.created_at)
        .bind(submission.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactSubmission>, StoreError> {
        let query = format!("SELECT {} FROM contact_submissions WHERE id = $1", SUBMISSION_COLUMNS);
        let submission = sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(submission)
    }

    async fn list_active(
        &self,
        status: Option<ContactStatus>,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<ContactSubmission>, StoreError> {
        let query = format!(
            "SELECT {} FROM contact_submissions
             WHERE expires_at > $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
            SUBMISSION_COLUMNS
        );
        let submissions = sqlx::query_as::<_, ContactSubmission>(&query)
            .bind(now)
            .bind(status.map(|s| s.as_str()))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(submissions)
    }

    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE contact_submissions SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contact_submissions
             WHERE email = $1 AND created_at >= $2 AND expires_at > $3",
        )
        .bind(email)
        .bind(since)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
