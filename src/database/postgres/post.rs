use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Post, PostStatus};
use crate::database::store::{Page, PostStore};
use crate::database::StoreError;

const POST_COLUMNS: &str =
    "id, slug, title, summary, body, tags, status, published_at, updated_at, created_at";

pub struct PostgresPostStore {
    pool: PgPool,
}

impl PostgresPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO posts (id, slug, title, summary, body, tags, status, published_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.body)
        .bind(&post.tags)
        .bind(post.status.as_str())
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let query = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        let post = sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let query = format!("SELECT {} FROM posts WHERE slug = $1", POST_COLUMNS);
        let post = sqlx::query_as::<_, Post>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn list_published(&self, tag: Option<&str>, page: Page) -> Result<Vec<Post>, StoreError> {
        let query = format!(
            "SELECT {} FROM posts
             WHERE status = $1 AND ($2::TEXT IS NULL OR $2 = ANY(tags))
             ORDER BY published_at DESC NULLS LAST
             LIMIT $3 OFFSET $4",
            POST_COLUMNS
        );
        let posts = sqlx::query_as::<_, Post>(&query)
            .bind(PostStatus::Published.as_str())
            .bind(tag)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn update(&self, post: &Post) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE posts
             SET slug = $1, title = $2, summary = $3, body = $4, tags = $5, status = $6,
                 published_at = $7, updated_at = $8
             WHERE id = $9",
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.body)
        .bind(&post.tags)
        .bind(post.status.as_str())
        .bind(post.published_at)
        .bind(post.updated_at)
        .bind(post.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
