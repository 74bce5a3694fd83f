use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::conflict_or_internal;
use crate::database::models::{Post, PostDraft};
use crate::database::store::{Page, PostStore};
use crate::error::DomainError;

const NOT_FOUND: &str = "post not found";

#[derive(Clone)]
pub struct PostRepository {
    store: Arc<dyn PostStore>,
}

impl PostRepository {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: PostDraft) -> Result<Post, DomainError> {
        let now = Utc::now();
        let mut post = Post::from_draft(draft, now)?;
        post.stamp_publication(now);
        post.validate()?;

        self.store
            .insert(&post)
            .await
            .map_err(|e| conflict_or_internal(e, || slug_conflict(&post.slug)))?;

        tracing::info!(post_id = %post.id, slug = %post.slug, "post created");
        Ok(post)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Post, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        self.store
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))
    }

    pub async fn list_published(&self, tag: Option<&str>, page: Page) -> Result<Vec<Post>, DomainError> {
        Ok(self.store.list_published(tag, page).await?)
    }

    /// Replace the writable fields of an existing post
    pub async fn update(&self, id: Uuid, draft: PostDraft) -> Result<Post, DomainError> {
        if id.is_nil() {
            return Err(DomainError::validation("post ID is required"));
        }

        let mut post = self.get_by_id(id).await?;
        post.apply(draft)?;

        let now = Utc::now();
        post.updated_at = now;
        post.stamp_publication(now);
        post.validate()?;

        let updated = self
            .store
            .update(&post)
            .await
            .map_err(|e| conflict_or_internal(e, || slug_conflict(&post.slug)))?;
        if !updated {
            return Err(DomainError::not_found(NOT_FOUND));
        }

        Ok(post)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.store.delete(id).await? {
            return Err(DomainError::not_found(NOT_FOUND));
        }
        tracing::info!(post_id = %id, "post deleted");
        Ok(())
    }
}

fn slug_conflict(slug: &str) -> String {
    format!("post with slug '{}' already exists", slug)
}
