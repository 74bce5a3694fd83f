use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::validation::{is_valid_slug, max_chars, required};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            _ => Err(DomainError::validation("invalid post status")),
        }
    }
}

impl TryFrom<String> for PostStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    #[sqlx(try_from = "String")]
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Writable fields of a post, as submitted by an admin.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    /// Status as submitted; parsed once the content fields have passed.
    pub status: String,
}

impl PostDraft {
    /// Check the content fields in order, then parse the status.
    pub fn parse_status(&self) -> Result<PostStatus, DomainError> {
        check_content(&self.slug, &self.title, &self.body)?;
        self.status.parse()
    }
}

fn check_content(slug: &str, title: &str, body: &str) -> Result<(), DomainError> {
    required(slug, "slug is required")?;
    if !is_valid_slug(slug) {
        return Err(DomainError::validation(
            "slug must be lowercase alphanumeric with hyphens only",
        ));
    }
    required(title, "title is required")?;
    max_chars(title, 255, "title must be 255 characters or less")?;
    required(body, "body is required")?;
    Ok(())
}

impl Post {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_content(&self.slug, &self.title, &self.body)?;
        if self.status == PostStatus::Published && self.published_at.is_none() {
            return Err(DomainError::validation(
                "published posts must have a published_at timestamp",
            ));
        }
        Ok(())
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Stamp `published_at` when publishing; an existing timestamp is kept.
    pub fn stamp_publication(&mut self, now: DateTime<Utc>) {
        if self.status == PostStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }

    pub fn from_draft(draft: PostDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let status = draft.parse_status()?;
        Ok(Self {
            id: draft.id.unwrap_or_else(Uuid::new_v4),
            slug: draft.slug,
            title: draft.title,
            summary: draft.summary,
            body: draft.body,
            tags: draft.tags,
            status,
            published_at: None,
            updated_at: now,
            created_at: now,
        })
    }

    /// Overwrite the writable fields, leaving identity and timestamps alone.
    pub fn apply(&mut self, draft: PostDraft) -> Result<(), DomainError> {
        let status = draft.parse_status()?;
        self.slug = draft.slug;
        self.title = draft.title;
        self.summary = draft.summary;
        self.body = draft.body;
        self.tags = draft.tags;
        self.status = status;
        Ok(())
    }
}
