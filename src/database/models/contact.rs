use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::retention::expiry_after;
use crate::database::validation::{is_valid_email, max_chars, no_markup, required};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Received,
    Read,
    Replied,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Received => "received",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
        }
    }
}

impl FromStr for ContactStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(ContactStatus::Received),
            "read" => Ok(ContactStatus::Read),
            "replied" => Ok(ContactStatus::Replied),
            _ => Err(DomainError::validation("invalid contact status")),
        }
    }
}

impl TryFrom<String> for ContactStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// A freshly received submission that expires `retention_days` from `now`.
    pub fn received(
        email: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
        retention_days: i64,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            message: message.into(),
            status: ContactStatus::Received,
            created_at: now,
            expires_at: expiry_after(now, retention_days)?,
        })
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        required(&self.email, "email is required")?;
        if !is_valid_email(&self.email) {
            return Err(DomainError::validation("invalid email address"));
        }
        max_chars(&self.email, 255, "email must be 255 characters or less")?;
        required(&self.name, "name is required")?;
        max_chars(&self.name, 255, "name must be 255 characters or less")?;
        required(&self.message, "message is required")?;
        max_chars(&self.message, 5000, "message must be 5000 characters or less")?;
        no_markup(&self.message, "message contains invalid characters")?;
        if self.expires_at == DateTime::<Utc>::default() {
            return Err(DomainError::validation("expires_at is required"));
        }
        if self.expires_at <= now {
            return Err(DomainError::validation("expires_at must be in the future"));
        }
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
