use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::validation::{max_chars, no_markup, required};
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct GuestbookEntry {
    pub id: Uuid,
    pub user_provider: String,
    pub user_id: String,
    pub display_name: String,
    pub message: String,
    pub is_approved: bool,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl GuestbookEntry {
    /// A new, unapproved entry
    pub fn new(
        user_provider: impl Into<String>,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_provider: user_provider.into(),
            user_id: user_id.into(),
            display_name: display_name.into(),
            message: message.into(),
            is_approved: false,
            deleted_at: None,
            created_at: now,
        }
    }

    pub fn validate(&self, providers: &BTreeSet<String>) -> Result<(), DomainError> {
        required(&self.user_provider, "user_provider is required")?;
        if !providers.contains(&self.user_provider) {
            return Err(DomainError::validation(format!(
                "invalid user_provider, must be {}",
                describe_providers(providers)
            )));
        }
        required(&self.user_id, "user_id is required")?;
        required(&self.display_name, "display_name is required")?;
        max_chars(&self.display_name, 255, "display_name must be 255 characters or less")?;
        required(&self.message, "message is required")?;
        max_chars(&self.message, 500, "message must be 500 characters or less")?;
        no_markup(&self.message, "message contains invalid characters")?;
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Render the provider set as `'a' or 'b'`, `'a', 'b' or 'c'`, ...
fn describe_providers(providers: &BTreeSet<String>) -> String {
    let quoted: Vec<String> = providers.iter().map(|p| format!("'{}'", p)).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn providers() -> BTreeSet<String> {
        ["google", "linkedin"].into_iter().map(String::from).collect()
    }

    fn entry() -> GuestbookEntry {
        GuestbookEntry::new("google", "user-1", "Visitor", "Lovely site!", Utc::now())
    }

    fn message(entry: &GuestbookEntry) -> String {
        entry.validate(&providers()).unwrap_err().to_string()
    }

    #[test]
    fn new_entries_are_pending() {
        let e = entry();
        assert!(!e.is_approved);
        assert!(!e.is_deleted());
        assert!(e.validate(&providers()).is_ok());
    }

    #[test]
    fn provider_rules() {
        let mut e = entry();
        e.user_provider = String::new();
        assert_eq!(message(&e), "user_provider is required");

        e.user_provider = "github".to_string();
        assert_eq!(message(&e), "invalid user_provider, must be 'google' or 'linkedin'");
    }

    #[test]
    fn provider_list_rendering() {
        let one: BTreeSet<String> = ["google".to_string()].into();
        assert_eq!(describe_providers(&one), "'google'");

        let three: BTreeSet<String> =
            ["github", "google", "linkedin"].into_iter().map(String::from).collect();
        assert_eq!(describe_providers(&three), "'github', 'google' or 'linkedin'");
    }

    #[test]
    fn rejects_markup() {
        let mut e = entry();
        e.message = "hi <script>alert(1)</script>".to_string();
        assert_eq!(message(&e), "message contains invalid characters");

        e.message = "1 > 0".to_string();
        assert_eq!(message(&e), "message contains invalid characters");
    }

    #[test]
    fn message_length() {
        let mut e = entry();
        e.message = "a".repeat(500);
        assert!(e.validate(&providers()).is_ok());

        e.message = "a".repeat(501);
        assert_eq!(message(&e), "message must be 500 characters or less");
    }

    #[test]
    fn display_name_rules() {
        let mut e = entry();
        e.display_name = " ".to_string();
        assert_eq!(message(&e), "display_name is required");

        e.display_name = "n".repeat(256);
        assert_eq!(message(&e), "display_name must be 255 characters or less");
    }
}
