//! Repositories apply validation, rate limits and lifecycle rules on top of
//! the storage traits. Handlers talk only to these.

mod contact;
mod guestbook;
mod post;
mod stats;

pub use contact::ContactRepository;
pub use guestbook::GuestbookRepository;
pub use post::PostRepository;
pub use stats::{NewVisitorStat, StatsRepository};

use super::StoreError;
use crate::error::DomainError;

/// Turn a unique violation into a conflict with `message`; anything else is internal.
fn conflict_or_internal(err: StoreError, message: impl FnOnce() -> String) -> DomainError {
    match err {
        StoreError::UniqueViolation(_) => DomainError::conflict(message()),
        other => DomainError::internal(other),
    }
}
