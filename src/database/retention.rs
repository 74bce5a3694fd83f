use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

use crate::error::DomainError;

/// A retention period that cannot be applied to the calendar.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("retention of {0} days is out of range")]
pub struct RetentionOutOfRange(pub i64);

fn span(days: i64) -> Option<Duration> {
    if days < 1 {
        return None;
    }
    Duration::try_days(days)
}

/// `now` plus `days`, used to stamp expiry.
pub fn expiry_after(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, DomainError> {
    span(days)
        .and_then(|span| now.checked_add_signed(span))
        .ok_or_else(|| DomainError::internal(RetentionOutOfRange(days)))
}

/// `today` minus `days`: rows dated before this are past retention.
pub fn horizon_before(today: NaiveDate, days: i64) -> Result<NaiveDate, DomainError> {
    span(days)
        .and_then(|span| today.checked_sub_signed(span))
        .ok_or_else(|| DomainError::internal(RetentionOutOfRange(days)))
}
