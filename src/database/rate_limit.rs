use chrono::{DateTime, NaiveTime, Utc};

use crate::error::DomainError;

/// Start of the current rate-limit window: midnight UTC of `now`'s day.
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// A daily ceiling on writes per key.
#[derive(Debug, Clone, Copy)]
pub struct DailyLimit {
    pub ceiling: i64,
    pub unit: &'static str,
}

impl DailyLimit {
    pub fn new(ceiling: i64, unit: &'static str) -> Self {
        Self { ceiling, unit }
    }

    /// Fails once `prior` writes in the window have reached the ceiling.
    pub fn check(&self, prior: i64) -> Result<(), DomainError> {
        if prior >= self.ceiling {
            return Err(DomainError::rate_limited(format!(
                "rate limit exceeded: {} {} per day",
                self.ceiling, self.unit
            )));
        }
        Ok(())
    }
}
