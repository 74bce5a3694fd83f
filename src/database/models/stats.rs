use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::validation::{max_chars, non_negative, required};
use crate::error::DomainError;

/// Aggregated visitor statistics for one page on one day
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct VisitorStat {
    pub id: Uuid,
    pub date: NaiveDate,
    pub page_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_domain: Option<String>,
    pub pageviews: i32,
    pub unique_visitors: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_p50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_p95: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_p99: Option<f64>,
    pub errors_4xx: i32,
    pub errors_5xx: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counters that may be rewritten after a stat is recorded
#[derive(Debug, Clone, Default)]
pub struct StatCounters {
    pub pageviews: i32,
    pub unique_visitors: i32,
    pub latency_p50: Option<f64>,
    pub latency_p95: Option<f64>,
    pub latency_p99: Option<f64>,
    pub errors_4xx: i32,
    pub errors_5xx: i32,
}

impl VisitorStat {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.date == NaiveDate::default() {
            return Err(DomainError::validation("date is required"));
        }
        required(&self.page_path, "page_path is required")?;
        max_chars(&self.page_path, 1024, "page_path must be 1024 characters or less")?;
        if let Some(country) = &self.country {
            max_chars(country, 2, "country must be 2 characters or less (ISO 3166-1 alpha-2)")?;
        }
        if let Some(referrer) = &self.referrer_domain {
            max_chars(referrer, 255, "referrer_domain must be 255 characters or less")?;
        }
        non_negative(self.pageviews, "pageviews cannot be negative")?;
        non_negative(self.unique_visitors, "unique_visitors cannot be negative")?;
        non_negative(self.errors_4xx, "errors_4xx cannot be negative")?;
        non_negative(self.errors_5xx, "errors_5xx cannot be negative")?;
        Ok(())
    }

    pub fn apply(&mut self, counters: StatCounters) {
        self.pageviews = counters.pageviews;
        self.unique_visitors = counters.unique_visitors;
        self.latency_p50 = counters.latency_p50;
        self.latency_p95 = counters.latency_p95;
        self.latency_p99 = counters.latency_p99;
        self.errors_4xx = counters.errors_4xx;
        self.errors_5xx = counters.errors_5xx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat() -> VisitorStat {
        let now = Utc::now();
        VisitorStat {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            page_path: "/blog/hello-world".to_string(),
            country: Some("US".to_string()),
            referrer_domain: None,
            pageviews: 10,
            unique_visitors: 4,
            latency_p50: Some(12.5),
            latency_p95: None,
            latency_p99: None,
            errors_4xx: 0,
            errors_5xx: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn message(s: &VisitorStat) -> String {
        s.validate().unwrap_err().to_string()
    }

    #[test]
    fn valid_stat() {
        assert!(stat().validate().is_ok());
    }

    #[test]
    fn date_and_path() {
        let mut s = stat();
        s.date = NaiveDate::default();
        assert_eq!(message(&s), "date is required");

        let mut s = stat();
        s.page_path = "".to_string();
        assert_eq!(message(&s), "page_path is required");

        s.page_path = format!("/{}", "p".repeat(1024));
        assert_eq!(message(&s), "page_path must be 1024 characters or less");
    }

    #[test]
    fn country_code_length() {
        let mut s = stat();
        s.country = Some("USA".to_string());
        assert_eq!(message(&s), "country must be 2 characters or less (ISO 3166-1 alpha-2)");
    }

    #[test]
    fn counters_cannot_be_negative() {
        let mut s = stat();
        s.pageviews = -1;
        assert_eq!(message(&s), "pageviews cannot be negative");

        let mut s = stat();
        s.errors_5xx = -1;
        assert_eq!(message(&s), "errors_5xx cannot be negative");
    }

    #[test]
    fn apply_rewrites_counters_only() {
        let mut s = stat();
        let before = s.clone();
        s.apply(StatCounters { pageviews: 99, ..Default::default() });
        assert_eq!(s.pageviews, 99);
        assert_eq!(s.latency_p50, None);
        assert_eq!(s.page_path, before.page_path);
        assert_eq!(s.created_at, before.created_at);
    }
}
