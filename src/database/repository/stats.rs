use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::conflict_or_internal;
use crate::database::models::{StatCounters, VisitorStat};
use crate::database::retention::horizon_before;
use crate::database::store::{Page, StatsStore};
use crate::error::DomainError;

const NOT_FOUND: &str = "visitor stat not found";
const DUPLICATE: &str = "stat for this date and page_path already exists";

/// A stat as reported by the metrics intake
#[derive(Debug, Clone, Default)]
pub struct NewVisitorStat {
    pub date: NaiveDate,
    pub page_path: String,
    pub country: Option<String>,
    pub referrer_domain: Option<String>,
    pub counters: StatCounters,
}

#[derive(Clone)]
pub struct StatsRepository {
    store: Arc<dyn StatsStore>,
    retention_days: i64,
}

impl StatsRepository {
    pub fn new(store: Arc<dyn StatsStore>, retention_days: i64) -> Self {
        Self { store, retention_days }
    }

    pub async fn record(&self, input: NewVisitorStat) -> Result<VisitorStat, DomainError> {
        let now = Utc::now();
        let mut stat = VisitorStat {
            id: Uuid::new_v4(),
            date: input.date,
            page_path: input.page_path,
            country: input.country,
            referrer_domain: input.referrer_domain,
            pageviews: 0,
            unique_visitors: 0,
            latency_p50: None,
            latency_p95: None,
            latency_p99: None,
            errors_4xx: 0,
            errors_5xx: 0,
            created_at: now,
            updated_at: now,
        };
        stat.apply(input.counters);
        stat.validate()?;

        self.store
            .insert(&stat)
            .await
            .map_err(|e| conflict_or_internal(e, || DUPLICATE.to_string()))?;
        Ok(stat)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VisitorStat, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))
    }

    pub async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: Page,
    ) -> Result<Vec<VisitorStat>, DomainError> {
        Ok(self.store.list_by_date_range(start, end, page).await?)
    }

    pub async fn list_by_page(&self, page_path: &str, page: Page) -> Result<Vec<VisitorStat>, DomainError> {
        Ok(self.store.list_by_page(page_path, page).await?)
    }

    /// Rewrite the counters of an existing stat
    pub async fn update(&self, id: Uuid, counters: StatCounters) -> Result<VisitorStat, DomainError> {
        if id.is_nil() {
            return Err(DomainError::validation("stat ID is required"));
        }

        let mut stat = self.get_by_id(id).await?;
        stat.apply(counters);
        stat.updated_at = Utc::now();
        stat.validate()?;

        if !self.store.update(&stat).await? {
            return Err(DomainError::not_found(NOT_FOUND));
        }
        Ok(stat)
    }

    /// Hard-delete stats dated before the retention horizon
    pub async fn prune(&self) -> Result<u64, DomainError> {
        let horizon = horizon_before(Utc::now().date_naive(), self.retention_days)?;
        let removed = self.store.delete_before(horizon).await?;
        tracing::info!(removed, %horizon, "pruned visitor stats");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryStatsStore;

    fn repo() -> StatsRepository {
        StatsRepository::new(Arc::new(InMemoryStatsStore::new()), 395)
    }

    fn input(date: NaiveDate, path: &str) -> NewVisitorStat {
        NewVisitorStat {
            date,
            page_path: path.to_string(),
            country: Some("DE".to_string()),
            referrer_domain: None,
            counters: StatCounters { pageviews: 12, unique_visitors: 7, ..Default::default() },
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn record_and_fetch() {
        let repo = repo();
        let stat = repo.record(input(day(1), "/")).await.unwrap();
        assert_eq!(repo.get_by_id(stat.id).await.unwrap(), stat);
    }

    #[tokio::test]
    async fn duplicate_day_and_path_conflicts() {
        let repo = repo();
        repo.record(input(day(1), "/")).await.unwrap();
        let err = repo.record(input(day(1), "/")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(err.to_string(), "stat for this date and page_path already exists");
    }

    #[tokio::test]
    async fn missing_date_is_rejected() {
        let err = repo().record(input(NaiveDate::default(), "/")).await.unwrap_err();
        assert_eq!(err.to_string(), "date is required");
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let repo = repo();
        let stat = repo.record(input(day(2), "/about")).await.unwrap();
        let updated = repo
            .update(stat.id, StatCounters { pageviews: 50, errors_4xx: 2, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.pageviews, 50);
        assert_eq!(updated.created_at, stat.created_at);
        assert_eq!(updated.page_path, "/about");

        let err = repo
            .update(stat.id, StatCounters { unique_visitors: -1, ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unique_visitors cannot be negative");

        let err = repo.update(Uuid::nil(), StatCounters::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "stat ID is required");
    }

    #[tokio::test]
    async fn listings() {
        let repo = repo();
        repo.record(input(day(1), "/b")).await.unwrap();
        repo.record(input(day(1), "/a")).await.unwrap();
        repo.record(input(day(3), "/a")).await.unwrap();
        repo.record(input(day(9), "/a")).await.unwrap();

        let ranged = repo.list_by_date_range(day(1), day(3), Page::default()).await.unwrap();
        let keys: Vec<(NaiveDate, &str)> = ranged.iter().map(|s| (s.date, s.page_path.as_str())).collect();
        assert_eq!(keys, vec![(day(3), "/a"), (day(1), "/a"), (day(1), "/b")]);

        let by_page = repo.list_by_page("/a", Page::new(2, 0)).await.unwrap();
        assert_eq!(by_page.iter().map(|s| s.date).collect::<Vec<_>>(), vec![day(9), day(3)]);
    }

    #[tokio::test]
    async fn prune_drops_rows_past_retention() {
        let repo = repo();
        let today = Utc::now().date_naive();
        let old = today - chrono::Duration::days(400);
        repo.record(input(old, "/")).await.unwrap();
        let kept = repo.record(input(today, "/")).await.unwrap();

        assert_eq!(repo.prune().await.unwrap(), 1);
        assert_eq!(repo.get_by_id(kept.id).await.unwrap().date, today);
    }

    #[tokio::test]
    async fn prune_with_unusable_retention_is_an_error() {
        let repo = StatsRepository::new(Arc::new(InMemoryStatsStore::new()), 200_000_000);
        let err = repo.prune().await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
