use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::VisitorStat;
use crate::database::store::{Page, StatsStore};
use crate::database::StoreError;

const STAT_COLUMNS: &str = "id, date, page_path, country, referrer_domain, pageviews, unique_visitors, \
     latency_p50, latency_p95, latency_p99, errors_4xx, errors_5xx, created_at, updated_at";

pub struct PostgresStatsStore {
    pool: PgPool,
}

impl PostgresStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for PostgresStatsStore {
    async fn insert(&self, stat: &VisitorStat) -> Result<(), StoreError> {
        let query = format!(
            "INSERT INTO visitor_stats ({})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            STAT_COLUMNS
        );
        sqlx::query(&query)
            .bind(stat.id)
            .bind(stat.date)
            .bind(&stat.page_path)
            .bind(&stat.country)
            .bind(&stat.referrer_domain)
            .bind(stat.pageviews)
            .bind(stat.unique_visitors)
            .bind(stat.latency_p50)
            .bind(stat.latency_p95)
            .bind(stat.latency_p99)
            .bind(stat.errors_4xx)
            .bind(stat.errors_5xx)
            .bind(stat.created_at)
            .bind(stat.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VisitorStat>, StoreError> {
        let query = format!("SELECT {} FROM visitor_stats WHERE id = $1", STAT_COLUMNS);
        let stat = sqlx::query_as::<_, VisitorStat>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stat)
    }

    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: Page,
    ) -> Result<Vec<VisitorStat>, StoreError> {
        let query = format!(
            "SELECT {} FROM visitor_stats
             WHERE date >= $1 AND date <= $2
             ORDER BY date DESC, page_path ASC
             LIMIT $3 OFFSET $4",
            STAT_COLUMNS
        );
        let stats = sqlx::query_as::<_, VisitorStat>(&query)
            .bind(start)
            .bind(end)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(stats)
    }

    async fn list_by_page(&self, page_path: &str, page: Page) -> Result<Vec<VisitorStat>, StoreError> {
        let query = format!(
            "SELECT {} FROM visitor_stats
             WHERE page_path = $1
             ORDER BY date DESC
             LIMIT $2 OFFSET $3",
            STAT_COLUMNS
        );
        let stats = sqlx::query_as::<_, VisitorStat>(&query)
            .bind(page_path)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(stats)
    }

    async fn update(&self, stat: &VisitorStat) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE visitor_stats
             SET pageviews = $1, unique_visitors = $2, latency_p50 = $3, latency_p95 = $4,
                 latency_p99 = $5, errors_4xx = $6, errors_5xx = $7, updated_at = $8
             WHERE id = $9",
        )
        .bind(stat.pageviews)
        .bind(stat.unique_visitors)
        .bind(stat.latency_p50)
        .bind(stat.latency_p95)
        .bind(stat.latency_p99)
        .bind(stat.errors_4xx)
        .bind(stat.errors_5xx)
        .bind(stat.updated_at)
        .bind(stat.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_before(&self, date: NaiveDate) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM visitor_stats WHERE date < $1")
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
