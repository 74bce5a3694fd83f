use axum::extract::{Path, Query, State};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

use crate::api::{parse_id, JsonBody, PageQuery};
use crate::database::models::{StatCounters, VisitorStat};
use crate::database::repository::NewVisitorStat;
use crate::error::ApiError;
use crate::middleware::{AdminIdentity, ApiResponse, ApiResult};
use crate::state::AppState;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountersRequest {
    pub pageviews: i32,
    pub unique_visitors: i32,
    pub latency_p50: Option<f64>,
    pub latency_p95: Option<f64>,
    pub latency_p99: Option<f64>,
    pub errors_4xx: i32,
    pub errors_5xx: i32,
}

impl From<CountersRequest> for StatCounters {
    fn from(req: CountersRequest) -> Self {
        Self {
            pageviews: req.pageviews,
            unique_visitors: req.unique_visitors,
            latency_p50: req.latency_p50,
            latency_p95: req.latency_p95,
            latency_p99: req.latency_p99,
            errors_4xx: req.errors_4xx,
            errors_5xx: req.errors_5xx,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordStatRequest {
    #[serde(deserialize_with = "stat_date")]
    pub date: Option<NaiveDate>,
    pub page_path: String,
    pub country: Option<String>,
    pub referrer_domain: Option<String>,
    #[serde(flatten)]
    pub counters: CountersRequest,
}

#[derive(Debug, Deserialize)]
pub struct StatsRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (the date part is kept).
fn stat_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(serde::de::Error::custom)
}

fn parse_query_date(raw: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ApiError::bad_request(format!("invalid {} format (use YYYY-MM-DD)", field)))
}

/// POST /api/stats - record a day's stats for one page (admin)
pub async fn record_stat(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    JsonBody(request): JsonBody<RecordStatRequest>,
) -> ApiResult<VisitorStat> {
    let input = NewVisitorStat {
        date: request.date.unwrap_or_default(),
        page_path: request.page_path,
        country: request.country,
        referrer_domain: request.referrer_domain,
        counters: request.counters.into(),
    };
    let stat = state.stats.record(input).await?;
    Ok(ApiResponse::created(stat))
}

/// GET /api/stats/:id (admin)
pub async fn get_stat(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<String>,
) -> ApiResult<VisitorStat> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.stats.get_by_id(id).await?))
}

/// GET /api/stats?start_date=&end_date= - inclusive date range (admin)
pub async fn list_stats(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Query(query): Query<StatsRangeQuery>,
) -> ApiResult<Vec<VisitorStat>> {
    let (Some(start), Some(end)) = (
        query.start_date.as_deref().filter(|s| !s.is_empty()),
        query.end_date.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::bad_request("start_date and end_date are required"));
    };

    let start = parse_query_date(start, "start_date")?;
    let end = parse_query_date(end, "end_date")?;

    let stats = state.stats.list_by_date_range(start, end, query.page.page()).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/stats/page/:page_path - history of one page, newest day first (admin)
///
/// The page path is a single percent-encoded segment, e.g. `%2Fblog%2Fhello`.
pub async fn list_stats_by_page(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(page_path): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<VisitorStat>> {
    let stats = state.stats.list_by_page(&page_path, query.page()).await?;
    Ok(ApiResponse::success(stats))
}

/// PUT /api/stats/:id - rewrite the counters of a stat (admin)
pub async fn update_stat(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<CountersRequest>,
) -> ApiResult<VisitorStat> {
    let id = parse_id(&id)?;
    let stat = state.stats.update(id, request.into()).await?;
    Ok(ApiResponse::success(stat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stat_dates_accept_both_forms() {
        let plain: RecordStatRequest =
            serde_json::from_value(json!({ "date": "2024-05-01", "page_path": "/" })).unwrap();
        assert_eq!(plain.date, NaiveDate::from_ymd_opt(2024, 5, 1));

        let stamped: RecordStatRequest =
            serde_json::from_value(json!({ "date": "2024-05-01T00:00:00Z", "page_path": "/" })).unwrap();
        assert_eq!(stamped.date, NaiveDate::from_ymd_opt(2024, 5, 1));

        let missing: RecordStatRequest = serde_json::from_value(json!({ "page_path": "/" })).unwrap();
        assert_eq!(missing.date, None);

        assert!(serde_json::from_value::<RecordStatRequest>(json!({ "date": "yesterday" })).is_err());
    }

    #[test]
    fn counters_are_flattened() {
        let req: RecordStatRequest = serde_json::from_value(json!({
            "date": "2024-05-01",
            "page_path": "/",
            "pageviews": 3,
            "latency_p95": 120.5,
        }))
        .unwrap();
        assert_eq!(req.counters.pageviews, 3);
        assert_eq!(req.counters.latency_p95, Some(120.5));
    }

    #[test]
    fn query_dates() {
        assert!(parse_query_date("2024-02-30", "start_date").is_err());
        assert_eq!(
            parse_query_date("01/02/2024", "end_date").unwrap_err().message(),
            "invalid end_date format (use YYYY-MM-DD)"
        );
    }
}
