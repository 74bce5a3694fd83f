use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: DateTime<Utc>,
}

/// GET /api/health - liveness check
pub async fn health() -> ApiResult<HealthResponse> {
    Ok(ApiResponse::success(HealthResponse {
        status: "healthy",
        time: Utc::now(),
    }))
}
