use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{parse_id, JsonBody, PageQuery};
use crate::database::models::{ContactStatus, ContactSubmission};
use crate::middleware::{AdminIdentity, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub email: String,
    pub name: String,
    pub message: String,
    /// Anti-spam field; real clients leave it empty
    pub honeypot: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub status: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SubmitResponse {
    Submission(ContactSubmission),
    Decoy { id: Uuid },
}

/// POST /api/contact - public contact form
pub async fn submit_contact(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ContactRequest>,
) -> ApiResult<SubmitResponse> {
    if !request.honeypot.is_empty() {
        tracing::info!("contact honeypot triggered");
        return Ok(ApiResponse::created(SubmitResponse::Decoy { id: Uuid::new_v4() }));
    }

    let submission = state
        .contact
        .submit(&request.email, &request.name, &request.message)
        .await?;
    Ok(ApiResponse::created(SubmitResponse::Submission(submission)))
}

/// GET /api/contact - unexpired submissions, optionally by `?status=` (admin)
pub async fn list_submissions(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Query(query): Query<ContactListQuery>,
) -> ApiResult<Vec<ContactSubmission>> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<ContactStatus>()?),
    };
    let submissions = state.contact.list(status, query.page.page()).await?;
    Ok(ApiResponse::success(submissions))
}

/// PATCH /api/contact/:id - move a submission to another status (admin)
pub async fn update_status(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<StatusRequest>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let status: ContactStatus = request.status.parse()?;
    state.contact.update_status(id, status).await?;
    Ok(ApiResponse::no_content())
}
