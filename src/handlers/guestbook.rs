use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{parse_id, JsonBody, PageQuery};
use crate::database::models::GuestbookEntry;
use crate::middleware::{AdminIdentity, ApiResponse, ApiResult, AuthenticatedIdentity};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GuestbookRequest {
    pub display_name: String,
    pub message: String,
    /// Anti-spam field; real clients leave it empty
    pub honeypot: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub approve: bool,
}

/// Response for a submission, or for a honeypot hit (only `id` set)
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SubmitResponse {
    Entry(GuestbookEntry),
    Decoy { id: Uuid },
}

/// GET /api/guestbook - approved entries, newest first
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<GuestbookEntry>> {
    let entries = state.guestbook.list_approved(query.page()).await?;
    Ok(ApiResponse::success(entries))
}

/// POST /api/guestbook - sign the guestbook (authenticated)
///
/// The entry is attributed to the caller's identity and waits for approval.
pub async fn submit_entry(
    State(state): State<AppState>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    JsonBody(request): JsonBody<GuestbookRequest>,
) -> ApiResult<SubmitResponse> {
    if !request.honeypot.is_empty() {
        tracing::info!(user_id = %identity.id, "guestbook honeypot triggered");
        return Ok(ApiResponse::created(SubmitResponse::Decoy { id: Uuid::new_v4() }));
    }

    let entry = state
        .guestbook
        .submit(identity.login_provider(), &identity.id, &request.display_name, &request.message)
        .await?;
    Ok(ApiResponse::created(SubmitResponse::Entry(entry)))
}

/// GET /api/guestbook/pending - entries awaiting moderation, oldest first (admin)
pub async fn list_pending(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<GuestbookEntry>> {
    let entries = state.guestbook.list_pending(query.page()).await?;
    Ok(ApiResponse::success(entries))
}

/// POST /api/guestbook/:id/approve - approve, or reject with `{"approve": false}` (admin)
pub async fn approve_entry(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ApproveRequest>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    if request.approve {
        state.guestbook.approve(id).await?;
    } else {
        state.guestbook.delete(id).await?;
    }
    tracing::info!(admin = %admin.id, entry_id = %id, approved = request.approve, "guestbook entry moderated");
    Ok(ApiResponse::no_content())
}

/// DELETE /api/guestbook/:id - soft delete (admin)
pub async fn delete_entry(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.guestbook.delete(id).await?;
    Ok(ApiResponse::no_content())
}
