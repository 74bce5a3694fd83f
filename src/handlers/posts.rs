use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::api::{parse_id, JsonBody, PageQuery};
use crate::database::models::{Post, PostDraft};
use crate::error::ApiError;
use crate::middleware::{AdminIdentity, ApiResponse, ApiResult, MaybeIdentity};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub tag: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Body of POST /api/posts and PUT /api/posts/:id
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostRequest {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    pub status: String,
}

impl From<PostRequest> for PostDraft {
    fn from(request: PostRequest) -> Self {
        PostDraft {
            id: None,
            slug: request.slug,
            title: request.title,
            summary: request.summary,
            body: request.body,
            tags: request.tags,
            status: request.status,
        }
    }
}

/// GET /api/posts - published posts, newest first, optionally by `?tag=`
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> ApiResult<Vec<Post>> {
    let tag = query.tag.as_deref().filter(|t| !t.is_empty());
    let posts = state.posts.list_published(tag, query.page.page()).await?;
    Ok(ApiResponse::success(posts))
}

/// GET /api/posts/:slug - a single post; unpublished posts are visible to admins only
pub async fn get_post(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(slug): Path<String>,
) -> ApiResult<Post> {
    let post = state.posts.get_by_slug(&slug).await?;

    let is_admin = identity.as_ref().is_some_and(|i| i.is_admin());
    if !post.is_published() && !is_admin {
        return Err(ApiError::not_found("post not found"));
    }

    Ok(ApiResponse::success(post))
}

/// POST /api/posts - create a post (admin)
pub async fn create_post(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    JsonBody(request): JsonBody<PostRequest>,
) -> ApiResult<Post> {
    let post = state.posts.create(request.into()).await?;
    tracing::debug!(admin = %admin.id, post_id = %post.id, "post created by admin");
    Ok(ApiResponse::created(post))
}

/// PUT /api/posts/:id - replace a post's content (admin)
pub async fn update_post(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<PostRequest>,
) -> ApiResult<Post> {
    let id = parse_id(&id)?;
    let post = state.posts.update(id, request.into()).await?;
    Ok(ApiResponse::success(post))
}

/// DELETE /api/posts/:id - delete a post (admin)
pub async fn delete_post(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    state.posts.delete(id).await?;
    Ok(ApiResponse::no_content())
}
