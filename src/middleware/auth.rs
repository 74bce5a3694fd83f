//! Authorization gate.
//!
//! Each extractor inspects only the `Authorization` header, so it runs
//! before the request body is read. Handlers declare the access level they
//! need by taking one of these as a parameter:
//!
//! - [`AuthenticatedIdentity`]: any verified caller
//! - [`AdminIdentity`]: a verified caller in the `admin` group
//! - [`MaybeIdentity`]: public, but identity-aware when a valid token is sent

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

pub const MISSING_HEADER: &str = "missing authorization header";
pub const INVALID_TOKEN: &str = "invalid token";
pub const ADMIN_REQUIRED: &str = "admin role required";

#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity(pub Identity);

#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The header must be exactly two space-separated parts with the `Bearer` scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<Identity, ApiError> {
    let token = bearer_token(&parts.headers).ok_or_else(|| ApiError::unauthorized(MISSING_HEADER))?;

    state.verifier.verify(token).await.map_err(|e| {
        tracing::debug!(error = %e, "token verification failed");
        ApiError::unauthorized(INVALID_TOKEN)
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(AuthenticatedIdentity)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = authenticate(parts, state).await?;
        if !identity.is_admin() {
            tracing::info!(user_id = %identity.id, "admin route refused");
            return Err(ApiError::forbidden(ADMIN_REQUIRED));
        }
        Ok(AdminIdentity(identity))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(authenticate(parts, state).await.ok()))
    }
}
