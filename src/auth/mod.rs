//! Identity verification.
//!
//! A verifier exchanges a bearer credential for an [`Identity`]. The HTTP
//! gate in `middleware::auth` only depends on the [`IdentityVerifier`]
//! contract; which implementation runs is decided by `AUTH_MODE`.

pub mod cognito;
pub mod dev;
pub mod secret;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::config::{AuthConfig, AuthMode};

pub use cognito::CognitoVerifier;
pub use dev::DevVerifier;
pub use secret::SharedSecretVerifier;

/// Group membership that grants the admin role.
pub const ADMIN_GROUP: &str = "admin";

/// Provider recorded for users who signed up directly with the user pool.
pub const NATIVE_PROVIDER: &str = "cognito";

/// The authenticated caller for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
    pub groups: BTreeSet<String>,
    /// Federated login provider (lower-cased), when the token reports one.
    pub provider: Option<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.groups.contains(ADMIN_GROUP)
    }

    /// The federated provider, or [`NATIVE_PROVIDER`] when the token lists none.
    pub fn login_provider(&self) -> &str {
        self.provider.as_deref().unwrap_or(NATIVE_PROVIDER)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("signing keys unavailable: {0}")]
    KeySet(String),

    #[error("token generation failed: {0}")]
    Issue(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::Rejected(err.to_string())
    }
}

/// Exchanges a bearer credential for an identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}

/// Strip an optional `"Bearer "` prefix (case-sensitive) and reject empty credentials.
pub fn strip_bearer(credential: &str) -> Result<&str, AuthError> {
    let token = credential.strip_prefix("Bearer ").unwrap_or(credential).trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

/// Token claims shared by the Cognito and shared-secret verifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub email_verified: bool,
    #[serde(rename = "cognito:groups", default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<FederatedIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedIdentity {
    #[serde(rename = "providerName")]
    pub provider_name: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.unwrap_or_default(),
            email_verified: claims.email_verified,
            groups: claims.groups.into_iter().collect(),
            provider: claims
                .identities
                .first()
                .map(|identity| identity.provider_name.to_lowercase()),
        }
    }
}

// Cognito sends email_verified as a bool in ID tokens but some federated
// providers surface it as the string "true".
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    Ok(match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => b,
        BoolOrString::String(s) => s.eq_ignore_ascii_case("true"),
    })
}

/// Build the verifier selected by the auth configuration.
pub fn verifier_from_config(config: &AuthConfig) -> Result<Arc<dyn IdentityVerifier>, AuthError> {
    let verifier: Arc<dyn IdentityVerifier> = match config.mode {
        AuthMode::Cognito => {
            let region = config.aws_region.as_deref().unwrap_or_default();
            let pool = config.cognito_user_pool_id.as_deref().unwrap_or_default();
            Arc::new(CognitoVerifier::new(region, pool, config.cognito_client_id.clone())?)
        }
        AuthMode::Secret => {
            let secret = config.jwt_secret.as_deref().unwrap_or_default();
            Arc::new(SharedSecretVerifier::new(secret, config.jwt_expiry_hours)?)
        }
        AuthMode::Dev => {
            tracing::warn!(role = %config.dev_user_role, "dev auth mode: every bearer token is accepted");
            Arc::new(DevVerifier::new(config.dev_user_role.clone()))
        }
    };
    Ok(verifier)
}
