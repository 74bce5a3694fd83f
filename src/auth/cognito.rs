use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;
use url::Url;

use super::{strip_bearer, AuthError, Claims, Identity, IdentityVerifier};

/// Minimum spacing between JWKS fetches.
const REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Default)]
struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn refresh_due(&self, now: Instant) -> bool {
        self.fetched_at
            .map_or(true, |at| now.saturating_duration_since(at) >= REFRESH_COOLDOWN)
    }
}

/// Verifies Cognito user pool tokens (RS256) against the pool's published JWKS.
pub struct CognitoVerifier {
    issuer: String,
    jwks_url: Url,
    client_id: Option<String>,
    http: reqwest::Client,
    cache: RwLock<KeyCache>,
}

impl CognitoVerifier {
    pub fn new(region: &str, user_pool_id: &str, client_id: Option<String>) -> Result<Self, AuthError> {
        if region.is_empty() || user_pool_id.is_empty() {
            return Err(AuthError::KeySet("region and user pool id are required".to_string()));
        }

        let issuer = format!("https://cognito-idp.{}.amazonaws.com/{}", region, user_pool_id);
        let jwks_url = Url::parse(&format!("{}/.well-known/jwks.json", issuer))
            .map_err(|e| AuthError::KeySet(e.to_string()))?;

        Ok(Self {
            issuer,
            jwks_url,
            client_id,
            http: reqwest::Client::new(),
            cache: RwLock::new(KeyCache::default()),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    /// Look up the signing key. An unknown kid refetches the key set, at most
    /// once per cooldown.
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        // Fast path: try read lock
        {
            let cache = self.cache.read().await;
            if let Some(key) = cache.keys.get(kid) {
                return Ok(key.clone());
            }
        }

        let unknown = || AuthError::Rejected(format!("unknown signing key '{}'", kid));

        let mut cache = self.cache.write().await;
        if let Some(key) = cache.keys.get(kid) {
            return Ok(key.clone());
        }
        let now = Instant::now();
        if !cache.refresh_due(now) {
            tracing::debug!(kid = %kid, "unknown kid during jwks cooldown");
            return Err(unknown());
        }

        cache.fetched_at = Some(now);
        cache.keys = self.fetch_keys().await?;
        cache.keys.get(kid).cloned().ok_or_else(unknown)
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, AuthError> {
        let set: JwkSet = self
            .http
            .get(self.jwks_url.clone())
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AuthError::KeySet(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeySet(e.to_string()))?;

        let mut fresh = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else { continue };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    fresh.insert(kid, key);
                }
                Err(e) => tracing::warn!(kid = %kid, error = %e, "skipping unusable jwk"),
            }
        }

        tracing::info!(count = fresh.len(), "loaded cognito signing keys");
        Ok(fresh)
    }

    fn check_audience(&self, claims: &Claims) -> Result<(), AuthError> {
        match claims.token_use.as_deref() {
            Some("id") | Some("access") => {}
            other => return Err(AuthError::Rejected(format!("unexpected token_use {:?}", other))),
        }

        let Some(expected) = &self.client_id else { return Ok(()) };
        let presented = claims.aud.as_ref().or(claims.client_id.as_ref());
        if presented != Some(expected) {
            return Err(AuthError::Rejected("token was not issued for this client".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityVerifier for CognitoVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let token = strip_bearer(credential)?;

        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::Malformed("token header has no kid".to_string()))?;
        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;

        let data = decode::<Claims>(token, &key, &validation)?;
        self.check_audience(&data.claims)?;

        Ok(Identity::from(data.claims))
    }
}
