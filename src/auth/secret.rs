use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{strip_bearer, AuthError, Claims, FederatedIdentity, Identity, IdentityVerifier};

/// HS256 tokens signed with a shared secret. Also issues tokens for the CLI.
pub struct SharedSecretVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Issue("Invalid JWT secret".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    /// Sign an ID token for the given subject. `provider` mimics a federated
    /// sign-in (e.g. `Google`) so the holder can sign the guestbook.
    pub fn issue(
        &self,
        sub: &str,
        email: &str,
        groups: Vec<String>,
        provider: Option<&str>,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + Duration::hours(self.expiry_hours as i64)).timestamp();

        let claims = Claims {
            sub: sub.to_string(),
            email: Some(email.to_string()),
            email_verified: true,
            groups,
            identities: provider
                .map(|name| FederatedIdentity {
                    provider_name: name.to_string(),
                })
                .into_iter()
                .collect(),
            token_use: Some("id".to_string()),
            client_id: None,
            aud: None,
            exp,
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }
}

#[async_trait]
impl IdentityVerifier for SharedSecretVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let token = strip_bearer(credential)?;
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))?;
        Ok(Identity::from(data.claims))
    }
}
