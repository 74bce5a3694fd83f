use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{strip_bearer, AuthError, Identity, IdentityVerifier};

/// Local development verifier: any non-empty token maps to one fixed identity.
pub struct DevVerifier {
    role: String,
}

impl DevVerifier {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

#[async_trait]
impl IdentityVerifier for DevVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        strip_bearer(credential)?;

        Ok(Identity {
            id: "dev-user".to_string(),
            email: "dev@localhost".to_string(),
            email_verified: true,
            groups: BTreeSet::from([self.role.clone()]),
            provider: Some("google".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn role_controls_admin() {
        let admin = DevVerifier::new("admin").verify("anything").await.unwrap();
        assert!(admin.is_admin());

        let user = DevVerifier::new("user").verify("Bearer anything").await.unwrap();
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn still_requires_a_token() {
        assert!(DevVerifier::new("admin").verify("").await.is_err());
    }
}
