#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use site_api::auth::{strip_bearer, AuthError, Identity, IdentityVerifier};
use site_api::{AppConfig, AppState, Stores};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";
pub const OTHER_USER_TOKEN: &str = "other-user-token";
pub const NO_PROVIDER_TOKEN: &str = "no-provider-token";

/// Verifier backed by a fixed token table
pub struct StaticVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(ADMIN_TOKEN.to_string(), identity("admin-1", "admin", Some("google")));
        tokens.insert(USER_TOKEN.to_string(), identity("google_111", "user", Some("google")));
        tokens.insert(OTHER_USER_TOKEN.to_string(), identity("linkedin_222", "user", Some("linkedin")));
        tokens.insert(NO_PROVIDER_TOKEN.to_string(), identity("local-333", "user", None));
        Self { tokens }
    }
}

fn identity(id: &str, group: &str, provider: Option<&str>) -> Identity {
    Identity {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        email_verified: true,
        groups: BTreeSet::from([group.to_string()]),
        provider: provider.map(str::to_string),
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let token = strip_bearer(credential)?;
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("unknown token".to_string()))
    }
}

/// App state over fresh in-memory stores and the static token table.
pub fn test_state(config: AppConfig) -> AppState {
    AppState::new(config, Arc::new(StaticVerifier::new()), Stores::in_memory())
}

/// An in-process server on its own port, backed by in-memory stores.
///
/// Each test starts a fresh server, so state never leaks between tests.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::default()).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        Self::serve(site_api::app(test_state(config))).await
    }

    /// Serve an already assembled router; it must answer `/api/health`.
    pub async fn serve(router: axum::Router) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/api/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        Ok(self.request(Method::GET, path, token).send().await?)
    }

    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<Response> {
        Ok(self.request(method, path, token).json(body).send().await?)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> Result<Response> {
        self.send_json(Method::POST, path, token, body).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Response> {
        Ok(self.request(Method::DELETE, path, token).send().await?)
    }
}

/// Assert the status and return the parsed JSON body.
pub async fn expect_json(resp: Response, status: StatusCode) -> Result<Value> {
    let actual = resp.status();
    let body: Value = resp.json().await.context("response body is not JSON")?;
    assert_eq!(actual, status, "unexpected status, body: {}", body);
    Ok(body)
}

/// Assert an error response with the given status and message.
pub async fn expect_error(resp: Response, status: StatusCode, message: &str) -> Result<()> {
    let body = expect_json(resp, status).await?;
    assert_eq!(body["error"], message, "unexpected error body: {}", body);
    Ok(())
}
