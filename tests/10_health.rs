mod common;

use anyhow::Result;
use axum::routing::get;
use reqwest::{Method, StatusCode};
use site_api::app::{routes, with_middleware};
use site_api::AppConfig;

use common::{expect_error, expect_json, test_state, TestServer};

#[tokio::test]
async fn health_reports_healthy() -> Result<()> {
    let server = TestServer::start().await?;

    let body = expect_json(server.get("/api/health", None).await?, StatusCode::OK).await?;
    assert_eq!(body["status"], "healthy");
    let time = body["time"].as_str().expect("time is a string");
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok(), "time is rfc3339: {}", time);
    Ok(())
}

#[tokio::test]
async fn unknown_routes_return_json_404() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.get("/api/nope", None).await?;
    expect_error(res, StatusCode::NOT_FOUND, "not found").await
}

#[tokio::test]
async fn responses_carry_a_request_id() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.get("/api/health", None).await?;
    let id = res.headers().get("x-request-id").expect("x-request-id header");
    assert!(uuid::Uuid::parse_str(id.to_str()?).is_ok());

    // A caller-supplied id is echoed back
    let res = server
        .request(Method::GET, "/api/health", None)
        .header("x-request-id", "trace-me")
        .send()
        .await?;
    assert_eq!(res.headers()["x-request-id"], "trace-me");
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .request(Method::OPTIONS, "/api/posts", None)
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-max-age"], "86400");

    // Unlisted origins get no allow-origin header
    let res = server
        .request(Method::OPTIONS, "/api/posts", None)
        .header("Origin", "https://evil.example")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;
    assert!(res.headers().get("access-control-allow-origin").is_none());
    Ok(())
}

async fn explode() -> &'static str {
    panic!("handler blew up")
}

#[tokio::test]
async fn panicking_handler_returns_generic_500() -> Result<()> {
    let config = AppConfig::default();
    let router = routes()
        .route("/api/explode", get(explode))
        .with_state(test_state(config.clone()));
    let server = TestServer::serve(with_middleware(router, &config)).await?;

    let res = server.get("/api/explode", None).await?;
    expect_error(res, StatusCode::INTERNAL_SERVER_ERROR, "internal server error").await?;

    // The server keeps answering after the panic
    let res = server.get("/api/health", None).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
