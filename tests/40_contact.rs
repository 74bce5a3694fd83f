mod common;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{expect_error, expect_json, TestServer, ADMIN_TOKEN, USER_TOKEN};

fn message_from(email: &str) -> Value {
    json!({ "email": email, "name": "Visitor", "message": "Hello there" })
}

async fn submit(server: &TestServer, email: &str) -> Result<Value> {
    let res = server.post("/api/contact", None, &message_from(email)).await?;
    expect_json(res, StatusCode::CREATED).await
}

#[tokio::test]
async fn public_submission_expires_in_180_days() -> Result<()> {
    let server = TestServer::start().await?;

    let created = submit(&server, "visitor@example.com").await?;
    assert_eq!(created["status"], "received");

    let created_at: DateTime<Utc> = created["created_at"].as_str().unwrap().parse()?;
    let expires_at: DateTime<Utc> = created["expires_at"].as_str().unwrap().parse()?;
    assert_eq!(expires_at - created_at, Duration::days(180));
    Ok(())
}

#[tokio::test]
async fn accepts_display_name_addresses() -> Result<()> {
    let server = TestServer::start().await?;
    submit(&server, "Jane Doe <jane@example.com>").await?;
    Ok(())
}

#[tokio::test]
async fn validation_errors() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.post("/api/contact", None, &message_from("not-an-email")).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "invalid email address").await?;

    let res = server.post("/api/contact", None, &json!({ "name": "x", "message": "y" })).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "email is required").await?;

    let mut markup = message_from("a@example.com");
    markup["message"] = json!("<b>hi</b>");
    let res = server.post("/api/contact", None, &markup).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "message contains invalid characters").await?;

    let res = server
        .request(Method::POST, "/api/contact", None)
        .header("Content-Type", "application/json")
        .body("[]")
        .send()
        .await?;
    expect_error(res, StatusCode::BAD_REQUEST, "invalid request body").await
}

#[tokio::test]
async fn sixth_submission_per_email_is_rate_limited() -> Result<()> {
    let server = TestServer::start().await?;
    for _ in 0..5 {
        submit(&server, "chatty@example.com").await?;
    }

    let res = server.post("/api/contact", None, &message_from("chatty@example.com")).await?;
    expect_error(res, StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded: 5 submissions per day").await?;

    submit(&server, "quiet@example.com").await?;
    Ok(())
}

#[tokio::test]
async fn honeypot_is_not_persisted() -> Result<()> {
    let server = TestServer::start().await?;

    let mut bot = message_from("bot@example.com");
    bot["honeypot"] = json!("http://spam.example");
    let res = server.post("/api/contact", None, &bot).await?;
    let body = expect_json(res, StatusCode::CREATED).await?;
    assert_eq!(body.as_object().unwrap().len(), 1);

    let list = expect_json(server.get("/api/contact", Some(ADMIN_TOKEN)).await?, StatusCode::OK).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn admin_lists_and_updates_status() -> Result<()> {
    let server = TestServer::start().await?;
    let first = submit(&server, "one@example.com").await?;
    submit(&server, "two@example.com").await?;

    let res = server.get("/api/contact", None).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let res = server.get("/api/contact", Some(USER_TOKEN)).await?;
    expect_error(res, StatusCode::FORBIDDEN, "admin role required").await?;

    let all = expect_json(server.get("/api/contact", Some(ADMIN_TOKEN)).await?, StatusCode::OK).await?;
    assert_eq!(all.as_array().unwrap().len(), 2);
    // Newest first
    assert_eq!(all[0]["email"], "two@example.com");

    let path = format!("/api/contact/{}", first["id"].as_str().unwrap());
    let res = server
        .send_json(Method::PATCH, &path, Some(ADMIN_TOKEN), &json!({ "status": "read" }))
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let read = expect_json(server.get("/api/contact?status=read", Some(ADMIN_TOKEN)).await?, StatusCode::OK).await?;
    assert_eq!(read.as_array().unwrap().len(), 1);
    assert_eq!(read[0]["id"], first["id"]);

    let res = server.get("/api/contact?status=spam", Some(ADMIN_TOKEN)).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "invalid contact status").await?;

    let res = server
        .send_json(Method::PATCH, &path, Some(ADMIN_TOKEN), &json!({ "status": "archived" }))
        .await?;
    expect_error(res, StatusCode::BAD_REQUEST, "invalid contact status").await?;

    let missing = format!("/api/contact/{}", uuid::Uuid::new_v4());
    let res = server
        .send_json(Method::PATCH, &missing, Some(ADMIN_TOKEN), &json!({ "status": "replied" }))
        .await?;
    expect_error(res, StatusCode::NOT_FOUND, "contact submission not found").await
}
