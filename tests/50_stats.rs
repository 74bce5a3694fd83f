mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{expect_error, expect_json, TestServer, ADMIN_TOKEN, USER_TOKEN};

fn stat(date: &str, page_path: &str) -> Value {
    json!({
        "date": date,
        "page_path": page_path,
        "country": "NZ",
        "pageviews": 120,
        "unique_visitors": 80,
        "latency_p50": 12.5,
        "errors_4xx": 2,
    })
}

async fn record(server: &TestServer, body: &Value) -> Result<Value> {
    let res = server.post("/api/stats", Some(ADMIN_TOKEN), body).await?;
    expect_json(res, StatusCode::CREATED).await
}

#[tokio::test]
async fn stats_are_admin_only() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.post("/api/stats", None, &stat("2024-05-01", "/")).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.post("/api/stats", Some(USER_TOKEN), &stat("2024-05-01", "/")).await?;
    expect_error(res, StatusCode::FORBIDDEN, "admin role required").await?;

    let res = server.get("/api/stats/page/%2F", Some(USER_TOKEN)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn record_and_fetch() -> Result<()> {
    let server = TestServer::start().await?;

    let created = record(&server, &stat("2024-05-01", "/blog/hello")).await?;
    assert_eq!(created["date"], "2024-05-01");
    assert_eq!(created["pageviews"], 120);
    assert_eq!(created["errors_5xx"], 0);
    assert!(created.get("latency_p99").is_none());

    let path = format!("/api/stats/{}", created["id"].as_str().unwrap());
    let fetched = expect_json(server.get(&path, Some(ADMIN_TOKEN)).await?, StatusCode::OK).await?;
    assert_eq!(fetched, created);

    // RFC 3339 dates are accepted too
    let stamped = record(&server, &stat("2024-05-02T00:00:00Z", "/blog/hello")).await?;
    assert_eq!(stamped["date"], "2024-05-02");
    Ok(())
}

#[tokio::test]
async fn date_and_path_are_unique() -> Result<()> {
    let server = TestServer::start().await?;
    record(&server, &stat("2024-05-01", "/")).await?;

    let res = server.post("/api/stats", Some(ADMIN_TOKEN), &stat("2024-05-01", "/")).await?;
    expect_error(res, StatusCode::CONFLICT, "stat for this date and page_path already exists").await?;

    record(&server, &stat("2024-05-01", "/about")).await?;
    Ok(())
}

#[tokio::test]
async fn validation_errors() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .post("/api/stats", Some(ADMIN_TOKEN), &json!({ "page_path": "/" }))
        .await?;
    expect_error(res, StatusCode::BAD_REQUEST, "date is required").await?;

    let mut negative = stat("2024-05-01", "/");
    negative["pageviews"] = json!(-1);
    let res = server.post("/api/stats", Some(ADMIN_TOKEN), &negative).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "pageviews cannot be negative").await?;

    let mut country = stat("2024-05-01", "/");
    country["country"] = json!("NZL");
    let res = server.post("/api/stats", Some(ADMIN_TOKEN), &country).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "country must be 2 characters or less (ISO 3166-1 alpha-2)").await?;

    let res = server
        .post("/api/stats", Some(ADMIN_TOKEN), &stat("May 1st", "/"))
        .await?;
    expect_error(res, StatusCode::BAD_REQUEST, "invalid request body").await
}

#[tokio::test]
async fn range_query_requires_valid_dates() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.get("/api/stats", Some(ADMIN_TOKEN)).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "start_date and end_date are required").await?;

    let res = server.get("/api/stats?start_date=2024-05-01", Some(ADMIN_TOKEN)).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "start_date and end_date are required").await?;

    let res = server
        .get("/api/stats?start_date=05/01/2024&end_date=2024-05-31", Some(ADMIN_TOKEN))
        .await?;
    expect_error(res, StatusCode::BAD_REQUEST, "invalid start_date format (use YYYY-MM-DD)").await?;

    let res = server
        .get("/api/stats?start_date=2024-05-01&end_date=tomorrow", Some(ADMIN_TOKEN))
        .await?;
    expect_error(res, StatusCode::BAD_REQUEST, "invalid end_date format (use YYYY-MM-DD)").await
}

#[tokio::test]
async fn range_and_page_listings() -> Result<()> {
    let server = TestServer::start().await?;
    for (date, path) in [
        ("2024-04-30", "/"),
        ("2024-05-01", "/"),
        ("2024-05-01", "/blog/hello"),
        ("2024-05-02", "/blog/hello"),
        ("2024-05-03", "/"),
    ] {
        record(&server, &stat(date, path)).await?;
    }

    // Inclusive on both ends, newest day first
    let range = expect_json(
        server
            .get("/api/stats?start_date=2024-05-01&end_date=2024-05-02", Some(ADMIN_TOKEN))
            .await?,
        StatusCode::OK,
    )
    .await?;
    let rows: Vec<(&str, &str)> = range
        .as_array()
        .unwrap()
        .iter()
        .map(|s| (s["date"].as_str().unwrap(), s["page_path"].as_str().unwrap()))
        .collect();
    assert_eq!(
        rows,
        vec![("2024-05-02", "/blog/hello"), ("2024-05-01", "/"), ("2024-05-01", "/blog/hello")]
    );

    let history = expect_json(
        server.get("/api/stats/page/%2Fblog%2Fhello", Some(ADMIN_TOKEN)).await?,
        StatusCode::OK,
    )
    .await?;
    let dates: Vec<&str> = history.as_array().unwrap().iter().map(|s| s["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2024-05-02", "2024-05-01"]);

    let limited = expect_json(
        server.get("/api/stats/page/%2F?limit=1", Some(ADMIN_TOKEN)).await?,
        StatusCode::OK,
    )
    .await?;
    assert_eq!(limited.as_array().unwrap().len(), 1);
    assert_eq!(limited[0]["date"], "2024-05-03");
    Ok(())
}

#[tokio::test]
async fn update_rewrites_counters() -> Result<()> {
    let server = TestServer::start().await?;
    let created = record(&server, &stat("2024-05-01", "/")).await?;
    let path = format!("/api/stats/{}", created["id"].as_str().unwrap());

    let res = server
        .send_json(
            Method::PUT,
            &path,
            Some(ADMIN_TOKEN),
            &json!({ "pageviews": 500, "unique_visitors": 300, "errors_5xx": 1 }),
        )
        .await?;
    let updated = expect_json(res, StatusCode::OK).await?;
    assert_eq!(updated["pageviews"], 500);
    assert_eq!(updated["errors_5xx"], 1);
    assert_eq!(updated["date"], "2024-05-01");
    assert_eq!(updated["page_path"], "/");
    assert_eq!(updated["created_at"], created["created_at"]);

    let res = server
        .send_json(Method::PUT, &path, Some(ADMIN_TOKEN), &json!({ "unique_visitors": -4 }))
        .await?;
    expect_error(res, StatusCode::BAD_REQUEST, "unique_visitors cannot be negative").await?;

    let missing = format!("/api/stats/{}", uuid::Uuid::new_v4());
    let res = server.get(&missing, Some(ADMIN_TOKEN)).await?;
    expect_error(res, StatusCode::NOT_FOUND, "visitor stat not found").await?;

    let res = server.get("/api/stats/abc", Some(ADMIN_TOKEN)).await?;
    expect_error(res, StatusCode::BAD_REQUEST, "invalid id format").await
}
