mod common;

use serde_json::Value;
use sqlx::PgPool;

#[sqlx::test]
async fn test_liveness_endpoint(pool: PgPool) {
    let (server, cache) = common::create_test_server(pool);
    cache.set_failing(true);

    let response = server.get("/healthz").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["ok"], true);
    assert_eq!(json["system"], "ok");
    assert!(json["version"].is_string());
}

#[sqlx::test]
async fn test_health_endpoint_success(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}

#[sqlx::test]
async fn test_health_endpoint_degraded_cache(pool: PgPool) {
    let (server, cache) = common::create_test_server(pool);
    cache.set_failing(true);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);

    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "error");
}

#[sqlx::test]
async fn test_health_endpoint_structure(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let json = server.get("/health").await.json::<Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("database").is_some());
    assert!(json["checks"].get("cache").is_some());
}

#[sqlx::test]
async fn test_healthz_is_not_a_short_code(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool.clone());

    server.get("/healthz").await.assert_status_ok();

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 0);
}

#[sqlx::test]
async fn test_health_cannot_be_registered_as_short_code(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool.clone());

    let response = server
        .post("/api/links")
        .json(&serde_json::json!({ "longUrl": "https://example.com/target", "shortCode": "health" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body = response.json::<Value>();
    assert!(body["error"]["details"]["fields"]["shortCode"].is_array());

    let health = server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "healthy");

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 0);
}
