mod common;

use link_shortener::utils::code_generator::SHORT_CODE_REGEX;
use serde_json::{Value, json};
use sqlx::PgPool;

#[sqlx::test]
async fn test_create_link_generates_code(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com/a/b/c" }))
        .await;

    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    let code = body["shortCode"].as_str().unwrap();
    assert!(SHORT_CODE_REGEX.is_match(code));
    assert_eq!(body["longUrl"], "https://example.com/a/b/c");
    assert_eq!(body["shortUrl"], format!("{}/{}", common::BASE_URL, code));
    assert_eq!(body["totalClicks"], 0);
    assert!(body["lastClickedAt"].is_null());
    assert!(body["createdAt"].is_string());

    let fetched: Value = server.get(&format!("/api/links/{code}")).await.json();
    assert_eq!(fetched["longUrl"], "https://example.com/a/b/c");
}

#[sqlx::test]
async fn test_create_link_with_custom_code(pool: PgPool) {
    let (server, cache) = common::create_test_server(pool);

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com", "shortCode": "promo2026" }))
        .await;

    // 9 characters is one too many.
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com", "shortCode": "promo26" }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["shortCode"], "promo26");
    assert!(cache.raw("link:promo26").is_some());
}

#[sqlx::test]
async fn test_create_link_empty_code_is_generated(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com", "shortCode": "" }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["shortCode"].as_str().unwrap().len(), 6);
}

#[sqlx::test]
async fn test_create_link_conflict_leaves_existing_record(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool.clone());
    common::create_test_link(&pool, "taken123", "https://original.com", 7).await;

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://intruder.com", "shortCode": "taken123" }))
        .await;

    assert_eq!(response.status_code(), 409);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "conflict");

    let existing: Value = server.get("/api/links/taken123").await.json();
    assert_eq!(existing["longUrl"], "https://original.com");
    assert_eq!(existing["totalClicks"], 7);
}

#[sqlx::test]
async fn test_create_link_validation_errors(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "not a url" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["details"]["fields"]["longUrl"].is_array());

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com", "shortCode": "bad-code" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["error"]["details"]["fields"]["shortCode"].is_array());

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com", "shortCode": "healthz" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "javascript:alert(1)" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[sqlx::test]
async fn test_create_link_malformed_body(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let response = server
        .post("/api/links")
        .text("{ not json")
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[sqlx::test]
async fn test_get_link_does_not_count_a_click(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool.clone());
    common::create_test_link(&pool, "peek0001", "https://example.com", 0).await;

    let response = server.get("/api/links/peek0001").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["shortCode"], "peek0001");
    assert_eq!(common::get_clicks(&pool, "peek0001").await, 0);
}

#[sqlx::test]
async fn test_get_link_not_found(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let response = server.get("/api/links/missing1").await;

    assert_eq!(response.status_code(), 404);
}

#[sqlx::test]
async fn test_delete_link(pool: PgPool) {
    let (server, cache) = common::create_test_server(pool.clone());
    common::create_test_link(&pool, "gone0001", "https://example.com", 0).await;

    // Cached before the delete.
    server.get("/api/links/gone0001").await.assert_status_ok();
    assert!(cache.raw("link:gone0001").is_some());

    let response = server.delete("/api/links/gone0001").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Link deleted successfully");
    assert!(cache.raw("link:gone0001").is_none());

    assert_eq!(server.get("/api/links/gone0001").await.status_code(), 404);
    assert_eq!(server.get("/gone0001").await.status_code(), 404);
}

#[sqlx::test]
async fn test_delete_link_not_found(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let response = server.delete("/api/links/missing1").await;

    assert_eq!(response.status_code(), 404);
}

#[sqlx::test]
async fn test_list_links_search(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    let created: Value = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com/a/b/c" }))
        .await
        .json();

    let found: Value = server
        .get("/api/links")
        .add_query_param("search", "example")
        .await
        .json();
    assert_eq!(found["total"], 1);
    assert_eq!(found["links"][0]["shortCode"], created["shortCode"]);

    let none: Value = server
        .get("/api/links")
        .add_query_param("search", "zzz")
        .await
        .json();
    assert_eq!(none["total"], 0);
    assert_eq!(none["links"], json!([]));
    assert_eq!(none["totalPages"], 0);
}

#[sqlx::test]
async fn test_list_links_has_clicks_overrides_bounds(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool.clone());
    common::create_test_link(&pool, "zero0001", "https://a.com", 0).await;
    common::create_test_link(&pool, "one00001", "https://b.com", 1).await;
    common::create_test_link(&pool, "many0001", "https://c.com", 50).await;

    let body: Value = server
        .get("/api/links?hasClicks=true&minClicks=10&maxClicks=20")
        .await
        .json();

    assert_eq!(body["total"], 2);
    for link in body["links"].as_array().unwrap() {
        assert!(link["totalClicks"].as_i64().unwrap() > 0);
    }

    let body: Value = server.get("/api/links?hasClicks=false").await.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["links"][0]["shortCode"], "zero0001");

    let body: Value = server
        .get("/api/links?minClicks=1&maxClicks=10")
        .await
        .json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["links"][0]["shortCode"], "one00001");
}

#[sqlx::test]
async fn test_list_links_sort_and_paginate(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool.clone());
    for (code, clicks) in [("aaaaaa", 5), ("bbbbbb", 1), ("cccccc", 9), ("dddddd", 3), ("eeeeee", 7)] {
        common::create_test_link(&pool, code, "https://example.com", clicks).await;
    }

    let page1: Value = server
        .get("/api/links?sortBy=totalClicks&sortOrder=desc&limit=2&page=1")
        .await
        .json();
    assert_eq!(page1["total"], 5);
    assert_eq!(page1["totalPages"], 3);
    assert_eq!(page1["page"], 1);
    assert_eq!(page1["limit"], 2);
    assert_eq!(page1["links"][0]["shortCode"], "cccccc");
    assert_eq!(page1["links"][1]["shortCode"], "eeeeee");

    let page3: Value = server
        .get("/api/links?sortBy=totalClicks&sortOrder=desc&limit=2&page=3")
        .await
        .json();
    assert_eq!(page3["links"].as_array().unwrap().len(), 1);
    assert_eq!(page3["links"][0]["shortCode"], "bbbbbb");

    let by_code: Value = server
        .get("/api/links?sortBy=shortCode&sortOrder=asc")
        .await
        .json();
    assert_eq!(by_code["links"][0]["shortCode"], "aaaaaa");
}

#[sqlx::test]
async fn test_list_links_rejects_bad_parameters(pool: PgPool) {
    let (server, _cache) = common::create_test_server(pool);

    for query in [
        "sortBy=clicks",
        "sortOrder=up",
        "page=0",
        "limit=5000",
        "minClicks=abc",
        "hasClicks=sometimes",
        "createdAfter=last-week",
        "minClicks=9&maxClicks=1",
    ] {
        let response = server.get(&format!("/api/links?{query}")).await;
        assert_eq!(response.status_code(), 400, "query {query} should be rejected");

        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "validation_error");
    }
}

#[sqlx::test]
async fn test_list_cache_is_invalidated_by_writes(pool: PgPool) {
    let (server, cache) = common::create_test_server(pool);

    let empty: Value = server.get("/api/links").await.json();
    assert_eq!(empty["total"], 0);
    assert_eq!(cache.keys_with_prefix("links:list:v0:").len(), 1);

    let created: Value = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com" }))
        .await
        .json();
    let code = created["shortCode"].as_str().unwrap().to_string();

    let one: Value = server.get("/api/links").await.json();
    assert_eq!(one["total"], 1);

    server.delete(&format!("/api/links/{code}")).await.assert_status_ok();

    let again: Value = server.get("/api/links").await.json();
    assert_eq!(again["total"], 0);
}

#[sqlx::test]
async fn test_registry_works_while_cache_is_down(pool: PgPool) {
    let (server, cache) = common::create_test_server(pool);
    cache.set_failing(true);

    let response = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com", "shortCode": "offline1" }))
        .await;
    assert_eq!(response.status_code(), 201);

    server.get("/api/links/offline1").await.assert_status_ok();

    let list: Value = server.get("/api/links").await.json();
    assert_eq!(list["total"], 1);

    server.delete("/api/links/offline1").await.assert_status_ok();
}
