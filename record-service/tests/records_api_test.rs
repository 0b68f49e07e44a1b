mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn list_on_empty_store_returns_empty_array() {
    let app = TestApp::spawn();

    let (status, body) = app.get("/records").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "records": [] }));
}

#[tokio::test]
async fn created_record_is_retrievable_by_id() {
    let app = TestApp::spawn();

    let (status, body) = app
        .send_json("PUT", "/records", json!({ "title": "A", "body": "B" }).to_string())
        .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().expect("id missing").to_string();
    assert_eq!(id.len(), 24);

    let (status, body) = app.get(&format!("/records/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ID": id, "Title": "A", "Body": "B" }));

    let (_, body) = app.get("/records").await;
    assert_eq!(
        body,
        json!({ "records": [{ "id": id, "title": "A", "body": "B" }] })
    );
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let app = TestApp::spawn();
    let supplied = "65a1f0c2e4b0a1b2c3d4e5f6";

    let (status, body) = app
        .send_json(
            "PUT",
            "/records",
            json!({ "id": supplied, "title": "A", "body": "B" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["id"], supplied);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn each_create_assigns_a_distinct_id() {
    let app = TestApp::spawn();
    let payload = json!({ "title": "A", "body": "B" }).to_string();

    let (_, first) = app.send_json("PUT", "/records", payload.clone()).await;
    let (_, second) = app.send_json("PUT", "/records", payload).await;

    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn malformed_create_body_is_rejected() {
    let app = TestApp::spawn();

    let (status, body) = app.send_json("PUT", "/records", "{ not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Json parse error"));
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn unused_id_is_not_found() {
    let app = TestApp::spawn();
    app.send_json("PUT", "/records", json!({ "title": "A" }).to_string())
        .await;

    let (status, body) = app.get("/records/000000000000000000000000").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Record 000000000000000000000000 not found");
}

#[tokio::test]
async fn malformed_id_is_not_found() {
    let app = TestApp::spawn();

    let (status, body) = app.get("/records/not-an-id").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Invalid record id"));
}

#[tokio::test]
async fn update_replaces_title_and_body() {
    let app = TestApp::spawn();
    let (_, created) = app
        .send_json("PUT", "/records", json!({ "title": "A", "body": "B" }).to_string())
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send_json(
            "POST",
            "/records/update",
            json!({ "id": id, "title": "C", "body": "D" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "record": { "id": id, "title": "C", "body": "D" } })
    );

    let (_, fetched) = app.get(&format!("/records/{}", id)).await;
    assert_eq!(fetched, json!({ "ID": id, "Title": "C", "Body": "D" }));
}

#[tokio::test]
async fn update_with_unknown_id_creates_record() {
    let app = TestApp::spawn();
    let id = "65a1f0c2e4b0a1b2c3d4e5f6";

    let (status, body) = app
        .send_json(
            "POST",
            "/records/update",
            json!({ "ID": id, "Title": "C", "Body": "D" }).to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["id"], id);

    let (status, fetched) = app.get(&format!("/records/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["Title"], "C");
}

#[tokio::test]
async fn update_without_id_is_rejected() {
    let app = TestApp::spawn();

    let (status, body) = app
        .send_json(
            "POST",
            "/records/update",
            json!({ "title": "C", "body": "D" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("id is required"));
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn update_with_non_hex_id_is_rejected() {
    let app = TestApp::spawn();

    let (status, _) = app
        .send_json(
            "POST",
            "/records/update",
            json!({ "id": "zzzzzzzzzzzzzzzzzzzzzzzz", "title": "C" }).to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
