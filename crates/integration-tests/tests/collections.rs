//! Integration tests for collection endpoints.
//!
//! Run with: cargo test -p inventory-integration-tests --test collections

#![allow(clippy::unwrap_used)]

use inventory_integration_tests::{TestServer, read};
use reqwest::Method;
use serde_json::{Value, json};

/// Test helper: Create a collection and return its JSON.
async fn create_collection(server: &TestServer, body: Value) -> Value {
    let resp = server
        .authed(Method::POST, "/api/v1/collections/")
        .json(&body)
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 201, "{body}");
    body
}

fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_and_fetch() {
    let server = TestServer::spawn().await;
    let created = create_collection(
        &server,
        json!({"name": "Summer Sale", "description": "Seasonal picks"}),
    )
    .await;
    assert_eq!(created["slug"], "summer-sale");

    let resp = server
        .authed(Method::GET, "/api/v1/collections/summer-sale")
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 200);
    assert_eq!(body["description"], "Seasonal picks");

    let resp = server
        .authed(Method::POST, "/api/v1/collections/")
        .json(&json!({"name": "Summer Sale"}))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({"detail": "Collection with slug 'summer-sale' already exists"})
    );
}

#[tokio::test]
async fn test_filter_by_active_and_name() {
    let server = TestServer::spawn().await;
    create_collection(&server, json!({"name": "Summer Sale"})).await;
    create_collection(&server, json!({"name": "Winter Sale", "is_active": false})).await;
    create_collection(&server, json!({"name": "Clearance"})).await;

    let resp = server
        .authed(Method::GET, "/api/v1/collections/?active=true")
        .send()
        .await
        .unwrap();
    let (_, body) = read(resp).await;
    assert_eq!(names(&body), ["Summer Sale", "Clearance"]);

    let resp = server
        .authed(Method::GET, "/api/v1/collections/?q=SALE")
        .send()
        .await
        .unwrap();
    let (_, body) = read(resp).await;
    assert_eq!(names(&body), ["Summer Sale", "Winter Sale"]);

    let resp = server
        .authed(Method::GET, "/api/v1/collections/?active=false&q=sale")
        .send()
        .await
        .unwrap();
    let (_, body) = read(resp).await;
    assert_eq!(names(&body), ["Winter Sale"]);
}

#[tokio::test]
async fn test_activate_and_deactivate() {
    let server = TestServer::spawn().await;
    create_collection(&server, json!({"name": "Clearance"})).await;

    let resp = server
        .authed(Method::POST, "/api/v1/collections/clearance/deactivate")
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 200);
    assert_eq!(body["is_active"], false);

    let resp = server
        .authed(Method::POST, "/api/v1/collections/clearance/activate")
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 200);
    assert_eq!(body["is_active"], true);

    let resp = server
        .authed(Method::POST, "/api/v1/collections/missing/activate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn test_update_clears_description() {
    let server = TestServer::spawn().await;
    create_collection(&server, json!({"name": "Gifts", "description": "For others"})).await;

    let resp = server
        .authed(Method::PUT, "/api/v1/collections/gifts")
        .json(&json!({"description": null}))
        .send()
        .await
        .unwrap();
    let (status, body) = read(resp).await;
    assert_eq!(status, 200);
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["name"], "Gifts");
}

#[tokio::test]
async fn test_delete_referenced_collection_conflicts() {
    let server = TestServer::spawn().await;
    let collection = create_collection(&server, json!({"name": "Staff Picks"})).await;

    let resp = server
        .authed(Method::POST, "/api/v1/categories/")
        .json(&json!({"name": "Books"}))
        .send()
        .await
        .unwrap();
    let (_, category) = read(resp).await;

    let resp = server
        .authed(Method::POST, "/api/v1/products/")
        .json(&json!({
            "name": "Novel",
            "category_id": category["id"],
            "collection_id": collection["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let resp = server
        .authed(Method::DELETE, "/api/v1/collections/staff-picks")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}
