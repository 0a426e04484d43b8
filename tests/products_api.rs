use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use catalog_app::products::{
    self,
    models::{ProductFields, ProductRecord},
    store::{InMemoryProductStore, ProductStore, SharedProductStore, StoreError},
};
use catalog_kernel::{
    settings::{DatabaseSettings, ServerSettings, Settings},
    ModuleRegistry,
};
use http_body_util::BodyExt;
use mongodb::bson::{oid::ObjectId, Bson};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

const ABSENT_ID: &str = "000000000000000000000000";

/// Store whose every call fails, as a dropped connection would.
struct FailingProductStore;

#[async_trait]
impl ProductStore for FailingProductStore {
    async fn insert(&self, _fields: ProductFields) -> Result<ProductRecord, StoreError> {
        Err(StoreError::UnexpectedId(Bson::Null))
    }

    async fn find(&self, _id: ObjectId) -> Result<Option<ProductRecord>, StoreError> {
        Err(StoreError::UnexpectedId(Bson::Null))
    }

    async fn list(&self) -> Result<Vec<ProductRecord>, StoreError> {
        Err(StoreError::UnexpectedId(Bson::Null))
    }

    async fn update(&self, _id: ObjectId, _fields: ProductFields) -> Result<u64, StoreError> {
        Err(StoreError::UnexpectedId(Bson::Null))
    }

    async fn delete(&self, _id: ObjectId) -> Result<u64, StoreError> {
        Err(StoreError::UnexpectedId(Bson::Null))
    }
}

fn test_app() -> Router {
    app_with(Arc::new(InMemoryProductStore::new()))
}

fn failing_app() -> Router {
    app_with(Arc::new(FailingProductStore))
}

fn app_with(store: SharedProductStore) -> Router {
    let settings = Settings {
        environment: Default::default(),
        server: ServerSettings::new(0),
        database: DatabaseSettings {
            uri: "mongodb://127.0.0.1:27017".to_string(),
            name: "catalog_test".to_string(),
        },
        telemetry: Default::default(),
    };

    let mut registry = ModuleRegistry::new();
    registry.register(products::create_module(store));
    catalog_http::build_router(&registry, &settings)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "application/json",
        "{method} {uri} must answer with JSON"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "{method} {uri} returned non-JSON body {:?}: {err}",
            String::from_utf8_lossy(&bytes)
        )
    });
    (status, json)
}

fn shoe() -> Value {
    json!({"title": "Shoe", "price": 50, "image": "x.png", "description": "d"})
}

async fn create(app: &Router, payload: Value) -> Value {
    let (status, body) = send(app, "POST", "/api/v1/product", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["data"].clone()
}

#[tokio::test]
async fn create_returns_generated_id_and_fields() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/api/v1/product", Some(shoe())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 201);
    assert_eq!(body["message"], "Product created successfully");

    let data = &body["data"];
    let id = data["id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(data["title"], "Shoe");
    assert_eq!(data["price"], 50);
    assert_eq!(data["image"], "x.png");
    assert_eq!(data["description"], "d");
}

#[tokio::test]
async fn create_ignores_client_id_and_assigns_unique_ids() {
    let app = test_app();
    let mut payload = shoe();
    payload["id"] = json!(ABSENT_ID);

    let first = create(&app, payload.clone()).await;
    let second = create(&app, payload).await;

    assert_ne!(first["id"], ABSENT_ID);
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn create_with_malformed_json_is_bad_request() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/product")
                .body(Body::from("{\"title\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/product",
        Some(json!({"price": "fifty"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn get_one_returns_created_fields() {
    let app = test_app();
    let created = create(&app, shoe()).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/v1/product/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product retrieved successfully");
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"], created);
}

#[tokio::test]
async fn get_one_with_invalid_id_is_bad_request() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/v1/product/not-a-valid-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid product ID");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn get_one_with_absent_id_is_not_found() {
    let app = test_app();

    let (status, body) = send(&app, "GET", &format!("/api/v1/product/{ABSENT_ID}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Product not found", "status": 404}));
}

#[tokio::test]
async fn list_on_empty_collection_is_ok_with_empty_list() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/v1/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["message"], "Products retrieved successfully");
}

#[tokio::test]
async fn list_returns_every_product() {
    let app = test_app();
    let first = create(&app, shoe()).await;
    let second = create(&app, json!({"title": "Hat", "price": -3})).await;

    let (status, body) = send(&app, "GET", "/api/v1/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([first, second]));
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let app = test_app();
    let created = create(&app, shoe()).await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/product/{id}");

    let (status, body) = send(&app, "PATCH", &uri, Some(json!({"price": 99}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");

    let expected = json!({
        "id": id,
        "image": "",
        "title": "",
        "description": "",
        "price": 99
    });
    assert_eq!(body["data"], expected);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], expected);
}

#[tokio::test]
async fn update_with_full_payload_is_visible_to_get() {
    let app = test_app();
    let created = create(&app, shoe()).await;
    let uri = format!("/api/v1/product/{}", created["id"].as_str().unwrap());

    let mut payload = shoe();
    payload["price"] = json!(99);
    let (status, _) = send(&app, "PATCH", &uri, Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["data"]["price"], 99);
    assert_eq!(body["data"]["title"], "Shoe");
}

#[tokio::test]
async fn update_rejects_bad_id_and_bad_body() {
    let app = test_app();

    let (status, body) = send(&app, "PATCH", "/api/v1/product/xyz", Some(shoe())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid product ID");

    let created = create(&app, shoe()).await;
    let uri = format!("/api/v1/product/{}", created["id"].as_str().unwrap());
    let (status, body) = send(&app, "PATCH", &uri, Some(json!({"title": 7}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn update_of_absent_product_is_not_found() {
    let app = test_app();

    let uri = format!("/api/v1/product/{ABSENT_ID}");
    let (status, body) = send(&app, "PATCH", &uri, Some(shoe())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = test_app();
    let created = create(&app, shoe()).await;
    let uri = format!("/api/v1/product/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Product deleted successfully", "status": 200})
    );

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_with_invalid_or_absent_id() {
    let app = test_app();

    let (status, _) = send(&app, "DELETE", "/api/v1/product/not-a-valid-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/product/{ABSENT_ID}");
    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn openapi_document_lists_product_routes() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let document: Value = serde_json::from_slice(&bytes).unwrap();
    for path in ["/api/v1/product", "/api/v1/products", "/api/v1/product/{id}"] {
        assert!(document["paths"][path].is_object(), "{path} missing");
    }
    assert!(document["components"]["schemas"]["Product"].is_object());
}

#[tokio::test]
async fn unsupported_method_gets_json_envelope() {
    let app = test_app();

    let uri = format!("/api/v1/product/{ABSENT_ID}");
    let (status, body) = send(&app, "PUT", &uri, Some(shoe())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"message": "Method not allowed", "status": 405}));
}

async fn assert_store_failure(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    message: &str,
) {
    let (status, body) = send(app, method, uri, body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
    assert_eq!(body["status"], 500);
    assert_eq!(body["message"], message);
    assert_eq!(body["error"], "store returned a non-ObjectId identifier: null");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn create_storage_failure_is_internal_error() {
    let app = failing_app();
    assert_store_failure(
        &app,
        "POST",
        "/api/v1/product",
        Some(shoe()),
        "Failed to create product",
    )
    .await;
}

#[tokio::test]
async fn list_storage_failure_is_internal_error() {
    let app = failing_app();
    assert_store_failure(
        &app,
        "GET",
        "/api/v1/products",
        None,
        "Failed to retrieve products",
    )
    .await;

    // The server keeps answering after a failed listing
    assert_store_failure(
        &app,
        "GET",
        "/api/v1/products",
        None,
        "Failed to retrieve products",
    )
    .await;
}

#[tokio::test]
async fn get_one_storage_failure_is_internal_error() {
    let app = failing_app();
    let uri = format!("/api/v1/product/{ABSENT_ID}");
    assert_store_failure(&app, "GET", &uri, None, "Failed to retrieve product").await;
}

#[tokio::test]
async fn update_storage_failure_is_internal_error() {
    let app = failing_app();
    let uri = format!("/api/v1/product/{ABSENT_ID}");
    assert_store_failure(&app, "PATCH", &uri, Some(shoe()), "Failed to update product").await;
}

#[tokio::test]
async fn delete_storage_failure_is_internal_error() {
    let app = failing_app();
    let uri = format!("/api/v1/product/{ABSENT_ID}");
    assert_store_failure(&app, "DELETE", &uri, None, "Failed to delete product").await;
}
