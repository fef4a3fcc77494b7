//! End-to-end tests of the HTTP surface against the in-memory store.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use cupcake_api::{
    app, AppState, Cupcake, CupcakeDraft, CupcakeService, CupcakeStore, FieldInput, MemoryCupcakeStore, StoreError,
    DEFAULT_IMAGE,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn cupcake_data() -> Value {
    json!({
        "flavor": "TestFlavor",
        "size": "TestSize",
        "rating": 5,
        "image": "http://test.com/cupcake.jpg"
    })
}

fn cupcake_data_2() -> Value {
    json!({
        "flavor": "TestFlavor2",
        "size": "TestSize2",
        "rating": 10,
        "image": "http://test.com/cupcake2.jpg"
    })
}

struct Harness {
    router: Router,
    state: AppState,
    cupcake: Cupcake,
}

async fn setup() -> Harness {
    let cupcakes = CupcakeService::new(Arc::new(MemoryCupcakeStore::new()));
    let data = cupcake_data();
    let input = FieldInput::from_body(data.as_object().expect("fixture is an object"));
    let cupcake = cupcakes
        .create(&input)
        .await
        .record()
        .cloned()
        .expect("fixture cupcake is created");
    let state = AppState { cupcakes };
    Harness {
        router: app(state.clone(), 64 * 1024),
        state,
        cupcake,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");
    let response = router.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };
    (status, value)
}

fn without_id(mut data: Value) -> Value {
    let id = data["cupcake"].as_object_mut().and_then(|c| c.remove("id"));
    assert!(id.as_ref().map_or(false, Value::is_i64), "cupcake id should be an integer");
    data
}

#[tokio::test]
async fn list_cupcakes() {
    let h = setup().await;
    let (status, data) = send(&h.router, "GET", "/api/cupcakes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        data,
        json!({
            "cupcakes": [{
                "id": h.cupcake.id,
                "flavor": "TestFlavor",
                "size": "TestSize",
                "rating": 5.0,
                "image": "http://test.com/cupcake.jpg"
            }]
        })
    );
}

#[tokio::test]
async fn get_cupcake() {
    let h = setup().await;
    let (status, data) = send(&h.router, "GET", &format!("/api/cupcakes/{}", h.cupcake.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        data,
        json!({
            "cupcake": {
                "id": h.cupcake.id,
                "flavor": "TestFlavor",
                "size": "TestSize",
                "rating": 5.0,
                "image": "http://test.com/cupcake.jpg"
            }
        })
    );
}

#[tokio::test]
async fn get_cupcake_not_found() {
    let h = setup().await;
    let (status, data) = send(&h.router, "GET", "/api/cupcakes/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(data, json!({"error": {"message": "Cupcake id=999 was not found"}}));
}

#[tokio::test]
async fn get_cupcake_invalid_id() {
    let h = setup().await;
    let (status, data) = send(&h.router, "GET", "/api/cupcakes/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(data, json!({"error": {"message": "Cupcake id='abc' was not an integer."}}));
}

#[tokio::test]
async fn create_cupcake() {
    let h = setup().await;
    let (status, data) = send(&h.router, "POST", "/api/cupcakes", Some(cupcake_data_2())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        without_id(data),
        json!({
            "cupcake": {
                "flavor": "TestFlavor2",
                "size": "TestSize2",
                "rating": 10.0,
                "image": "http://test.com/cupcake2.jpg"
            }
        })
    );
    assert_eq!(h.state.cupcakes.count().await.unwrap(), 2);
}

#[tokio::test]
async fn create_cupcake_trims_values_and_defaults_image() {
    let h = setup().await;
    let body = json!({"flavor": "  Vanilla ", "size": "Large\t", "rating": 4.5});
    let (status, data) = send(&h.router, "POST", "/api/cupcakes", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        without_id(data),
        json!({"cupcake": {"flavor": "Vanilla", "size": "Large", "rating": 4.5, "image": DEFAULT_IMAGE}})
    );
}

#[tokio::test]
async fn create_cupcake_missing_values() {
    let h = setup().await;
    let body = json!({"flavor": "Vanilla", "size": "   ", "image": "http://test.com/c.jpg"});
    let (status, data) = send(&h.router, "POST", "/api/cupcakes", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        data,
        json!({
            "error": {
                "message": "An error occurred. Non-blank values required for flavor, size, and rating. Missing: size, rating."
            }
        })
    );
    assert_eq!(h.state.cupcakes.count().await.unwrap(), 1);
}

#[tokio::test]
async fn create_cupcake_bad_rating() {
    let h = setup().await;
    let body = json!({"flavor": "Vanilla", "size": "Large", "rating": "ten"});
    let (status, data) = send(&h.router, "POST", "/api/cupcakes", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(data, json!({"error": {"message": "An error occurred."}}));
    assert_eq!(h.state.cupcakes.count().await.unwrap(), 1);
}

#[tokio::test]
async fn create_cupcake_requires_json_object() {
    let h = setup().await;
    let (status, data) = send(&h.router, "POST", "/api/cupcakes", Some(json!(["flavor"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(data, json!({"error": {"message": "body must be a JSON object"}}));
}

#[tokio::test]
async fn update_cupcake_nochanges() {
    let h = setup().await;
    let (status, data) = send(
        &h.router,
        "PATCH",
        &format!("/api/cupcakes/{}", h.cupcake.id),
        Some(cupcake_data()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        without_id(data),
        json!({
            "cupcake": {
                "flavor": "TestFlavor",
                "size": "TestSize",
                "rating": 5.0,
                "image": "http://test.com/cupcake.jpg"
            }
        })
    );
}

#[tokio::test]
async fn update_cupcake_changes() {
    let h = setup().await;
    let uri = format!("/api/cupcakes/{}", h.cupcake.id);
    let (status, data) = send(&h.router, "PATCH", &uri, Some(cupcake_data_2())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        without_id(data),
        json!({
            "cupcake": {
                "flavor": "TestFlavor2",
                "size": "TestSize2",
                "rating": 10.0,
                "image": "http://test.com/cupcake2.jpg"
            }
        })
    );
    let (_, stored) = send(&h.router, "GET", &uri, None).await;
    assert_eq!(stored["cupcake"]["flavor"], "TestFlavor2");
}

#[tokio::test]
async fn update_cupcake_missing_values() {
    let h = setup().await;
    let body = json!({
        "flavor": "TestFlavor",
        "size": "TestSize",
        "image": "http://test.com/cupcake.jpg"
    });
    let (status, data) = send(&h.router, "PATCH", &format!("/api/cupcakes/{}", h.cupcake.id), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        data,
        json!({
            "error": {
                "message": "Update Error: All fields require a value. rating had a value of null. No updates occurred."
            }
        })
    );
}

#[tokio::test]
async fn update_cupcake_blank_value() {
    let h = setup().await;
    let mut body = cupcake_data_2();
    body["flavor"] = json!("");
    let (status, data) = send(&h.router, "PATCH", &format!("/api/cupcakes/{}", h.cupcake.id), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        data,
        json!({
            "error": {
                "message": "Update Error: A non-blank value is required for flavor. No updates occurred."
            }
        })
    );
    let (_, stored) = send(&h.router, "GET", &format!("/api/cupcakes/{}", h.cupcake.id), None).await;
    assert_eq!(stored["cupcake"]["flavor"], "TestFlavor");
}

#[tokio::test]
async fn update_cupcake_bad_value() {
    let h = setup().await;
    let body = json!({
        "flavor": "TestFlavor",
        "size": "TestSize",
        "rating": "ten",
        "image": "http://test.com/cupcake.jpg"
    });
    let (status, data) = send(&h.router, "PATCH", &format!("/api/cupcakes/{}", h.cupcake.id), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = data["error"]["message"].as_str().expect("error message");
    assert!(message.contains("Update Error: An error occurred while updating"));
    assert!(message.contains(": TestFlavor. No updates occurred."));
}

#[tokio::test]
async fn update_cupcake_invalid_id() {
    let h = setup().await;
    let (status, data) = send(&h.router, "PATCH", "/api/cupcakes/2a", Some(cupcake_data_2())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        data,
        json!({"error": {"message": "Update Error: Cupcake id='2a' was not an integer. No updates occurred."}})
    );
}

#[tokio::test]
async fn update_cupcake_id_not_found() {
    let h = setup().await;
    let (status, data) = send(&h.router, "PATCH", "/api/cupcakes/200", Some(cupcake_data_2())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        data,
        json!({"error": {"message": "Update Error: Cupcake id=200 was not found. No updates occurred."}})
    );
}

#[tokio::test]
async fn delete_cupcake_id_not_found() {
    let h = setup().await;
    let (status, data) = send(&h.router, "DELETE", "/api/cupcakes/200", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        data,
        json!({"error": {"message": "Cupcake id=200 was not found. No delete occurred. "}})
    );
    assert_eq!(h.state.cupcakes.count().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_cupcake_invalid_id() {
    let h = setup().await;
    let (status, data) = send(&h.router, "DELETE", "/api/cupcakes/3f", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        data,
        json!({"error": {"message": "Cupcake id='3f' was not an integer. No delete occurred. "}})
    );
    assert_eq!(h.state.cupcakes.count().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_cupcake() {
    let h = setup().await;
    let uri = format!("/api/cupcakes/{}", h.cupcake.id);
    let (status, data) = send(&h.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        data,
        json!({
            "message": {
                "deleted": {
                    "id": h.cupcake.id,
                    "flavor": h.cupcake.flavor,
                    "size": h.cupcake.size,
                    "rating": h.cupcake.rating,
                    "image": h.cupcake.image
                }
            }
        })
    );
    assert_eq!(h.state.cupcakes.count().await.unwrap(), 0);
    let (status, _) = send(&h.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn probes_report_ok() {
    let h = setup().await;
    let (status, data) = send(&h.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data, json!({"status": "ok"}));
    let (status, data) = send(&h.router, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data, json!({"status": "ok", "database": "ok"}));
    let (status, data) = send(&h.router, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["name"], "cupcake-api");
}

#[tokio::test]
async fn home_page_is_html() {
    let h = setup().await;
    let request = Request::builder().uri("/").body(Body::empty()).expect("request builds");
    let response = h.router.clone().oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    let html = String::from_utf8(bytes.to_vec()).expect("utf-8 page");
    assert!(html.contains("<h1>Cupcakes</h1>"));
    assert!(html.contains("/api/cupcakes"));
}

/// A store whose database has gone away: every call reports it unreachable.
struct Unreachable;

fn unreachable() -> StoreError {
    StoreError::Unavailable(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl CupcakeStore for Unreachable {
    async fn list(&self) -> Result<Vec<Cupcake>, StoreError> {
        Err(unreachable())
    }

    async fn get(&self, _id: i32) -> Result<Option<Cupcake>, StoreError> {
        Err(unreachable())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Err(unreachable())
    }

    async fn insert(&self, _draft: &CupcakeDraft) -> Result<Cupcake, StoreError> {
        Err(unreachable())
    }

    async fn update(&self, _id: i32, _draft: &CupcakeDraft) -> Result<Option<Cupcake>, StoreError> {
        Err(unreachable())
    }

    async fn delete(&self, _id: i32) -> Result<Option<Cupcake>, StoreError> {
        Err(unreachable())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unreachable())
    }
}

#[tokio::test]
async fn unreachable_store_is_reported_as_503() {
    let state = AppState {
        cupcakes: CupcakeService::new(Arc::new(Unreachable)),
    };
    let router = app(state, 64 * 1024);

    let (status, data) = send(&router, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(data, json!({"status": "degraded", "database": "unavailable"}));

    let (status, data) = send(&router, "GET", "/api/cupcakes", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(data, json!({"error": {"message": "Storage is unavailable."}}));

    let (status, data) = send(&router, "PATCH", "/api/cupcakes/1", Some(cupcake_data_2())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(data, json!({"error": {"message": "Storage is unavailable."}}));

    let (status, _) = send(&router, "DELETE", "/api/cupcakes/1", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn oversized_body_gets_error_envelope() {
    let h = setup().await;
    let router = app(h.state.clone(), 100);
    let mut data = cupcake_data_2();
    data["flavor"] = json!("x".repeat(500));
    let body = data.to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/api/cupcakes")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("request builds");
    let response = router.oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    let data: Value = serde_json::from_slice(&bytes).expect("body is JSON");
    assert_eq!(data, json!({"error": {"message": "Request body is too large."}}));
    assert_eq!(h.state.cupcakes.count().await.unwrap(), 1);
}
