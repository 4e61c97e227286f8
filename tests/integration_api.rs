//! API Integration Tests

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt;

use dsql_transfer::api::{self, routes::TransferRequest, ApiState};

mod common;

fn app(db: &dsql_transfer::infrastructure::MemoryDatabase) -> Router {
    let state = ApiState::new(common::shared_memory_service(db), Duration::from_secs(5));
    api::create_router().with_state(state)
}

fn transfer_request(from_id: &str, to_id: &str, amount: i64) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/transfers")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&TransferRequest {
                from_id: from_id.to_string(),
                to_id: to_id.to_string(),
                amount,
            })
            .unwrap(),
        ))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_transfer_e2e() {
    let db = common::seeded_db(&[("Alice", "Tokyo", 1000), ("Bob", "Osaka", 200)]);
    let app = app(&db);

    // 1. Transfer from Alice to Bob
    let response = app
        .clone()
        .oneshot(transfer_request("Alice", "Bob", 300))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Transfer failed");

    let body = json_body(response).await;
    assert_eq!(body["from_balance"], 700);
    assert_eq!(body["to_balance"], 500);
    assert_eq!(body["status"], "committed");

    // 2. Verify Bob's balance
    let req = Request::builder()
        .uri("/accounts/Bob")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["id"], "Bob");
    assert_eq!(body["location"], "Osaka");
    assert_eq!(body["balance"], 500);
}

#[tokio::test]
async fn test_insufficient_funds_is_unprocessable() {
    let db = common::seeded_db(&[("fromUser", "Tokyo", 100), ("toUser", "Osaka", 200)]);

    let response = app(&db)
        .oneshot(transfer_request("fromUser", "toUser", 300))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["error_code"], "insufficient_funds");
    assert!(body["error"].as_str().unwrap().contains("insufficient funds"));
    assert!(db.records().is_empty());
}

#[tokio::test]
async fn test_non_positive_amount_is_bad_request() {
    let db = common::seeded_db(&[("Alice", "Tokyo", 1000), ("Bob", "Osaka", 200)]);

    let response = app(&db)
        .oneshot(transfer_request("Alice", "Bob", -50))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error_code"], "invalid_amount");
    assert_eq!(db.balance("Bob"), Some(200));
}

#[tokio::test]
async fn test_malformed_amount_is_json_bad_request() {
    let db = common::seeded_db(&[("Alice", "Tokyo", 1000), ("Bob", "Osaka", 200)]);

    for amount in ["3.5", "\"abc\""] {
        let req = Request::builder()
            .method("POST")
            .uri("/transfers")
            .header("content-type", "application/json")
            .body(Body::from(format!(
                r#"{{"from_id":"Alice","to_id":"Bob","amount":{}}}"#,
                amount
            )))
            .unwrap();
        let response = app(&db).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error_code"], "invalid_request");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
    }

    assert_eq!(db.balance("Alice"), Some(1000));
    assert!(db.records().is_empty());
}

#[tokio::test]
async fn test_self_transfer_is_bad_request() {
    let db = common::seeded_db(&[("Alice", "Tokyo", 1000)]);

    let response = app(&db)
        .oneshot(transfer_request("Alice", "Alice", 10))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error_code"], "same_account_transfer");
    assert!(db.records().is_empty());
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let db = common::seeded_db(&[]);

    let req = Request::builder()
        .uri("/accounts/ghost")
        .body(Body::empty())
        .unwrap();
    let response = app(&db).oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error_code"], "account_not_found");
    assert_eq!(body["details"], "ghost");
}
