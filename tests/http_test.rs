mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use offerdesk_backend::auth::jwt::sign_token;
use offerdesk_backend::config::CopyMode;
use offerdesk_backend::routes::build_app;

fn app() -> Router {
    build_app(test_app(CopyMode::BestEffort).state)
}

fn bearer(tenant_id: i64) -> String {
    format!("Bearer {}", sign_token(tenant_id, SECRET, Duration::hours(1)).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, tenant_id: Option<i64>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(id) = tenant_id {
        req = req.header(header::AUTHORIZATION, bearer(id));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn draft_body(grand_total: f64) -> Value {
    json!({
        "draftName": "Weekly shrimp",
        "fromParty": "Ocean Fresh Exports",
        "origin": "Vietnam",
        "plantApprovalNumber": "DL-123",
        "brand": "SeaStar",
        "grandTotal": grand_total,
        "products": [
            {
                "productId": 7,
                "productName": "White Shrimp HLSO",
                "species": "Vannamei",
                "sizeBreakups": [
                    { "size": "16/20", "breakup": 10, "price": 8.5 },
                    { "size": "21/25", "breakup": 5, "price": 7.75 }
                ]
            },
            {
                "productId": 8,
                "productName": "Squid Tubes",
                "species": "Loligo",
                "sizeBreakups": [ { "size": "U5", "breakup": 3, "price": 4.1 } ]
            }
        ]
    })
}

#[tokio::test]
async fn requests_without_a_valid_token_are_rejected() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/offer-drafts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let req = Request::builder()
        .uri("/offers")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_needs_no_token() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn draft_lifecycle_over_http() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/offer-drafts", Some(1), Some(draft_body(18.0))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["grandTotal"], json!(18.0));
    assert_eq!(body["data"]["products"][1]["sizeBreakups"][0]["price"], json!(4.1));
    assert_no_nulls(&body);
    let no = body["data"]["draftNo"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/offer-drafts/{no}"), Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["draftName"], "Weekly shrimp");

    let (status, _) = send(&app, Method::GET, &format!("/offer-drafts/{no}"), Some(2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/offer-drafts/{no}"),
        Some(1),
        Some(json!({ "remark": "Net weight" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["remark"], "Net weight");

    let (status, body) = send(&app, Method::GET, "/offer-drafts?productName=squid&limit=5", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["limit"], 5);
    assert_eq!(body["data"]["totalPages"], 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/offer-drafts/{no}"), Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::GET, &format!("/offer-drafts/{no}"), Some(1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Offer draft not found" }));
}

#[tokio::test]
async fn failures_map_to_status_codes_and_envelopes() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/offer-drafts", Some(1), Some(draft_body(17.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Sum of size breakups (18) does not match grand total (17)");

    let mut structural = draft_body(18.0);
    structural["products"][1].as_object_mut().unwrap().remove("sizeBreakups");
    let (status, body) = send(&app, Method::POST, "/offer-drafts", Some(1), Some(structural)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Squid Tubes"));

    let (status, body) = send(&app, Method::GET, "/offer-drafts/not-a-number", Some(1), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/offer-drafts")
        .header(header::AUTHORIZATION, bearer(1))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn promotion_over_http() {
    let app = app();

    let (status, buyer) = send(
        &app,
        Method::POST,
        "/buyers",
        Some(1),
        Some(json!({ "companyName": "Nordic Seafood ApS", "email": "buy@nordic.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(buyer["data"]["status"], "active");
    let buyer_id = buyer["data"]["id"].as_i64().unwrap();

    let (_, draft) = send(&app, Method::POST, "/offer-drafts", Some(1), Some(draft_body(18.0))).await;
    let no = draft["data"]["draftNo"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/offer-drafts/{no}/promote"),
        Some(1),
        Some(json!({ "buyerId": buyer_id, "offerName": "Week 12", "destination": "Aarhus" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["draftSource"], "persisted");
    assert_eq!(body["data"]["skippedItems"], 0);
    assert_eq!(body["data"]["offer"]["status"], "open");
    assert_eq!(body["data"]["offer"]["buyer"]["companyName"], "Nordic Seafood ApS");
    let offer_id = body["data"]["offer"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/offer-drafts/987654/promote",
        Some(1),
        Some(json!({ "buyerId": buyer_id, "offerName": "Fallback", "destination": "Oslo", "fromParty": "Acme", "grandTotal": 500 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["draftSource"], "synthesized");
    assert_eq!(body["data"]["offer"]["fromParty"], "Acme");
    assert_eq!(body["data"]["offer"]["grandTotal"], json!(500.0));

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/offer-drafts/{no}/promote"),
        Some(2),
        Some(json!({ "buyerId": buyer_id, "offerName": "Stolen", "destination": "Nowhere" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/offers/{offer_id}"),
        Some(1),
        Some(json!({ "status": "close" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "close");

    let (status, body) = send(&app, Method::GET, "/offers?status=close", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = send(&app, Method::GET, "/buyers", Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
