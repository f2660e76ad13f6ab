use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use delivery_rates::api::{create_router, ReportService};
use delivery_rates::classifier::StatusClassifier;
use delivery_rates::models::OrderRecord;
use delivery_rates::report::ReportOptions;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    let c = StatusClassifier::default();
    let records = vec![
        OrderRecord::new("0001", "Norte", "Recife", Some("Ana".into()), Some("Assinatura normal".into()), &c),
        OrderRecord::new("0002", "Norte", "Recife", Some("Ana".into()), Some("Na base".into()), &c),
        OrderRecord::new("0003", "Sul", "Olinda", Some("Bia".into()), Some("Assinatura normal".into()), &c),
        OrderRecord::new("0004", "Sul", "Olinda", None, None, &c),
    ];
    create_router(Arc::new(ReportService::from_records(records, ReportOptions::default())))
}

async fn call(method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(Method::GET, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_base_report() {
    let (status, body) = call(Method::GET, "/api/v1/reports/bases").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group_by"], "base");
    assert_eq!(body["total"], 4);
    assert_eq!(body["overall"]["percentage"], 50.0);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["key"], "Norte");
    assert_eq!(rows[0]["at_base"], 1);
    assert_eq!(rows[0]["tier"], "RED");
}

#[tokio::test]
async fn test_courier_report_descending_with_filter() {
    let (status, body) = call(Method::GET, "/api/v1/reports/couriers?order=descending&city=Recife,Olinda").await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&str> = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["Bia", "Ana"]);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_combined_reports() {
    let (status, body) = call(Method::GET, "/api/v1/reports?base=Sul").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"], 2);
    assert_eq!(body["statuses"]["delivered"], 1);
    assert_eq!(body["by_courier"]["total"], 1);
    assert!(body["generated_at"].is_string());
}

#[tokio::test]
async fn test_orders_by_status() {
    let (status, body) = call(Method::GET, "/api/v1/orders?status=AT_BASE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["orders"][0]["order_id"], "0002");
    assert_eq!(body["orders"][0]["status"], "AT_BASE");
}

#[tokio::test]
async fn test_orders_rejects_unknown_status() {
    let (status, body) = call(Method::GET, "/api/v1/orders?status=LOST").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("LOST"));
}

#[tokio::test]
async fn test_reload() {
    let (status, _) = call(Method::POST, "/api/v1/reload").await;
    assert_eq!(status, StatusCode::ACCEPTED);
}
