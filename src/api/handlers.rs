//! REST API handlers for delivery reports
//!
//! These handlers use the shared ReportService.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::ReportService;
use crate::aggregate::{GroupBy, StatusCounts};
use crate::error::ReportError;
use crate::filter::RecordFilter;
use crate::models::{DeliveryStatus, OrderRecord};
use crate::report::{Report, SortOrder};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ReportResponse {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: Report,
}

#[derive(Serialize)]
pub struct ReportsResponse {
    pub generated_at: DateTime<Utc>,
    pub orders: u64,
    pub statuses: StatusCounts,
    pub by_base: Report,
    pub by_courier: Report,
}

#[derive(Serialize)]
pub struct OrdersResponse {
    pub count: usize,
    pub orders: Vec<OrderRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

impl From<ReportError> for ApiError {
    fn from(e: ReportError) -> Self {
        let status = match &e {
            ReportError::Acquisition(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReportError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReportError::Config(_) | ReportError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, e.to_string())
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Filters are comma-separated lists, e.g. `?base=Norte,Sul`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub order: Option<SortOrder>,
    pub base: Option<String>,
    pub courier: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub base: Option<String>,
    pub courier: Option<String>,
    pub city: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn record_filter(base: Option<&str>, courier: Option<&str>, city: Option<&str>) -> RecordFilter {
    RecordFilter::default()
        .with_bases(split_list(base))
        .with_couriers(split_list(courier))
        .with_cities(split_list(city))
}

fn parse_statuses(value: Option<&str>) -> Result<Vec<DeliveryStatus>, ApiError> {
    split_list(value)
        .iter()
        .map(|s| {
            DeliveryStatus::parse(s).ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    format!("Unknown status '{}'. Use DELIVERED, NOT_DELIVERED or AT_BASE.", s),
                )
            })
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<ReportService>;

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/reports
pub async fn get_reports(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ReportsResponse>, ApiError> {
    let filter = record_filter(params.base.as_deref(), params.courier.as_deref(), params.city.as_deref());
    let reports = service.reports(&filter, params.order).await?;
    Ok(Json(ReportsResponse {
        generated_at: Utc::now(),
        orders: reports.orders,
        statuses: reports.statuses,
        by_base: reports.by_base,
        by_courier: reports.by_courier,
    }))
}

async fn grouped_report(service: &ReportService, params: ReportQuery, group_by: GroupBy) -> Result<Json<ReportResponse>, ApiError> {
    let filter = record_filter(params.base.as_deref(), params.courier.as_deref(), params.city.as_deref());
    let reports = service.reports(&filter, params.order).await?;
    let report = match group_by {
        GroupBy::Base => reports.by_base,
        GroupBy::Courier => reports.by_courier,
    };
    Ok(Json(ReportResponse {
        generated_at: Utc::now(),
        report,
    }))
}

/// GET /api/v1/reports/bases
pub async fn get_base_report(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    grouped_report(&service, params, GroupBy::Base).await
}

/// GET /api/v1/reports/couriers
pub async fn get_courier_report(
    State(service): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    grouped_report(&service, params, GroupBy::Courier).await
}

/// GET /api/v1/orders
pub async fn get_orders(
    State(service): State<AppState>,
    Query(params): Query<OrdersQuery>,
) -> Result<Json<OrdersResponse>, ApiError> {
    let statuses = parse_statuses(params.status.as_deref())?;
    let filter = record_filter(params.base.as_deref(), params.courier.as_deref(), params.city.as_deref())
        .with_statuses(statuses);
    let orders = service.orders(&filter, params.limit).await?;
    Ok(Json(OrdersResponse {
        count: orders.len(),
        orders,
    }))
}

/// POST /api/v1/reload
pub async fn reload(State(service): State<AppState>) -> impl IntoResponse {
    service.reload().await;
    (StatusCode::ACCEPTED, Json(serde_json::json!({"status": "reloading"})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("Norte, Sul,,")), vec!["Norte", "Sul"]);
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_parse_statuses() {
        let statuses = parse_statuses(Some("delivered,AT_BASE")).unwrap();
        assert_eq!(statuses, vec![DeliveryStatus::Delivered, DeliveryStatus::AtBase]);

        let (status, _) = parse_statuses(Some("lost")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_status_mapping() {
        let (status, _): ApiError = ReportError::Acquisition("timeout".into()).into();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let (status, _): ApiError = ReportError::MissingField("Pedido".into()).into();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
