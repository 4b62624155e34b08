// HTTP request handlers
use crate::domain::error::AnalyticsError;
use crate::domain::manufacturer::Manufacturer;
use crate::infrastructure::http_response::{accepts_brotli, error_response, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct DateRangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRangeQuery {
    /// Half-open bounds `[start 00:00, end + 1 day 00:00)` covering the whole
    /// of both days.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if self.end < self.start {
            return None;
        }
        Some((
            self.start.and_hms_opt(0, 0, 0)?,
            self.end.succ_opt()?.and_hms_opt(0, 0, 0)?,
        ))
    }
}

#[derive(Serialize)]
pub struct ManufacturerEntry {
    pub id: String,
    pub name: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List supported manufacturers
pub async fn list_manufacturers() -> Json<Vec<ManufacturerEntry>> {
    Json(
        Manufacturer::ALL
            .iter()
            .map(|m| ManufacturerEntry {
                id: m.slug(),
                name: m.name(),
            })
            .collect(),
    )
}

fn status_for(error: &AnalyticsError) -> StatusCode {
    match error {
        AnalyticsError::NoData { .. } => StatusCode::NOT_FOUND,
        AnalyticsError::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
        AnalyticsError::InsightComputation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the analytics report for one vehicle over a date range
pub async fn vehicle_report(
    Path((manufacturer, vehicle_id)): Path<(String, String)>,
    Query(range): Query<DateRangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let manufacturer: Manufacturer = match manufacturer.parse() {
        Ok(m) => m,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    let vehicle_id = vehicle_id.trim();
    if vehicle_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "vehicle id must not be empty");
    }
    let Some((start, end)) = range.bounds() else {
        return error_response(StatusCode::BAD_REQUEST, "end date precedes start date");
    };

    let compress = accepts_brotli(&headers);

    match state
        .analytics_service
        .analyze(manufacturer, vehicle_id, start, end)
        .await
    {
        Ok(report) => {
            tracing::debug!(
                "Serving report {} with {} insight sentences",
                report.title(),
                report.insights.summary().map_or(0, |s| s.narrative.len())
            );
            match json_response(&report, compress).await {
                Ok(response) => response,
                Err(status) => status.into_response(),
            }
        }
        Err(e) => {
            tracing::warn!("Report for {} {} failed: {}", manufacturer, vehicle_id, e);
            error_response(status_for(&e), &e.to_string())
        }
    }
}
