use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

use urbanfix_common::RiskTier;

use crate::AppState;

#[derive(Deserialize)]
pub struct GroupedQuery {
    risk: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/test", get(api_health))
        .route("/api/risk/grouped", get(api_grouped_issues))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

fn failure(status: StatusCode, message: &str, error: Option<String>) -> Response {
    let mut body = json!({ "success": false, "message": message });
    if let Some(error) = error {
        body["error"] = json!(error);
    }
    (status, Json(body)).into_response()
}

/// Blank or absent `risk` means no filter.
fn parse_tier(raw: Option<&str>) -> Result<Option<RiskTier>, Response> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse::<RiskTier>().map(Some).map_err(|e| {
            failure(
                StatusCode::BAD_REQUEST,
                "Invalid risk level, expected low, moderate or urgent",
                Some(e.to_string()),
            )
        }),
    }
}

pub async fn api_health() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "UrbanFix risk API is running",
        "timestamp": chrono::Utc::now(),
    }))
}

pub async fn api_grouped_issues(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GroupedQuery>,
) -> Response {
    let tier = match parse_tier(params.risk.as_deref()) {
        Ok(tier) => tier,
        Err(response) => return response,
    };

    match state.service.grouped(tier).await {
        Ok(data) => Json(json!({
            "success": true,
            "count": data.len(),
            "data": data,
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to fetch grouped issues");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server Error: Failed to fetch grouped issues with risk",
                Some(e.to_string()),
            )
        }
    }
}
