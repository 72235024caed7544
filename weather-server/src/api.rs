//! HTTP handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, Uri},
};
use chrono::NaiveDate;
use serde::Serialize;
use weather_core::ResolutionResult;

use crate::AppState;
use crate::envelope::ApiResponse;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// GET /api/weather/:postal_code/:date
pub async fn get_weather(
    State(state): State<AppState>,
    Path((postal_code, date)): Path<(String, String)>,
) -> ApiResponse<ResolutionResult> {
    let Some(date) = parse_date(&date) else {
        return ApiResponse::error(StatusCode::BAD_REQUEST.as_u16(), "Invalid date format")
            .with_error("date", "Invalid date format. Use YYYY-MM-DD.");
    };

    match state.resolver.resolve(&postal_code, date).await {
        Ok(result) => ApiResponse::ok("Weather data retrieved successfully", result),
        Err(err) => {
            let detail = err.to_string();
            ApiResponse::error(err.status_code(), format!("Error when accessing API: {detail}"))
                .with_error("api", detail)
        }
    }
}

/// Strict `YYYY-MM-DD`; chrono alone would also accept unpadded fields.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).ok()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Any unmatched path.
pub async fn not_found(uri: Uri) -> ApiResponse<()> {
    let response = ApiResponse::error(StatusCode::NOT_FOUND.as_u16(), "Resource not found");

    if is_unprefixed_weather_path(uri.path()) {
        return ApiResponse {
            message: "Invalid API path".to_string(),
            ..response
        }
        .with_error(
            "path",
            "Please use '/api/weather/' instead of '/weather/' for weather data requests.",
        );
    }

    response.with_error("path", "Please check the URL and try again.")
}

/// Matches `/weather/<digits>/<YYYY-MM-DD>`.
fn is_unprefixed_weather_path(path: &str) -> bool {
    let mut segments = path.trim_start_matches('/').split('/');

    let (Some("weather"), Some(code), Some(date), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return false;
    };

    let date_shaped = date.len() == 10
        && date.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });

    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) && date_shaped
}
