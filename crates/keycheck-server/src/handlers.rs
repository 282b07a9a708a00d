use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    validator::{render, LicenseRequest},
    AppState,
};

// ── Health ────────────────────────────────────────────────────────────────────

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// ── Validate ──────────────────────────────────────────────────────────────────

pub async fn validate_license(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let key = query.as_deref().and_then(key_param);
    let referer = header_value(&headers, header::REFERER);
    let origin = header_value(&headers, header::ORIGIN);

    let req = LicenseRequest {
        key: key.as_deref(),
        referer: referer.as_deref(),
        origin: origin.as_deref(),
        now: Utc::now(),
    };

    let result = state.validator.validate(&req).await;
    let (status, body) = render(&result);
    (status, Json(body)).into_response()
}

/// CORS preflight. Answered before any validation logic runs.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// First `key` parameter in the query string. Repeated parameters are not
/// an error; later occurrences are ignored.
fn key_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned())
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_param_decodes_and_takes_first() {
        assert_eq!(key_param("key=QTC%2D1&x=2").as_deref(), Some("QTC-1"));
        assert_eq!(key_param("key=a&key=b").as_deref(), Some("a"));
        assert_eq!(key_param("key=").as_deref(), Some(""));
        assert_eq!(key_param("other=1"), None);
    }
}
