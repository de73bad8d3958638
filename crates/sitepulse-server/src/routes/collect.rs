use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use sitepulse_core::{
    event::CollectPayload,
    ingest::{ingest, ClientContext},
};

use crate::{error::AppError, state::AppState};

/// `POST /collect`: ingest one tracker event.
///
/// ## Body
/// Parsed as JSON whatever the `Content-Type`: `navigator.sendBeacon` posts
/// `text/plain`. Bodies over 100 KB are rejected with 413.
///
/// ## Validation
/// `site`, `type` and `ts` are required (400 `missing_field` with the field
/// name). When `SITEPULSE_ALLOWED_SITE` is set, any other site is rejected
/// with 403 `site_not_allowed`. Rejected payloads never reach the store.
///
/// ## Enrichment
/// - `ua`: the `User-Agent` header, stored raw and classified at read time.
/// - `ip_hash`: `sha256(ip)[0..8]` as 16 hex chars; the IP itself is never
///   stored.
///
/// ## Response
/// `200 OK` with `{ "ok": true, "id": "<uuid>" }`.
#[tracing::instrument(skip(state, headers, body))]
pub async fn collect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest(e.body_text())
        }
    })?;
    let payload: CollectPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {e}")))?;

    let client = ClientContext {
        ip: extract_client_ip(&headers),
        user_agent: headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let id = ingest(
        state.store.as_ref(),
        payload,
        &client,
        state.config.allowed_site.as_deref(),
    )
    .await?;

    Ok(Json(json!({ "ok": true, "id": id })))
}

/// Client IP from `CF-Connecting-IP`, else the first `X-Forwarded-For` entry.
fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    header("cf-connecting-ip").or_else(|| header("x-forwarded-for"))
}
