use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use sitepulse_core::{
    aggregate::{compute_stats, StatsRequest},
    flow::parse_layers,
    window::resolve_window,
};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub site: Option<String>,
    /// Kept as text: non-numeric values fall back to the configured default.
    #[serde(rename = "sinceMin")]
    pub since_min: Option<String>,
    /// Comma-separated flow layers, e.g. `referrer,path`.
    #[serde(rename = "sankeyLayers")]
    pub sankey_layers: Option<String>,
}

/// `GET /stats`: every dashboard metric for one site and window.
///
/// `site` defaults to `SITEPULSE_ALLOWED_SITE`. A store failure yields a
/// generic 500; partial results are never returned.
#[tracing::instrument(skip(state))]
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let site = query
        .site
        .filter(|s| !s.is_empty())
        .or_else(|| state.config.allowed_site.clone())
        .ok_or(AppError::MissingField("site"))?;
    if !state.config.site_allowed(&site) {
        return Err(AppError::SiteNotAllowed(site));
    }

    let request = StatsRequest {
        window: resolve_window(
            &site,
            query.since_min.as_deref(),
            state.config.default_since_min,
            Utc::now().timestamp_millis(),
        ),
        layers: parse_layers(query.sankey_layers.as_deref()),
        timezone: state.config.timezone,
    };

    let result = compute_stats(state.store.as_ref(), &request).await?;
    tracing::info!(
        site = %site,
        since_min = result.since_min,
        pv = result.pv,
        uv = result.uv,
        "stats computed"
    );
    Ok(Json(result))
}
