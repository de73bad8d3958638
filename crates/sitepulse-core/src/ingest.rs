use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::IngestError;
use crate::event::{CollectPayload, Event, EventType};
use crate::store::EventStore;

pub const MAX_SITE_LEN: usize = 200;
pub const MAX_TYPE_LEN: usize = 50;
pub const MAX_SESSION_ID_LEN: usize = 100;
pub const MAX_VISITOR_ID_LEN: usize = 100;
pub const MAX_URL_LEN: usize = 2000;
pub const MAX_PATH_LEN: usize = 1000;
pub const MAX_REFERRER_LEN: usize = 2000;
pub const MAX_UA_LEN: usize = 400;
pub const MAX_DATA_LEN: usize = 4000;

/// Request metadata the transport extracts before calling [`ingest`].
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Irreversible client address fingerprint: sha256(ip)[0..8] as 16 hex chars.
///
/// An unknown address hashes to the empty string.
pub fn hash_ip(ip: &str) -> String {
    let ip = ip.trim();
    if ip.is_empty() {
        return String::new();
    }
    let hash = Sha256::digest(ip.as_bytes());
    hex::encode(&hash[..8])
}

/// Validate and normalize `payload` into a storable [`Event`].
///
/// Pure: the caller supplies the id so tests can pin it.
pub fn build_event(
    id: String,
    payload: CollectPayload,
    client: &ClientContext,
    allowed_site: Option<&str>,
) -> Result<Event, IngestError> {
    let site = required(payload.site.as_deref(), "site")?;
    let event_type = required(payload.event_type.as_deref(), "type")?;
    let ts = payload
        .ts
        .filter(|ts| ts.is_finite())
        .ok_or(IngestError::MissingField("ts"))?;

    if let Some(allowed) = allowed_site {
        if site != allowed {
            return Err(IngestError::SiteNotAllowed(site.to_string()));
        }
    }

    let data = match payload.data {
        None | Some(serde_json::Value::Null) => "{}".to_string(),
        Some(value) => clamp(&value.to_string(), MAX_DATA_LEN),
    };

    Ok(Event {
        id,
        site: clamp(site, MAX_SITE_LEN),
        // Saturating cast; a float that far out is garbage either way.
        ts: ts.floor() as i64,
        event_type: EventType::from(clamp(event_type, MAX_TYPE_LEN)),
        session_id: optional(payload.session_id, MAX_SESSION_ID_LEN),
        visitor_id: optional(payload.visitor_id, MAX_VISITOR_ID_LEN),
        url: optional(payload.url, MAX_URL_LEN),
        path: optional(payload.path, MAX_PATH_LEN),
        referrer: optional(payload.referrer, MAX_REFERRER_LEN),
        ua: optional(client.user_agent.clone(), MAX_UA_LEN),
        ip_hash: hash_ip(client.ip.as_deref().unwrap_or("")),
        data,
    })
}

/// Validate, store and return the id of one tracker event.
///
/// Validation failures never reach the store.
pub async fn ingest(
    store: &dyn EventStore,
    payload: CollectPayload,
    client: &ClientContext,
    allowed_site: Option<&str>,
) -> Result<String, IngestError> {
    let event = build_event(Uuid::new_v4().to_string(), payload, client, allowed_site)?;

    if let Err(e) = store.insert_event(&event).await {
        warn!(site = %event.site, error = %e, "event insert failed");
        return Err(IngestError::Store(e));
    }

    info!(site = %event.site, event_type = %event.event_type, "event collected");
    Ok(event.id)
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, IngestError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(IngestError::MissingField(field))
}

fn optional(value: Option<String>, max_chars: usize) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(|v| clamp(&v, max_chars))
}

/// Truncate to at most `max_chars` characters, never splitting a code point.
fn clamp(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}
