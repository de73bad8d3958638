use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The payload the tracker sends to POST /collect.
/// Wire field "type" maps to `event_type`. Every field is optional on the wire
/// so that missing required fields surface as validation errors instead of
/// JSON rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectPayload {
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Client clock in epoch milliseconds. Accepted as a float so trackers that
    /// send `performance`-derived values are not rejected.
    pub ts: Option<f64>,
    pub session_id: Option<String>,
    pub visitor_id: Option<String>,
    pub url: Option<String>,
    pub path: Option<String>,
    pub referrer: Option<String>,
    /// Type-specific object (`{title}` for pageviews, `{depth}` for scroll, ...).
    pub data: Option<serde_json::Value>,
}

/// Event kind. Anything outside the built-in set is kept as a custom event
/// under its own name (`WebsiteTracker.track("signup", ...)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Pageview,
    Click,
    Scroll,
    Duration,
    Custom(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Pageview => "pageview",
            EventType::Click => "click",
            EventType::Scroll => "scroll",
            EventType::Duration => "duration",
            EventType::Custom(name) => name.as_str(),
        }
    }

    pub fn is_pageview(&self) -> bool {
        matches!(self, EventType::Pageview)
    }
}

impl FromStr for EventType {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw {
            "pageview" => EventType::Pageview,
            "click" => EventType::Click,
            "scroll" => EventType::Scroll,
            "duration" => EventType::Duration,
            other => EventType::Custom(other.to_string()),
        })
    }
}

impl From<String> for EventType {
    fn from(raw: String) -> Self {
        match raw.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stored version of an event: mirrors the `events` table columns exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub site: String,
    /// Epoch milliseconds as reported by the client. Monotonic per client only.
    pub ts: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub session_id: Option<String>,
    pub visitor_id: Option<String>,
    pub url: Option<String>,
    pub path: Option<String>,
    pub referrer: Option<String>,
    pub ua: Option<String>,
    /// Truncated SHA-256 of the client IP; empty when the IP was unknown.
    pub ip_hash: String,
    /// Serialized JSON text. May be truncated, so it is not guaranteed to parse.
    pub data: String,
}

impl Event {
    /// Visitor id when present and non-empty.
    pub fn visitor(&self) -> Option<&str> {
        self.visitor_id.as_deref().filter(|v| !v.is_empty())
    }

    pub fn is_pageview(&self) -> bool {
        self.event_type.is_pageview()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_parse_to_their_variant() {
        assert_eq!(EventType::from("pageview".to_string()), EventType::Pageview);
        assert_eq!(EventType::from("scroll".to_string()), EventType::Scroll);
        assert_eq!(EventType::Duration.as_str(), "duration");
    }

    #[test]
    fn unknown_type_is_kept_as_custom_name() {
        let t = EventType::from("signup".to_string());
        assert_eq!(t, EventType::Custom("signup".to_string()));
        assert_eq!(t.to_string(), "signup");
    }

    #[test]
    fn event_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&EventType::Click).expect("serialize");
        assert_eq!(json, "\"click\"");
        let back: EventType = serde_json::from_str("\"custom\"").expect("deserialize");
        assert_eq!(back, EventType::Custom("custom".to_string()));
    }

    #[test]
    fn collect_payload_accepts_missing_fields() {
        let p: CollectPayload =
            serde_json::from_str(r#"{"site":"example.com","ts":1700000000000}"#).expect("parse");
        assert_eq!(p.site.as_deref(), Some("example.com"));
        assert!(p.event_type.is_none());
        assert_eq!(p.ts, Some(1_700_000_000_000.0));
    }
}
