//! Defensive readers for untrusted event fields.
//!
//! Parsing here never fails. Each reader returns a [`Recovered`] value that
//! carries either the parsed result or a default, plus a flag recording which
//! one it is.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Recovered<T> {
    pub value: T,
    /// `true` when `value` is a substituted default rather than parsed input.
    pub fell_back: bool,
}

impl<T> Recovered<T> {
    pub fn parsed(value: T) -> Self {
        Self {
            value,
            fell_back: false,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            fell_back: true,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Parse the stored `data` column. Malformed or truncated JSON yields `{}`.
pub fn parse_data(raw: &str) -> Recovered<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Recovered::fallback(empty_object());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Null) => Recovered::fallback(empty_object()),
        Ok(value) => Recovered::parsed(value),
        Err(_) => Recovered::fallback(empty_object()),
    }
}

/// Read `data.title` as a string, `""` when the data is malformed or has no
/// string title.
pub fn title_of(data: &Recovered<Value>) -> Recovered<String> {
    if data.fell_back {
        return Recovered::fallback(String::new());
    }
    match data.value.get("title").and_then(Value::as_str) {
        Some(title) => Recovered::parsed(title.to_string()),
        None => Recovered::fallback(String::new()),
    }
}

/// Shorthand for `title_of(&parse_data(raw))`.
pub fn parse_title(raw: &str) -> Recovered<String> {
    title_of(&parse_data(raw))
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
