use std::collections::HashMap;

use serde::Serialize;

use crate::recover::Recovered;

const UNKNOWN: &str = "Unknown";

/// Device fields derived from a `User-Agent` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Hardware model when the UA names one, else the device type, else "Desktop".
    pub device: String,
    pub device_type: String,
    /// "<name> <version>", or just the name when no version is known.
    pub os: String,
    pub browser: String,
}

impl DeviceInfo {
    fn unknown(device: &str) -> Self {
        Self {
            device: device.to_string(),
            device_type: "desktop".to_string(),
            os: UNKNOWN.to_string(),
            browser: UNKNOWN.to_string(),
        }
    }

    /// Browser name without its version (text before the first space).
    pub fn browser_name(&self) -> &str {
        match self.browser.split(' ').next() {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN,
        }
    }
}

/// Parse a `User-Agent` string via the `woothee` crate.
///
/// An empty UA yields the all-"Unknown" record. A UA that woothee cannot
/// place at all yields a desktop record with unknown OS and browser. Both are
/// flagged as fallbacks.
pub fn classify(user_agent: &str) -> Recovered<DeviceInfo> {
    let user_agent = user_agent.trim();
    if user_agent.is_empty() {
        return Recovered::fallback(DeviceInfo::unknown(UNKNOWN));
    }

    let Some(result) = woothee::parser::Parser::new().parse(user_agent) else {
        return Recovered::fallback(DeviceInfo::unknown("Desktop"));
    };

    let os_raw = known(result.os);
    let browser_raw = known(result.name);
    if os_raw.is_none() && browser_raw.is_none() {
        return Recovered::fallback(DeviceInfo::unknown("Desktop"));
    }

    // woothee reports Apple handhelds as the OS name; those are really models.
    let model = os_raw.filter(|os| matches!(*os, "iPhone" | "iPad" | "iPod"));

    // woothee `category` maps to our device_type convention:
    //   "smartphone" / "mobilephone" → "mobile" (iPad → "tablet")
    //   everything else              → "desktop"
    let device_type = match (result.category, model) {
        (_, Some("iPad")) => "tablet",
        ("smartphone" | "mobilephone", _) => "mobile",
        _ => "desktop",
    };

    let device = match model {
        Some(m) => m.to_string(),
        None if device_type != "desktop" => device_type.to_string(),
        None => "Desktop".to_string(),
    };

    let os_name = if model.is_some() {
        Some("iOS")
    } else {
        os_raw
    };
    let os_version = result.os_version.to_string();

    Recovered::parsed(DeviceInfo {
        device,
        device_type: device_type.to_string(),
        os: join_name_version(os_name, known(&os_version)),
        browser: join_name_version(browser_raw, known(result.version)),
    })
}

/// Request-scoped memo for [`classify`].
///
/// Stats requests classify the same handful of UA strings thousands of times;
/// the cache lives only as long as one request.
#[derive(Debug, Default)]
pub struct DeviceClassifier {
    cache: HashMap<String, Recovered<DeviceInfo>>,
}

impl DeviceClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, user_agent: Option<&str>) -> &Recovered<DeviceInfo> {
        let ua = user_agent.unwrap_or("");
        self.cache
            .entry(ua.to_string())
            .or_insert_with(|| classify(ua))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// woothee returns "UNKNOWN" (or an empty string) for unknown values.
fn known(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(trimmed)
    }
}

fn join_name_version(name: Option<&str>, version: Option<&str>) -> String {
    format!("{} {}", name.unwrap_or(UNKNOWN), version.unwrap_or(""))
        .trim()
        .to_string()
}
