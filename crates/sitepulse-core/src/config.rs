use chrono_tz::Tz;

use crate::window::{DASHBOARD_DEFAULT_SINCE_MIN, MAX_SINCE_MIN, MIN_SINCE_MIN};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    /// Only this site is accepted by `/collect` and `/stats`; `None` accepts any.
    pub allowed_site: Option<String>,
    pub default_since_min: i64,
    /// Zone used for hour buckets in trends.
    pub timezone: Tz,
    pub duckdb_memory_limit: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("SITEPULSE_PORT")
                .unwrap_or_else(|_| "5555".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("SITEPULSE_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            allowed_site: std::env::var("SITEPULSE_ALLOWED_SITE")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            default_since_min: std::env::var("SITEPULSE_DEFAULT_SINCE_MIN")
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(DASHBOARD_DEFAULT_SINCE_MIN)
                .clamp(MIN_SINCE_MIN, MAX_SINCE_MIN),
            timezone: {
                let raw =
                    std::env::var("SITEPULSE_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
                raw.trim()
                    .parse::<Tz>()
                    .map_err(|e| format!("invalid timezone {raw:?}: {e}"))?
            },
            duckdb_memory_limit: std::env::var("SITEPULSE_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            cors_origins: std::env::var("SITEPULSE_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Whether `site` passes the allow-list.
    pub fn site_allowed(&self, site: &str) -> bool {
        self.allowed_site.as_deref().map_or(true, |allowed| allowed == site)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5555,
            data_dir: "./data".to_string(),
            allowed_site: None,
            default_since_min: DASHBOARD_DEFAULT_SINCE_MIN,
            timezone: chrono_tz::UTC,
            duckdb_memory_limit: "1GB".to_string(),
            cors_origins: Vec::new(),
        }
    }
}
