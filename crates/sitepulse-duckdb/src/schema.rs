/// DuckDB initialization SQL.
///
/// Executed once at open time via `Connection::execute_batch`. Every
/// statement uses `IF NOT EXISTS`, so it is safe to re-run on each startup.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `SITEPULSE_DUCKDB_MEMORY`, default `"1GB"`). The DuckDB default of
/// 80% of system RAM is not acceptable for a server process, so a limit is
/// always set.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- Insertion order, used to break ties between equal timestamps.
CREATE SEQUENCE IF NOT EXISTS events_seq START 1;

-- ===========================================
-- EVENTS (append-only, one row per tracker event)
-- ===========================================
CREATE TABLE IF NOT EXISTS events (
    id              VARCHAR PRIMARY KEY,           -- UUID v4
    seq             BIGINT NOT NULL DEFAULT nextval('events_seq'),
    site            VARCHAR NOT NULL,
    ts              BIGINT NOT NULL,               -- client clock, epoch ms
    event_type      VARCHAR NOT NULL,              -- pageview | click | scroll | duration | custom
    session_id      VARCHAR,
    visitor_id      VARCHAR,
    url             VARCHAR,
    path            VARCHAR,
    referrer        VARCHAR,
    ua              VARCHAR,
    ip_hash         VARCHAR NOT NULL DEFAULT '',   -- sha256(ip)[0..8] hex, '' when unknown
    data            VARCHAR NOT NULL DEFAULT '{{}}' -- untrusted JSON text, may be malformed
);
-- Window scans: every stats query filters on (site, ts).
CREATE INDEX IF NOT EXISTS idx_events_site_ts
    ON events(site, ts);
-- All-time first visit lookup.
CREATE INDEX IF NOT EXISTS idx_events_site_visitor_ts
    ON events(site, visitor_id, ts);
"#
    )
}
