use std::collections::HashMap;

use anyhow::Result;

use crate::DuckDbBackend;

/// All-time first `ts` of every visitor active in `[since_ts, ∞)`.
///
/// One grouped query: the CTE narrows the visitor set to the window before
/// the history scan, and `idx_events_site_visitor_ts` serves the MIN.
pub async fn first_visits_inner(
    db: &DuckDbBackend,
    site: &str,
    since_ts: i64,
) -> Result<HashMap<String, i64>> {
    let conn = db.conn.lock().await;

    let sql = r#"
        WITH active AS (
            SELECT DISTINCT visitor_id
            FROM events
            WHERE site = ?1
              AND ts >= ?2
              AND visitor_id IS NOT NULL
              AND visitor_id <> ''
        )
        SELECT e.visitor_id, MIN(e.ts) AS first_ts
        FROM events e
        JOIN active a ON a.visitor_id = e.visitor_id
        WHERE e.site = ?3
        GROUP BY e.visitor_id
    "#;

    let mut stmt = conn.prepare(sql)?;
    let mapped = stmt.query_map(duckdb::params![site, since_ts, site], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut first = HashMap::new();
    for row in mapped {
        let (visitor_id, ts) = row?;
        first.insert(visitor_id, ts);
    }
    Ok(first)
}
