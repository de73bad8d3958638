use anyhow::Result;

use sitepulse_core::event::Event;
use sitepulse_core::store::{EventQuery, SortOrder};

use crate::DuckDbBackend;

const EVENT_COLUMNS: &str = "id, site, ts, event_type, session_id, visitor_id, \
     url, path, referrer, ua, ip_hash, data";

/// Translate an [`EventQuery`] into SQL and run it.
///
/// Ties on `ts` are broken by insertion order (`seq`) in both directions.
pub async fn query_events_inner(db: &DuckDbBackend, query: &EventQuery) -> Result<Vec<Event>> {
    let conn = db.conn.lock().await;

    let mut filter_sql = String::new();
    let mut params: Vec<Box<dyn duckdb::types::ToSql>> = vec![Box::new(query.site.clone())];
    let mut param_idx = 2;

    if let Some(since_ts) = query.since_ts {
        filter_sql.push_str(&format!(" AND ts >= ?{param_idx}"));
        params.push(Box::new(since_ts));
        param_idx += 1;
    }
    if let Some(ref event_type) = query.event_type {
        filter_sql.push_str(&format!(" AND event_type = ?{param_idx}"));
        params.push(Box::new(event_type.as_str().to_string()));
    }
    if query.require_visitor {
        filter_sql.push_str(" AND visitor_id IS NOT NULL AND visitor_id <> ''");
    }
    if query.require_path {
        filter_sql.push_str(" AND path IS NOT NULL");
    }

    let order_sql = match query.order {
        SortOrder::Ascending => "ts ASC, seq ASC",
        SortOrder::Descending => "ts DESC, seq ASC",
    };
    let limit_sql = match query.limit {
        Some(limit) => format!(" LIMIT {limit}"),
        None => String::new(),
    };

    let sql = format!(
        "SELECT {EVENT_COLUMNS}
         FROM events
         WHERE site = ?1{filter_sql}
         ORDER BY {order_sql}{limit_sql}"
    );

    let param_refs: Vec<&dyn duckdb::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let mapped = stmt.query_map(param_refs.as_slice(), |row| {
        let event_type: String = row.get(3)?;
        Ok(Event {
            id: row.get(0)?,
            site: row.get(1)?,
            ts: row.get(2)?,
            event_type: event_type.into(),
            session_id: row.get(4)?,
            visitor_id: row.get(5)?,
            url: row.get(6)?,
            path: row.get(7)?,
            referrer: row.get(8)?,
            ua: row.get(9)?,
            ip_hash: row.get(10)?,
            data: row.get(11)?,
        })
    })?;

    let mut rows = Vec::new();
    for row in mapped {
        rows.push(row?);
    }
    Ok(rows)
}
