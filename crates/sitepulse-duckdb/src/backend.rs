use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::{debug, info};

use sitepulse_core::event::Event;

use crate::schema::init_sql;

/// A DuckDB event store for SitePulse.
///
/// DuckDB is single-writer: the connection is wrapped in `Arc<Mutex<_>>` so
/// ingest writes are serialised while the struct stays cheap to share across
/// Axum handlers.
///
/// Memory and thread limits are enforced by [`init_sql`] at open time.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(path, memory_limit, "DuckDB opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database. Data is discarded on drop.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Append one event. A duplicate `id` violates the primary key and errors.
    pub async fn insert_event(&self, event: &Event) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO events (
                id, site, ts, event_type,
                session_id, visitor_id,
                url, path, referrer,
                ua, ip_hash, data
            ) VALUES (
                ?1,  ?2,  ?3,  ?4,
                ?5,  ?6,
                ?7,  ?8,  ?9,
                ?10, ?11, ?12
            )"#,
            duckdb::params![
                event.id,
                event.site,
                event.ts,
                event.event_type.as_str(),
                event.session_id,
                event.visitor_id,
                event.url,
                event.path,
                event.referrer,
                event.ua,
                event.ip_hash,
                event.data,
            ],
        )?;
        debug!(site = %event.site, id = %event.id, "event inserted");
        Ok(())
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    ///
    /// Called by the `/health` endpoint. Errors if the connection is
    /// unavailable (file locked, disk full, etc.).
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Acquire the DuckDB connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
