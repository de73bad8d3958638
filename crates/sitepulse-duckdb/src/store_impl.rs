use std::collections::HashMap;

use async_trait::async_trait;

use sitepulse_core::event::Event;
use sitepulse_core::store::{EventQuery, EventStore};

use crate::DuckDbBackend;

#[async_trait]
impl EventStore for DuckDbBackend {
    async fn insert_event(&self, event: &Event) -> anyhow::Result<()> {
        DuckDbBackend::insert_event(self, event).await
    }

    async fn query_events(&self, query: &EventQuery) -> anyhow::Result<Vec<Event>> {
        crate::queries::events::query_events_inner(self, query).await
    }

    async fn first_visits(
        &self,
        site: &str,
        since_ts: i64,
    ) -> anyhow::Result<HashMap<String, i64>> {
        crate::queries::first_visits::first_visits_inner(self, site, since_ts).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        DuckDbBackend::ping(self).await
    }
}
