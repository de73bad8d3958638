//! Event store abstraction.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::event::{Event, EventType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter, ordering and limit for [`EventStore::query_events`].
///
/// Results are always ordered by `ts`; ties keep whatever order the store
/// returns them in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventQuery {
    pub site: String,
    /// Inclusive lower bound; `None` scans the site's whole history.
    pub since_ts: Option<i64>,
    pub event_type: Option<EventType>,
    /// Only events with a non-empty `visitor_id`.
    pub require_visitor: bool,
    /// Only events with a non-null `path`.
    pub require_path: bool,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl EventQuery {
    pub fn site(site: &str) -> Self {
        Self {
            site: site.to_string(),
            ..Self::default()
        }
    }

    pub fn since(mut self, since_ts: i64) -> Self {
        self.since_ts = Some(since_ts);
        self
    }

    pub fn of_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn with_visitor(mut self) -> Self {
        self.require_visitor = true;
        self
    }

    pub fn with_path(mut self) -> Self {
        self.require_path = true;
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Row predicate equivalent to the query's WHERE clause.
    pub fn matches(&self, event: &Event) -> bool {
        event.site == self.site
            && self.since_ts.map_or(true, |since| event.ts >= since)
            && self
                .event_type
                .as_ref()
                .map_or(true, |t| &event.event_type == t)
            && (!self.require_visitor || event.visitor().is_some())
            && (!self.require_path || event.path.is_some())
    }
}

/// Append-only event log queried by the aggregation engine.
///
/// Implementations must be safe to share across request handlers. The stats
/// path only ever reads.
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    async fn insert_event(&self, event: &Event) -> anyhow::Result<()>;

    async fn query_events(&self, query: &EventQuery) -> anyhow::Result<Vec<Event>>;

    /// All-time earliest `ts` for every visitor of `site` that has at least one
    /// event at or after `since_ts`.
    ///
    /// The default implementation scans the site's full history; backends
    /// with a query engine should answer it with a single grouped query.
    async fn first_visits(
        &self,
        site: &str,
        since_ts: i64,
    ) -> anyhow::Result<HashMap<String, i64>> {
        let history = self
            .query_events(&EventQuery::site(site).with_visitor())
            .await?;
        let mut first: HashMap<String, i64> = HashMap::new();
        let mut active = HashSet::new();
        for event in &history {
            let Some(vid) = event.visitor() else { continue };
            first
                .entry(vid.to_string())
                .and_modify(|ts| *ts = (*ts).min(event.ts))
                .or_insert(event.ts);
            if event.ts >= since_ts {
                active.insert(vid);
            }
        }
        first.retain(|vid, _| active.contains(vid.as_str()));
        Ok(first)
    }

    /// Lightweight liveness check.
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// In-process event store backed by a `Vec`.
///
/// Used by tests and by embedders that do not need persistence. Insertion
/// order is the tie-breaker for events with equal timestamps.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert_event(&self, event: &Event) -> anyhow::Result<()> {
        let mut events = self.events.write().await;
        if events.iter().any(|e| e.id == event.id) {
            anyhow::bail!("duplicate event id {}", event.id);
        }
        events.push(event.clone());
        Ok(())
    }

    async fn query_events(&self, query: &EventQuery) -> anyhow::Result<Vec<Event>> {
        let events = self.events.read().await;
        let mut rows: Vec<Event> = events
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        // Stable sorts keep insertion order among equal timestamps.
        match query.order {
            SortOrder::Ascending => rows.sort_by_key(|e| e.ts),
            SortOrder::Descending => rows.sort_by(|a, b| b.ts.cmp(&a.ts)),
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}
