//! Derived statistics over a site's windowed event log.
//!
//! Every metric is a pure function of the events the store returned, so the
//! functions below can be tested without a store. [`compute_stats`] wires them
//! to an [`EventStore`] and is the only entry point that performs I/O.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::device::{DeviceClassifier, DeviceInfo};
use crate::error::StatsError;
use crate::event::Event;
use crate::flow::{build_flow, FlowGraph, FlowLayer};
use crate::recover::{parse_data, parse_title, title_of};
use crate::store::{EventQuery, EventStore};
use crate::window::{hour_bucket, Window};

pub const TOP_PAGES_LIMIT: usize = 20;
pub const VISITORS_LIMIT: usize = 50;
pub const RECENT_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub time: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPage {
    pub path: String,
    pub title: String,
    pub pv: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorProfile {
    #[serde(rename = "visitor_id")]
    pub visitor_id: String,
    #[serde(flatten)]
    pub device: DeviceInfo,
    #[serde(rename = "firstVisit")]
    pub first_ts: i64,
    #[serde(rename = "lastVisit")]
    pub last_ts: i64,
    pub pages_count: u64,
    pub pv_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStats {
    pub device_types: BTreeMap<String, u64>,
    pub os: BTreeMap<String, u64>,
    pub browsers: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEvent {
    pub ts: i64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub path: Option<String>,
    pub title: String,
    /// `data` re-serialized; `"{}"` when the stored text was malformed.
    pub data: String,
    pub visitor_id: Option<String>,
    pub device: String,
    pub browser: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub new_users: u64,
    pub returning_users: u64,
    #[serde(rename = "newUserPV")]
    pub new_user_pv: u64,
    #[serde(rename = "returningUserPV")]
    pub returning_user_pv: u64,
    pub total_users: u64,
    #[serde(rename = "totalPV")]
    pub total_pv: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTrendPoint {
    pub time: String,
    pub new_users: u64,
    pub returning_users: u64,
    pub total_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
    pub pv: u64,
    pub uv: u64,
    pub since_min: i64,
    pub top_pages: Vec<TopPage>,
    pub recent: Vec<RecentEvent>,
    pub visitors: Vec<VisitorProfile>,
    pub device_stats: DeviceStats,
    pub pv_trend: Vec<TrendPoint>,
    pub sankey: FlowGraph,
    pub user_stats: UserStats,
    pub user_trend: Vec<UserTrendPoint>,
}

/// Inputs of one stats computation.
#[derive(Debug, Clone)]
pub struct StatsRequest {
    pub window: Window,
    pub layers: Vec<FlowLayer>,
    /// Zone used for hour buckets.
    pub timezone: Tz,
}

/// Run every derived metric for `request` against `store`.
///
/// Issues three read-only queries (window events, newest events, all-time
/// first visits). The first failing query aborts the whole computation; no
/// partial result is ever returned.
pub async fn compute_stats(
    store: &dyn EventStore,
    request: &StatsRequest,
) -> Result<StatsResult, StatsError> {
    let window = &request.window;
    let site = window.site.as_str();

    let events = store
        .query_events(&EventQuery::site(site).since(window.since_ts))
        .await?;
    let newest = store
        .query_events(
            &EventQuery::site(site)
                .since(window.since_ts)
                .newest_first()
                .limit(RECENT_LIMIT),
        )
        .await?;
    let first_visits = store.first_visits(site, window.since_ts).await?;

    debug!(
        site,
        since_min = window.since_min,
        events = events.len(),
        visitors = first_visits.len(),
        "computing stats"
    );

    let mut devices = DeviceClassifier::new();
    let flow_input = events.iter().filter(|e| e.is_pageview() && e.path.is_some());
    let sankey = build_flow(flow_input, &request.layers, &mut devices);

    Ok(StatsResult {
        pv: pageview_count(&events),
        uv: unique_visitors(&events),
        since_min: window.since_min,
        top_pages: top_pages(&events, TOP_PAGES_LIMIT),
        recent: recent_events(&newest, &mut devices, RECENT_LIMIT),
        visitors: visitor_rollups(&events, &first_visits, &mut devices, VISITORS_LIMIT),
        device_stats: device_stats(&events, &mut devices),
        pv_trend: pv_trend(&events, request.timezone),
        sankey,
        user_stats: user_stats(&events, &first_visits, window.since_ts),
        user_trend: user_trend(&events, &first_visits, window.since_ts, request.timezone),
    })
}

pub fn pageview_count(events: &[Event]) -> u64 {
    events.iter().filter(|e| e.is_pageview()).count() as u64
}

/// Distinct non-empty visitor ids across events of any type.
pub fn unique_visitors(events: &[Event]) -> u64 {
    events
        .iter()
        .filter_map(Event::visitor)
        .collect::<HashSet<_>>()
        .len() as u64
}

/// Pageviews per hour bucket, ascending, without empty buckets.
pub fn pv_trend(events: &[Event], tz: Tz) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for e in events.iter().filter(|e| e.is_pageview()) {
        *buckets.entry(hour_bucket(e.ts, tz)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(time, count)| TrendPoint { time, count })
        .collect()
}

/// Most viewed paths. Ties keep the order in which paths first appear.
pub fn top_pages(events: &[Event], limit: usize) -> Vec<TopPage> {
    struct PathGroup<'a> {
        path: &'a str,
        pv: u64,
        latest: &'a Event,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<PathGroup<'_>> = Vec::new();
    for e in events.iter().filter(|e| e.is_pageview()) {
        let Some(path) = e.path.as_deref() else {
            continue;
        };
        match index.get(path) {
            Some(&i) => {
                let group = &mut groups[i];
                group.pv += 1;
                if e.ts >= group.latest.ts {
                    group.latest = e;
                }
            }
            None => {
                index.insert(path, groups.len());
                groups.push(PathGroup {
                    path,
                    pv: 1,
                    latest: e,
                });
            }
        }
    }

    groups.sort_by(|a, b| b.pv.cmp(&a.pv));
    groups
        .into_iter()
        .take(limit)
        .map(|g| TopPage {
            path: g.path.to_string(),
            title: parse_title(&g.latest.data).into_inner(),
            pv: g.pv,
        })
        .collect()
}

/// Per-visitor rollups ordered by most recent activity.
///
/// `first_ts` is the all-time first visit when `first_visits` knows the
/// visitor, otherwise the earliest event in `events`.
pub fn visitor_rollups(
    events: &[Event],
    first_visits: &HashMap<String, i64>,
    devices: &mut DeviceClassifier,
    limit: usize,
) -> Vec<VisitorProfile> {
    #[derive(Default)]
    struct Rollup<'a> {
        first_ts: i64,
        last_ts: i64,
        paths: HashSet<&'a str>,
        pv_count: u64,
        ua: Option<&'a str>,
    }

    let mut rollups: HashMap<&str, Rollup<'_>> = HashMap::new();
    for e in events {
        let Some(vid) = e.visitor() else { continue };
        let r = rollups.entry(vid).or_insert_with(|| Rollup {
            first_ts: e.ts,
            last_ts: e.ts,
            ..Rollup::default()
        });
        r.first_ts = r.first_ts.min(e.ts);
        r.last_ts = r.last_ts.max(e.ts);
        if let Some(path) = e.path.as_deref() {
            r.paths.insert(path);
        }
        if e.is_pageview() {
            r.pv_count += 1;
        }
        // Representative UA: the greatest value, like SQL MAX(ua).
        if let Some(ua) = e.ua.as_deref() {
            if r.ua.map_or(true, |cur| ua > cur) {
                r.ua = Some(ua);
            }
        }
    }

    let mut ordered: Vec<(&str, Rollup<'_>)> = rollups.into_iter().collect();
    ordered.sort_by(|(a_id, a), (b_id, b)| {
        b.last_ts.cmp(&a.last_ts).then_with(|| a_id.cmp(b_id))
    });
    ordered.truncate(limit);

    ordered
        .into_iter()
        .map(|(vid, r)| VisitorProfile {
            visitor_id: vid.to_string(),
            device: devices.classify(r.ua).value.clone(),
            first_ts: first_visits
                .get(vid)
                .map_or(r.first_ts, |&all_time| all_time.min(r.first_ts)),
            last_ts: r.last_ts,
            pages_count: r.paths.len() as u64,
            pv_count: r.pv_count,
        })
        .collect()
}

/// Frequency tables of device type, OS and browser over pageviews with a UA.
pub fn device_stats(events: &[Event], devices: &mut DeviceClassifier) -> DeviceStats {
    let mut stats = DeviceStats::default();
    for e in events.iter().filter(|e| e.is_pageview()) {
        let Some(ua) = e.ua.as_deref() else { continue };
        let info = &devices.classify(Some(ua)).value;
        *stats.device_types.entry(info.device_type.clone()).or_default() += 1;
        *stats.os.entry(info.os.clone()).or_default() += 1;
        *stats.browsers.entry(info.browser.clone()).or_default() += 1;
    }
    stats
}

/// Annotate the newest events. `newest` must already be ordered by `ts`
/// descending.
pub fn recent_events(
    newest: &[Event],
    devices: &mut DeviceClassifier,
    limit: usize,
) -> Vec<RecentEvent> {
    newest
        .iter()
        .take(limit)
        .map(|e| {
            let data = parse_data(&e.data);
            let title = title_of(&data).into_inner();
            let info = &devices.classify(e.ua.as_deref()).value;
            RecentEvent {
                ts: e.ts,
                event_type: e.event_type.to_string(),
                path: e.path.clone(),
                title,
                data: data.value.to_string(),
                visitor_id: e.visitor_id.clone(),
                device: info.device.clone(),
                browser: info.browser.clone(),
            }
        })
        .collect()
}

/// New vs. returning split of the visitors active in the window.
///
/// A visitor is new iff their all-time first event is inside the window.
pub fn user_stats(
    events: &[Event],
    first_visits: &HashMap<String, i64>,
    since_ts: i64,
) -> UserStats {
    let window_first = first_seen(events);
    let mut pv_by_visitor: HashMap<&str, u64> = HashMap::new();
    for e in events {
        if let Some(vid) = e.visitor() {
            let pv = pv_by_visitor.entry(vid).or_default();
            if e.is_pageview() {
                *pv += 1;
            }
        }
    }

    let mut stats = UserStats::default();
    for (vid, pv) in pv_by_visitor {
        if is_new_visitor(vid, &window_first, first_visits, since_ts) {
            stats.new_users += 1;
            stats.new_user_pv += pv;
        } else {
            stats.returning_users += 1;
            stats.returning_user_pv += pv;
        }
    }
    stats.total_users = stats.new_users + stats.returning_users;
    stats.total_pv = stats.new_user_pv + stats.returning_user_pv;
    stats
}

/// New vs. returning visitors per hour bucket.
///
/// A visitor active in several buckets counts once in each of them.
pub fn user_trend(
    events: &[Event],
    first_visits: &HashMap<String, i64>,
    since_ts: i64,
    tz: Tz,
) -> Vec<UserTrendPoint> {
    let window_first = first_seen(events);
    let mut pairs: HashSet<(String, &str)> = HashSet::new();
    let mut buckets: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for e in events {
        let Some(vid) = e.visitor() else { continue };
        let hour = hour_bucket(e.ts, tz);
        if !pairs.insert((hour.clone(), vid)) {
            continue;
        }
        let (new, returning) = buckets.entry(hour).or_default();
        if is_new_visitor(vid, &window_first, first_visits, since_ts) {
            *new += 1;
        } else {
            *returning += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(time, (new_users, returning_users))| UserTrendPoint {
            time,
            new_users,
            returning_users,
            total_users: new_users + returning_users,
        })
        .collect()
}

fn first_seen(events: &[Event]) -> HashMap<&str, i64> {
    let mut first: HashMap<&str, i64> = HashMap::new();
    for e in events {
        if let Some(vid) = e.visitor() {
            first
                .entry(vid)
                .and_modify(|ts| *ts = (*ts).min(e.ts))
                .or_insert(e.ts);
        }
    }
    first
}

/// All-time first visit decides; the in-window first event only stands in
/// when the store has no history for the visitor.
fn is_new_visitor(
    vid: &str,
    window_first: &HashMap<&str, i64>,
    first_visits: &HashMap<String, i64>,
    since_ts: i64,
) -> bool {
    let first = match (first_visits.get(vid), window_first.get(vid)) {
        (Some(&all_time), Some(&in_window)) => all_time.min(in_window),
        (Some(&all_time), None) => all_time,
        (None, Some(&in_window)) => in_window,
        (None, None) => return false,
    };
    first >= since_ts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::store::MemoryEventStore;
    use crate::window::resolve_window;

    const HOUR: i64 = 3_600_000;
    // 2023-11-14 22:00:00 UTC
    const BASE: i64 = 1_699_999_200_000;

    fn ev(ts: i64, event_type: EventType, visitor: Option<&str>, path: Option<&str>) -> Event {
        Event {
            id: format!("{ts}-{visitor:?}-{path:?}-{event_type}"),
            site: "example.com".to_string(),
            ts,
            event_type,
            session_id: None,
            visitor_id: visitor.map(str::to_string),
            url: None,
            path: path.map(str::to_string),
            referrer: None,
            ua: None,
            ip_hash: String::new(),
            data: "{}".to_string(),
        }
    }

    fn pv(ts: i64, visitor: &str, path: &str) -> Event {
        ev(ts, EventType::Pageview, Some(visitor), Some(path))
    }

    #[test]
    fn pv_counts_only_pageviews() {
        let events = vec![
            pv(BASE, "a", "/"),
            ev(BASE, EventType::Click, Some("a"), Some("/")),
            pv(BASE + 1, "b", "/x"),
        ];
        assert_eq!(pageview_count(&events), 2);
    }

    #[test]
    fn uv_ignores_missing_and_empty_visitors() {
        let events = vec![
            pv(BASE, "a", "/"),
            ev(BASE, EventType::Scroll, Some("a"), None),
            ev(BASE, EventType::Click, Some("b"), None),
            ev(BASE, EventType::Click, None, None),
            ev(BASE, EventType::Click, Some(""), None),
        ];
        assert_eq!(unique_visitors(&events), 2);
        let mut reversed = events.clone();
        reversed.reverse();
        assert_eq!(unique_visitors(&reversed), 2);
    }

    #[test]
    fn pv_trend_is_sparse_ascending_and_sums_to_pv() {
        let events = vec![
            pv(BASE + 3 * HOUR + 10, "a", "/"),
            pv(BASE, "a", "/"),
            pv(BASE + 59 * 60_000, "b", "/"),
            ev(BASE + HOUR, EventType::Click, Some("a"), None),
        ];
        let trend = pv_trend(&events, chrono_tz::UTC);
        assert_eq!(
            trend,
            vec![
                TrendPoint {
                    time: "2023-11-14 22:00:00".to_string(),
                    count: 2
                },
                TrendPoint {
                    time: "2023-11-15 01:00:00".to_string(),
                    count: 1
                },
            ]
        );
        let total: u64 = trend.iter().map(|p| p.count).sum();
        assert_eq!(total, pageview_count(&events));
    }

    #[test]
    fn top_pages_rank_by_count_and_read_latest_title() {
        let mut events = vec![
            pv(BASE, "a", "/first"),
            pv(BASE + 1, "a", "/hot"),
            pv(BASE + 2, "b", "/hot"),
            pv(BASE + 3, "c", "/second"),
        ];
        events[1].data = r#"{"title":"Old"}"#.to_string();
        events[2].data = r#"{"title":"Hot page"}"#.to_string();
        events[3].data = r#"{"title":"trunc"#.to_string();
        events.push(ev(BASE, EventType::Pageview, Some("d"), None));

        let pages = top_pages(&events, TOP_PAGES_LIMIT);
        let paths: Vec<_> = pages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, ["/hot", "/first", "/second"]);
        assert_eq!(pages[0].pv, 2);
        assert_eq!(pages[0].title, "Hot page");
        assert_eq!(pages[2].title, "");
    }

    #[test]
    fn top_pages_never_exceed_limit() {
        let events: Vec<Event> = (0..100)
            .map(|i| pv(BASE + i, "a", &format!("/p{i}")))
            .collect();
        assert_eq!(top_pages(&events, TOP_PAGES_LIMIT).len(), 20);
    }

    #[test]
    fn visitor_rollups_aggregate_per_visitor() {
        let mut events = vec![
            pv(BASE, "a", "/"),
            pv(BASE + 10, "a", "/x"),
            ev(BASE + 20, EventType::Click, Some("a"), Some("/x")),
            pv(BASE + 5, "b", "/"),
        ];
        events[0].ua = Some("???".to_string());
        let mut first_visits = HashMap::new();
        first_visits.insert("a".to_string(), BASE - 10 * HOUR);

        let rollups = visitor_rollups(
            &events,
            &first_visits,
            &mut DeviceClassifier::new(),
            VISITORS_LIMIT,
        );
        assert_eq!(rollups.len(), 2);
        let a = &rollups[0];
        assert_eq!(a.visitor_id, "a");
        assert_eq!(a.first_ts, BASE - 10 * HOUR);
        assert_eq!(a.last_ts, BASE + 20);
        assert_eq!(a.pages_count, 2);
        assert_eq!(a.pv_count, 2);
        assert_eq!(a.device.device, "Desktop");
        let b = &rollups[1];
        assert_eq!(b.first_ts, BASE + 5);
        assert_eq!(b.device.device, "Unknown");
    }

    #[test]
    fn visitor_rollups_never_exceed_limit() {
        let events: Vec<Event> = (0..120)
            .map(|i| pv(BASE + i, &format!("v{i}"), "/"))
            .collect();
        let rollups = visitor_rollups(
            &events,
            &HashMap::new(),
            &mut DeviceClassifier::new(),
            VISITORS_LIMIT,
        );
        assert_eq!(rollups.len(), 50);
        assert_eq!(rollups[0].visitor_id, "v119");
    }

    #[test]
    fn device_stats_skip_events_without_ua() {
        let mut events = vec![pv(BASE, "a", "/"), pv(BASE, "b", "/"), pv(BASE, "c", "/")];
        events[0].ua = Some(String::new());
        events[1].ua = Some("???".to_string());
        let stats = device_stats(&events, &mut DeviceClassifier::new());
        assert_eq!(stats.device_types.get("desktop"), Some(&2));
        assert_eq!(stats.os.get("Unknown"), Some(&2));
        assert_eq!(stats.browsers.get("Unknown"), Some(&2));
    }

    #[test]
    fn recent_events_recover_from_malformed_data() {
        let mut events = vec![pv(BASE + 2, "a", "/"), pv(BASE + 1, "a", "/x")];
        events[0].data = r#"{"title":"Home","x":1}"#.to_string();
        events[1].data = "{broken".to_string();
        let recent = recent_events(&events, &mut DeviceClassifier::new(), RECENT_LIMIT);
        assert_eq!(recent[0].title, "Home");
        assert_eq!(recent[0].event_type, "pageview");
        assert_eq!(recent[1].title, "");
        assert_eq!(recent[1].data, "{}");
        assert_eq!(recent[1].browser, "Unknown");
    }

    #[test]
    fn recent_events_never_exceed_limit() {
        let events: Vec<Event> = (0..80).rev().map(|i| pv(BASE + i, "a", "/")).collect();
        assert_eq!(
            recent_events(&events, &mut DeviceClassifier::new(), RECENT_LIMIT).len(),
            50
        );
    }

    #[test]
    fn returning_visitor_uses_all_time_first_visit() {
        let since = BASE;
        let events = vec![
            pv(BASE + 10, "old", "/"),
            pv(BASE + 20, "old", "/x"),
            pv(BASE + 30, "fresh", "/"),
            ev(BASE + 40, EventType::Click, Some("fresh"), None),
        ];
        let mut first_visits = HashMap::new();
        first_visits.insert("old".to_string(), BASE - 48 * HOUR);
        first_visits.insert("fresh".to_string(), BASE + 30);

        let stats = user_stats(&events, &first_visits, since);
        assert_eq!(stats.new_users, 1);
        assert_eq!(stats.returning_users, 1);
        assert_eq!(stats.new_user_pv, 1);
        assert_eq!(stats.returning_user_pv, 2);
        assert_eq!(stats.total_users, stats.new_users + stats.returning_users);
        assert_eq!(stats.total_pv, 3);
    }

    #[test]
    fn user_trend_counts_visitor_once_per_bucket() {
        let since = BASE;
        let events = vec![
            pv(BASE + 1, "old", "/"),
            pv(BASE + 2, "old", "/x"),
            pv(BASE + HOUR, "old", "/"),
            pv(BASE + HOUR + 5, "fresh", "/"),
        ];
        let mut first_visits = HashMap::new();
        first_visits.insert("old".to_string(), BASE - HOUR);
        first_visits.insert("fresh".to_string(), BASE + HOUR + 5);

        let trend = user_trend(&events, &first_visits, since, chrono_tz::UTC);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].returning_users, 1);
        assert_eq!(trend[0].new_users, 0);
        assert_eq!(trend[1].returning_users, 1);
        assert_eq!(trend[1].new_users, 1);
        assert_eq!(trend[1].total_users, 2);
    }

    #[tokio::test]
    async fn compute_stats_combines_every_metric() {
        let now = BASE + 2 * HOUR;
        let mut history = vec![
            // Outside the window: makes "old" a returning visitor.
            pv(BASE - 72 * HOUR, "old", "/"),
            pv(BASE + 10, "old", "/a"),
            pv(BASE + 20, "new", "/a"),
            ev(BASE + 30, EventType::Click, Some("new"), Some("/a")),
        ];
        history[2].referrer = Some("google".to_string());
        let store = MemoryEventStore::with_events(history);

        let request = StatsRequest {
            window: resolve_window("example.com", Some("180"), 60, now),
            layers: vec![FlowLayer::Referrer, FlowLayer::Path],
            timezone: chrono_tz::UTC,
        };
        let stats = compute_stats(&store, &request).await.expect("stats");

        assert_eq!(stats.pv, 2);
        assert_eq!(stats.uv, 2);
        assert_eq!(stats.since_min, 180);
        assert_eq!(stats.top_pages[0].path, "/a");
        assert_eq!(stats.top_pages[0].pv, 2);
        assert_eq!(stats.recent.len(), 3);
        assert_eq!(stats.recent[0].event_type, "click");
        assert_eq!(stats.user_stats.new_users, 1);
        assert_eq!(stats.user_stats.returning_users, 1);
        assert_eq!(stats.pv_trend.iter().map(|p| p.count).sum::<u64>(), stats.pv);
        assert_eq!(stats.sankey.link_value("Direct", "/a"), Some(1));
        assert_eq!(stats.sankey.link_value("google", "/a"), Some(1));
        let old = stats
            .visitors
            .iter()
            .find(|v| v.visitor_id == "old")
            .expect("old visitor");
        assert_eq!(old.first_ts, BASE - 72 * HOUR);
    }

    #[test]
    fn stats_result_uses_dashboard_field_names() {
        let stats = UserStats {
            new_users: 1,
            returning_users: 2,
            new_user_pv: 3,
            returning_user_pv: 4,
            total_users: 3,
            total_pv: 7,
        };
        let json = serde_json::to_value(&stats).expect("json");
        assert_eq!(json["newUserPV"], 3);
        assert_eq!(json["returningUsers"], 2);
        assert_eq!(json["totalPV"], 7);
    }
}
