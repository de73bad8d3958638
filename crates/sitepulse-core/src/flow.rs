//! Multi-layer flow (Sankey) graph over pageview dimensions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::device::DeviceClassifier;
use crate::event::Event;

/// A dimension a pageview can be projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowLayer {
    Referrer,
    DeviceType,
    Os,
    Browser,
    Path,
}

/// Layer order used when the caller supplies no recognizable layer names.
pub const DEFAULT_LAYERS: [FlowLayer; 5] = [
    FlowLayer::Os,
    FlowLayer::Browser,
    FlowLayer::Referrer,
    FlowLayer::DeviceType,
    FlowLayer::Path,
];

impl FlowLayer {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowLayer::Referrer => "referrer",
            FlowLayer::DeviceType => "deviceType",
            FlowLayer::Os => "os",
            FlowLayer::Browser => "browser",
            FlowLayer::Path => "path",
        }
    }

    /// Project `event` onto this dimension.
    pub fn extract(self, event: &Event, devices: &mut DeviceClassifier) -> String {
        match self {
            FlowLayer::Referrer => non_empty(event.referrer.as_deref())
                .unwrap_or("Direct")
                .to_string(),
            FlowLayer::Path => non_empty(event.path.as_deref()).unwrap_or("/").to_string(),
            FlowLayer::DeviceType => {
                let info = &devices.classify(event.ua.as_deref()).value;
                info.device_type.clone()
            }
            FlowLayer::Os => devices.classify(event.ua.as_deref()).value.os.clone(),
            FlowLayer::Browser => {
                let info = &devices.classify(event.ua.as_deref()).value;
                info.browser_name().to_string()
            }
        }
    }
}

impl FromStr for FlowLayer {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "referrer" => Ok(FlowLayer::Referrer),
            "deviceType" => Ok(FlowLayer::DeviceType),
            "os" => Ok(FlowLayer::Os),
            "browser" => Ok(FlowLayer::Browser),
            "path" => Ok(FlowLayer::Path),
            other => Err(format!("unknown flow layer: {other}")),
        }
    }
}

impl fmt::Display for FlowLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma-separated layer list such as `"referrer, path"`.
///
/// Unknown names are dropped. If nothing recognizable remains (or `raw` is
/// absent) the [`DEFAULT_LAYERS`] order is used.
pub fn parse_layers(raw: Option<&str>) -> Vec<FlowLayer> {
    let layers: Vec<FlowLayer> = raw
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    if layers.is_empty() {
        DEFAULT_LAYERS.to_vec()
    } else {
        layers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowNode {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
    pub layers: Vec<FlowLayer>,
}

impl FlowGraph {
    /// Index of the node labelled `label`, if any.
    pub fn node_index(&self, label: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.label == label)
    }

    /// Weight of the link between two labels, if present.
    pub fn link_value(&self, source: &str, target: &str) -> Option<u64> {
        let s = self.node_index(source)?;
        let t = self.node_index(target)?;
        self.links
            .iter()
            .find(|l| l.source == s && l.target == t)
            .map(|l| l.value)
    }
}

/// Build the flow graph for `pageviews` across `layers`.
///
/// Nodes are keyed by label text alone: the same string produced by two
/// different layers is one node. Indices follow layer order, then first-seen
/// order inside a layer. Links appear in the order their (source, target)
/// pair was first counted.
pub fn build_flow<'a, I>(
    pageviews: I,
    layers: &[FlowLayer],
    devices: &mut DeviceClassifier,
) -> FlowGraph
where
    I: IntoIterator<Item = &'a Event>,
{
    let layers: Vec<FlowLayer> = if layers.is_empty() {
        DEFAULT_LAYERS.to_vec()
    } else {
        layers.to_vec()
    };

    // One row of extracted values per pageview, in layer order.
    let rows: Vec<Vec<String>> = pageviews
        .into_iter()
        .map(|pv| layers.iter().map(|l| l.extract(pv, devices)).collect())
        .collect();

    let mut node_index: HashMap<&str, usize> = HashMap::new();
    let mut nodes: Vec<FlowNode> = Vec::new();
    for col in 0..layers.len() {
        for row in &rows {
            let value = row[col].as_str();
            if !node_index.contains_key(value) {
                node_index.insert(value, nodes.len());
                nodes.push(FlowNode {
                    label: value.to_string(),
                });
            }
        }
    }

    let mut link_slots: HashMap<(usize, usize), usize> = HashMap::new();
    let mut links: Vec<FlowLink> = Vec::new();
    for row in &rows {
        for pair in row.windows(2) {
            let (Some(&source), Some(&target)) = (
                node_index.get(pair[0].as_str()),
                node_index.get(pair[1].as_str()),
            ) else {
                continue;
            };
            let slot = *link_slots.entry((source, target)).or_insert_with(|| {
                links.push(FlowLink {
                    source,
                    target,
                    value: 0,
                });
                links.len() - 1
            });
            links[slot].value += 1;
        }
    }

    FlowGraph {
        nodes,
        links,
        layers,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
