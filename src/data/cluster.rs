//! The per-cycle cluster view handed to the presentation layer.

use std::time::Instant;

use super::aggregate::NodeTotals;
use super::rate::ChannelMetric;
use crate::cluster::Node;

/// Depth thresholds for coloring channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Depth at which a channel is shown as a warning.
    pub depth_warning: u64,
    /// Depth at which a channel is shown as critical.
    pub depth_critical: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            depth_warning: 100,
            depth_critical: 1000,
        }
    }
}

impl Thresholds {
    pub fn status_for_depth(&self, depth: u64) -> HealthStatus {
        if depth >= self.depth_critical {
            HealthStatus::Critical
        } else if depth >= self.depth_warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Severity of a channel's backlog, ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// A discovered node and, if it answered this cycle, its totals.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSummary {
    pub node: Node,
    pub totals: Option<NodeTotals>,
}

impl NodeSummary {
    pub fn is_reporting(&self) -> bool {
        self.totals.is_some()
    }
}

/// Everything the dashboard shows for one completed cycle.
///
/// Values are published whole; readers never see a cycle in progress.
#[derive(Debug, Clone)]
pub struct ClusterData {
    /// Channels by descending depth.
    pub channels: Vec<ChannelMetric>,
    pub total_depth: u64,
    pub total_in_flight: u64,
    pub nodes: Vec<NodeSummary>,
    /// Total in-flight samples, oldest first.
    pub trend: Vec<u64>,
    /// Registry base URLs that were polled.
    pub registries: Vec<String>,
    /// Cluster-level error from the latest cycle, if it failed.
    pub error: Option<String>,
    /// Number of completed cycles, successful or not.
    pub cycle: u64,
    /// When the displayed channel data was sampled.
    pub last_updated: Instant,
}

impl ClusterData {
    /// Placeholder published when the very first cycle fails.
    pub fn empty(registries: Vec<String>) -> Self {
        Self {
            channels: Vec::new(),
            total_depth: 0,
            total_in_flight: 0,
            nodes: Vec::new(),
            trend: Vec::new(),
            registries,
            error: None,
            cycle: 0,
            last_updated: Instant::now(),
        }
    }

    pub fn reporting_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_reporting()).count()
    }

    /// Count of channels per health status: (healthy, warning, critical).
    pub fn status_counts(&self, thresholds: &Thresholds) -> (usize, usize, usize) {
        self.channels.iter().fold((0, 0, 0), |(ok, warn, crit), m| {
            match thresholds.status_for_depth(m.snapshot.depth) {
                HealthStatus::Healthy => (ok + 1, warn, crit),
                HealthStatus::Warning => (ok, warn + 1, crit),
                HealthStatus::Critical => (ok, warn, crit + 1),
            }
        })
    }

    /// Export the cycle as a JSON document.
    pub fn to_json(&self) -> serde_json::Value {
        let channels: Vec<serde_json::Value> = self
            .channels
            .iter()
            .map(|m| {
                serde_json::json!({
                    "topic": m.snapshot.key.topic,
                    "channel": m.snapshot.key.channel,
                    "depth": m.snapshot.depth,
                    "in_flight": m.snapshot.in_flight,
                    "message_count": m.snapshot.message_count,
                    "nodes": m.snapshot.node_count,
                    "rate_per_second": m.rate.map(|r| r.per_second),
                    "rate_per_minute": m.rate.map(|r| r.per_minute),
                })
            })
            .collect();

        let nodes: Vec<serde_json::Value> = self
            .nodes
            .iter()
            .map(|n| {
                serde_json::json!({
                    "address": n.node.address,
                    "port": n.node.port,
                    "reporting": n.is_reporting(),
                    "topics": n.totals.map(|t| t.topics),
                    "channels": n.totals.map(|t| t.channels),
                    "depth": n.totals.map(|t| t.depth),
                    "in_flight": n.totals.map(|t| t.in_flight),
                })
            })
            .collect();

        serde_json::json!({
            "summary": {
                "total_depth": self.total_depth,
                "total_in_flight": self.total_in_flight,
                "channels": self.channels.len(),
                "nodes": self.nodes.len(),
                "reporting_nodes": self.reporting_nodes(),
                "registries": self.registries,
                "cycle": self.cycle,
                "error": self.error,
            },
            "channels": channels,
            "nodes": nodes,
            "trend": self.trend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChannelKey, ChannelSnapshot, Rate};

    fn metric(channel: &str, depth: u64, rate: Option<Rate>) -> ChannelMetric {
        ChannelMetric {
            snapshot: ChannelSnapshot {
                key: ChannelKey::new("orders", channel),
                depth,
                in_flight: 1,
                message_count: 42,
                node_count: 1,
            },
            rate,
        }
    }

    #[test]
    fn test_threshold_boundaries() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.status_for_depth(0), HealthStatus::Healthy);
        assert_eq!(thresholds.status_for_depth(99), HealthStatus::Healthy);
        assert_eq!(thresholds.status_for_depth(100), HealthStatus::Warning);
        assert_eq!(thresholds.status_for_depth(999), HealthStatus::Warning);
        assert_eq!(thresholds.status_for_depth(1000), HealthStatus::Critical);
        assert!(HealthStatus::Healthy < HealthStatus::Warning);
        assert!(HealthStatus::Warning < HealthStatus::Critical);
    }

    #[test]
    fn test_status_counts() {
        let mut data = ClusterData::empty(vec![]);
        data.channels = vec![metric("a", 5000, None), metric("b", 150, None), metric("c", 1, None)];
        assert_eq!(data.status_counts(&Thresholds::default()), (1, 1, 1));
    }

    #[test]
    fn test_to_json() {
        let mut data = ClusterData::empty(vec!["http://lookupd:4161".to_string()]);
        data.channels = vec![metric(
            "email",
            10,
            Some(Rate {
                per_second: 2.0,
                per_minute: 120.0,
            }),
        )];
        data.nodes = vec![
            NodeSummary {
                node: Node::new("nsqd-1", 4151),
                totals: Some(NodeTotals {
                    topics: 1,
                    channels: 1,
                    depth: 10,
                    in_flight: 1,
                }),
            },
            NodeSummary {
                node: Node::new("nsqd-2", 4151),
                totals: None,
            },
        ];

        let json = data.to_json();
        assert_eq!(json["summary"]["reporting_nodes"], 1);
        assert_eq!(json["channels"][0]["channel"], "email");
        assert_eq!(json["channels"][0]["rate_per_minute"], 120.0);
        assert_eq!(json["nodes"][1]["reporting"], false);
        assert!(json["nodes"][1]["depth"].is_null());
    }
}
