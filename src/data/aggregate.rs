//! Cluster-wide aggregation of per-node channel statistics.

use std::collections::HashMap;
use std::fmt;

use crate::cluster::StatsPayload;

/// Identity of a channel across the cluster.
///
/// Matching is exact: `Orders/email` and `orders/email` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelKey {
    pub topic: String,
    pub channel: String,
}

impl ChannelKey {
    pub fn new(topic: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.topic, self.channel)
    }
}

/// One channel summed over every node that reported it this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub key: ChannelKey,
    /// Live queue depth plus backend (disk) depth.
    pub depth: u64,
    pub in_flight: u64,
    /// Cumulative messages seen by the channel since each node started.
    pub message_count: u64,
    /// Number of nodes that reported this channel.
    pub node_count: usize,
}

impl ChannelSnapshot {
    fn empty(key: ChannelKey) -> Self {
        Self {
            key,
            depth: 0,
            in_flight: 0,
            message_count: 0,
            node_count: 0,
        }
    }
}

/// Result of aggregating one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// Channels sorted by descending depth; ties keep first-seen order.
    pub channels: Vec<ChannelSnapshot>,
    pub total_depth: u64,
    pub total_in_flight: u64,
}

/// Accumulates node payloads into per-channel totals.
#[derive(Debug, Default)]
pub struct Aggregator {
    index: HashMap<ChannelKey, usize>,
    channels: Vec<ChannelSnapshot>,
    total_depth: u64,
    total_in_flight: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one node's payload into the running totals.
    pub fn add(&mut self, payload: &StatsPayload) -> &mut Self {
        for topic in &payload.topics {
            for channel in &topic.channels {
                let key = ChannelKey::new(topic.topic_name.as_str(), channel.channel_name.as_str());
                let slot = match self.index.get(&key) {
                    Some(&slot) => slot,
                    None => {
                        self.index.insert(key.clone(), self.channels.len());
                        self.channels.push(ChannelSnapshot::empty(key));
                        self.channels.len() - 1
                    }
                };

                let depth = channel.depth.saturating_add(channel.backend_depth);
                let entry = &mut self.channels[slot];
                entry.depth = entry.depth.saturating_add(depth);
                entry.in_flight = entry.in_flight.saturating_add(channel.in_flight_count);
                entry.message_count = entry.message_count.saturating_add(channel.message_count);
                entry.node_count += 1;

                self.total_depth = self.total_depth.saturating_add(depth);
                self.total_in_flight = self.total_in_flight.saturating_add(channel.in_flight_count);
            }
        }
        self
    }

    /// Finish the cycle, ordering channels by descending depth.
    pub fn finish(self) -> Aggregate {
        let mut channels = self.channels;
        // sort_by is stable, so equal depths stay in first-seen order
        channels.sort_by(|a, b| b.depth.cmp(&a.depth));

        Aggregate {
            channels,
            total_depth: self.total_depth,
            total_in_flight: self.total_in_flight,
        }
    }
}

/// Aggregate a full set of payloads in one call.
pub fn aggregate<'a>(payloads: impl IntoIterator<Item = &'a StatsPayload>) -> Aggregate {
    let mut aggregator = Aggregator::new();
    for payload in payloads {
        aggregator.add(payload);
    }
    aggregator.finish()
}

/// Totals for a single node, used for the coverage view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeTotals {
    pub topics: usize,
    pub channels: usize,
    pub depth: u64,
    pub in_flight: u64,
}

impl NodeTotals {
    pub fn from_payload(payload: &StatsPayload) -> Self {
        let mut totals = NodeTotals {
            topics: payload.topics.len(),
            ..Default::default()
        };
        for channel in payload.topics.iter().flat_map(|t| &t.channels) {
            totals.channels += 1;
            totals.depth = totals
                .depth
                .saturating_add(channel.depth.saturating_add(channel.backend_depth));
            totals.in_flight = totals.in_flight.saturating_add(channel.in_flight_count);
        }
        totals
    }
}
