//! Throughput derived from consecutive sampling cycles.
//!
//! `nsqd` only exposes a cumulative `message_count` per channel, so a rate
//! needs the previous cycle's count for the same key. Counters go backwards
//! when a node restarts; such deltas produce no rate rather than a negative one.

use std::collections::HashMap;
use std::time::Duration;

use super::aggregate::{ChannelKey, ChannelSnapshot};

/// Messages per second and per minute. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    pub per_second: f64,
    pub per_minute: f64,
}

/// A channel snapshot with its derived throughput.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMetric {
    pub snapshot: ChannelSnapshot,
    /// `None` when there is no usable previous sample.
    pub rate: Option<Rate>,
}

impl ChannelMetric {
    pub fn key(&self) -> &ChannelKey {
        &self.snapshot.key
    }
}

/// Channel snapshots from the last successful cycle.
#[derive(Debug, Clone, Default)]
pub struct PreviousCycleState {
    channels: HashMap<ChannelKey, ChannelSnapshot>,
}

impl PreviousCycleState {
    pub fn from_snapshots(snapshots: &[ChannelSnapshot]) -> Self {
        Self {
            channels: snapshots.iter().map(|s| (s.key.clone(), s.clone())).collect(),
        }
    }

    pub fn get(&self, key: &ChannelKey) -> Option<&ChannelSnapshot> {
        self.channels.get(key)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Rate between two cumulative counts taken one `interval` apart, or `None`
/// unless the count grew.
pub fn rate_between(previous: u64, current: u64, interval: Duration) -> Option<Rate> {
    if current <= previous || interval.is_zero() {
        return None;
    }

    let per_second = (current - previous) as f64 / interval.as_secs_f64();
    Some(Rate {
        per_second,
        per_minute: per_second * 60.0,
    })
}

/// Attach rates to this cycle's snapshots, preserving their order.
pub fn derive_rates(
    current: Vec<ChannelSnapshot>,
    previous: &PreviousCycleState,
    interval: Duration,
) -> Vec<ChannelMetric> {
    current
        .into_iter()
        .map(|snapshot| {
            let rate = previous
                .get(&snapshot.key)
                .and_then(|prev| rate_between(prev.message_count, snapshot.message_count, interval));
            ChannelMetric { snapshot, rate }
        })
        .collect()
}

/// Owns the previous-cycle state and advances it once per cycle.
#[derive(Debug, Clone)]
pub struct RateCalculator {
    previous: PreviousCycleState,
    interval: Duration,
}

impl RateCalculator {
    /// Deltas are always divided by the configured refresh `interval`, however
    /// long a cycle actually took.
    pub fn new(interval: Duration) -> Self {
        Self {
            previous: PreviousCycleState::default(),
            interval,
        }
    }

    /// Derive rates for this cycle, then replace the previous state with it.
    ///
    /// Channels absent from `current` are forgotten.
    pub fn advance(&mut self, current: Vec<ChannelSnapshot>) -> Vec<ChannelMetric> {
        let next = PreviousCycleState::from_snapshots(&current);
        let metrics = derive_rates(current, &self.previous, self.interval);
        self.previous = next;
        metrics
    }

    pub fn previous(&self) -> &PreviousCycleState {
        &self.previous
    }
}
