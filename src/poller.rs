//! The polling cycle and the background task that drives it.
//!
//! A [`Pipeline`] owns all state that survives between cycles (previous
//! channel counts and the in-flight trend). [`spawn`] runs it on a fixed
//! interval and publishes each finished [`ClusterData`] by replacing the value
//! in a watch channel, so readers only ever see complete cycles.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cluster::{ClusterClient, Node, NodeStats};
use crate::data::{Aggregator, ClusterData, NodeSummary, NodeTotals, RateCalculator, TrendHistory};

/// Sending half of the snapshot hand-off; `None` until the first cycle ends.
pub type Publisher = watch::Sender<Option<ClusterData>>;

/// One discovery → fetch → aggregate → rate → history pass, plus its state.
#[derive(Debug)]
pub struct Pipeline {
    client: ClusterClient,
    rates: RateCalculator,
    history: TrendHistory,
    last: Option<ClusterData>,
    cycle: u64,
}

impl Pipeline {
    pub fn new(client: ClusterClient, interval: Duration) -> Self {
        Self {
            client,
            rates: RateCalculator::new(interval),
            history: TrendHistory::new(),
            last: None,
            cycle: 0,
        }
    }

    /// Run a full cycle against the cluster.
    pub async fn run_cycle(&mut self) -> ClusterData {
        let nodes = match self.client.discover().await {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(error = %err, "discovery failed");
                return self.fail(err.to_string());
            }
        };

        let stats = self.client.fetch_stats(&nodes).await;
        self.complete(nodes, stats, Instant::now())
    }

    /// Fold a fully fetched cycle into the pipeline state.
    pub fn complete(&mut self, nodes: Vec<Node>, stats: Vec<NodeStats>, sampled_at: Instant) -> ClusterData {
        self.cycle += 1;

        let mut aggregator = Aggregator::new();
        let mut totals: HashMap<&Node, NodeTotals> = HashMap::new();
        for node_stats in &stats {
            aggregator.add(&node_stats.payload);
            totals.insert(&node_stats.node, NodeTotals::from_payload(&node_stats.payload));
        }
        let aggregate = aggregator.finish();

        let node_summaries = nodes
            .iter()
            .map(|node| NodeSummary {
                node: node.clone(),
                totals: totals.get(node).copied(),
            })
            .collect();

        let channels = self.rates.advance(aggregate.channels);
        self.history.record(aggregate.total_in_flight);

        debug!(
            cycle = self.cycle,
            nodes = nodes.len(),
            reporting = stats.len(),
            channels = channels.len(),
            depth = aggregate.total_depth,
            in_flight = aggregate.total_in_flight,
            "cycle complete"
        );

        let data = ClusterData {
            channels,
            total_depth: aggregate.total_depth,
            total_in_flight: aggregate.total_in_flight,
            nodes: node_summaries,
            trend: self.history.to_vec(),
            registries: self.client.registries().to_vec(),
            error: None,
            cycle: self.cycle,
            last_updated: sampled_at,
        };
        self.last = Some(data.clone());
        data
    }

    /// Record a cluster-level failure.
    ///
    /// The last good view is republished with the error attached; rate state
    /// and trend are left untouched.
    pub fn fail(&mut self, error: String) -> ClusterData {
        self.cycle += 1;

        let mut data = self
            .last
            .clone()
            .unwrap_or_else(|| ClusterData::empty(self.client.registries().to_vec()));
        data.error = Some(error);
        data.cycle = self.cycle;
        data
    }

    pub fn history(&self) -> &TrendHistory {
        &self.history
    }
}

/// Handle to a running poller task.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Ask the poller to stop after (or instead of) the current cycle.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Stop the poller and wait for the task to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            warn!("poller task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the polling loop on the current tokio runtime.
///
/// The first cycle starts immediately. A new cycle never starts before the
/// previous one has been published.
pub fn spawn(pipeline: Pipeline, interval: Duration, publisher: Publisher) -> PollerHandle {
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(run(pipeline, interval, publisher, shutdown.clone()));
    PollerHandle { shutdown, task }
}

async fn run(mut pipeline: Pipeline, interval: Duration, publisher: Publisher, shutdown: CancellationToken) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(?interval, "poller started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let data = tokio::select! {
            _ = shutdown.cancelled() => break,
            data = pipeline.run_cycle() => data,
        };

        if publisher.send(Some(data)).is_err() {
            info!("dashboard dropped, stopping poller");
            break;
        }
    }

    info!("poller stopped");
}
