//! Statistics collection from data nodes.

use futures_util::future::join_all;
use reqwest::Client;
use tracing::debug;

use super::client::get_body;
use super::discovery::Node;
use super::wire::{decode_stats, StatsPayload, StatsShape};
use crate::cluster::ClusterError;

/// Normalized statistics from one node that answered this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStats {
    pub node: Node,
    pub payload: StatsPayload,
}

/// Fetch every node concurrently; nodes that fail are left out.
pub async fn fetch_all(client: &Client, nodes: &[Node]) -> Vec<NodeStats> {
    let results = join_all(nodes.iter().map(|node| fetch_node(client, node))).await;

    nodes
        .iter()
        .zip(results)
        .filter_map(|(node, result)| match result {
            Ok(payload) => Some(NodeStats {
                node: node.clone(),
                payload,
            }),
            Err(err) => {
                debug!(node = %node, error = %err, "skipping node");
                None
            }
        })
        .collect()
}

/// Fetch and normalize the statistics of a single node.
pub async fn fetch_node(client: &Client, node: &Node) -> Result<StatsPayload, ClusterError> {
    let url = node.stats_url();
    let body = get_body(client, &url).await?;

    let shape = decode_stats(&body).map_err(|e| ClusterError::Parse {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    if let StatsShape::Nested(_) = shape {
        debug!(node = %node, "unwrapped nested stats payload");
    }
    Ok(shape.into_payload())
}
