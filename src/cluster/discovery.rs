//! Producer discovery through `nsqlookupd`.

use std::collections::HashSet;
use std::fmt;

use futures_util::future::join_all;
use reqwest::Client;
use tracing::{debug, warn};

use super::client::get_body;
use super::wire::{NodesResponse, Producer};
use crate::cluster::ClusterError;

/// A data node (`nsqd`) identified by its HTTP address and port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub address: String,
    pub port: u16,
}

impl Node {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// URL of this node's JSON statistics endpoint.
    pub fn stats_url(&self) -> String {
        format!("http://{}:{}/stats?format=json", self.address, self.port)
    }
}

impl From<Producer> for Node {
    fn from(producer: Producer) -> Self {
        Node::new(producer.broadcast_address, producer.http_port)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Query every registry concurrently and merge their producer lists.
pub async fn discover_nodes(
    client: &Client,
    registries: &[String],
) -> Result<Vec<Node>, ClusterError> {
    let results = join_all(registries.iter().map(|base| query_registry(client, base))).await;
    collect_nodes(results)
}

async fn query_registry(client: &Client, base: &str) -> Result<Vec<Producer>, String> {
    let url = format!("{}/nodes", base);

    let body = get_body(client, &url).await.map_err(|err| match err {
        ClusterError::Status { .. } => err.to_string(),
        other => format!("Failed to connect to {}: {}", base, other),
    })?;

    let response: NodesResponse =
        serde_json::from_slice(&body).map_err(|_| format!("Invalid JSON from {}", base))?;

    debug!(registry = base, producers = response.producers.len(), "registry answered");
    Ok(response.producers)
}

/// Merge per-registry results into a deduplicated node list.
///
/// Failed registries only matter when nothing at all was discovered; then
/// their notes are joined into a single [`ClusterError::Discovery`].
pub fn collect_nodes(
    results: impl IntoIterator<Item = Result<Vec<Producer>, String>>,
) -> Result<Vec<Node>, ClusterError> {
    let mut producers = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(list) => producers.extend(list),
            Err(note) => {
                warn!("{}", note);
                errors.push(note);
            }
        }
    }

    if producers.is_empty() && !errors.is_empty() {
        return Err(ClusterError::Discovery(errors.join("; ")));
    }

    let mut seen = HashSet::new();
    let nodes = producers
        .into_iter()
        .map(Node::from)
        .filter(|node| seen.insert(node.clone()))
        .collect();

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producer(address: &str, port: u16) -> Producer {
        Producer {
            broadcast_address: address.to_string(),
            http_port: port,
        }
    }

    #[test]
    fn test_dedup_preserves_first_occurrence() {
        let nodes = collect_nodes(vec![
            Ok(vec![producer("b", 4151), producer("a", 4151)]),
            Ok(vec![producer("a", 4151), producer("a", 4152), producer("b", 4151)]),
        ])
        .unwrap();

        assert_eq!(
            nodes,
            vec![Node::new("b", 4151), Node::new("a", 4151), Node::new("a", 4152)]
        );
    }

    #[test]
    fn test_partial_failure_is_absorbed() {
        let nodes = collect_nodes(vec![
            Err("http://lookupd-1:4161/nodes returned status 500".to_string()),
            Ok(vec![producer("nsqd-1", 4151)]),
        ])
        .unwrap();

        assert_eq!(nodes, vec![Node::new("nsqd-1", 4151)]);
    }

    #[test]
    fn test_total_failure_joins_notes() {
        let err = collect_nodes(vec![
            Err("Failed to connect to http://a:4161: refused".to_string()),
            Err("Invalid JSON from http://b:4161".to_string()),
        ])
        .unwrap_err();

        match err {
            ClusterError::Discovery(msg) => assert_eq!(
                msg,
                "Failed to connect to http://a:4161: refused; Invalid JSON from http://b:4161"
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_cluster_is_not_an_error() {
        let nodes = collect_nodes(vec![Ok(vec![]), Ok(vec![])]).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_node_display_and_url() {
        let node = Node::new("10.0.0.7", 4151);
        assert_eq!(node.to_string(), "10.0.0.7:4151");
        assert_eq!(node.stats_url(), "http://10.0.0.7:4151/stats?format=json");
    }
}
