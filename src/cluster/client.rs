//! Shared HTTP client for registries and data nodes.

use std::time::Duration;

use reqwest::Client;

use super::discovery::{self, Node};
use super::stats::{self, NodeStats};
use crate::cluster::ClusterError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Client for one NSQ cluster, reachable through one or more `nsqlookupd`.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    client: Client,
    registries: Vec<String>,
}

impl ClusterClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ClusterClientBuilder {
        ClusterClientBuilder::default()
    }

    /// Registry base URLs this client polls.
    pub fn registries(&self) -> &[String] {
        &self.registries
    }

    /// Resolve the current set of data nodes from every registry.
    pub async fn discover(&self) -> Result<Vec<Node>, ClusterError> {
        discovery::discover_nodes(&self.client, &self.registries).await
    }

    /// Fetch statistics from every node, dropping the ones that fail.
    pub async fn fetch_stats(&self, nodes: &[Node]) -> Vec<NodeStats> {
        stats::fetch_all(&self.client, nodes).await
    }
}

/// Builder for [`ClusterClient`].
#[derive(Debug, Default)]
pub struct ClusterClientBuilder {
    registries: Vec<String>,
    timeout: Option<Duration>,
}

impl ClusterClientBuilder {
    /// Add a registry base URL (e.g. "http://localhost:4161").
    pub fn registry(mut self, url: impl Into<String>) -> Self {
        self.registries.push(url.into());
        self
    }

    /// Add several registry base URLs.
    pub fn registries<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registries.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Set the per-request timeout (default: 2 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ClusterClient, ClusterError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(concat!("nsqtop/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ClusterClient {
            client,
            registries: self
                .registries
                .into_iter()
                .map(|url| url.trim_end_matches('/').to_string())
                .collect(),
        })
    }
}

/// GET a URL and return the body of a successful response.
pub(crate) async fn get_body(client: &Client, url: &str) -> Result<Vec<u8>, ClusterError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(ClusterError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    Ok(response.bytes().await?.to_vec())
}
