//! Error types for talking to the cluster.

use thiserror::Error;

/// Errors that can occur while querying registries or data nodes.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// HTTP request failed for a reason other than connect or timeout.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Failed to decode the response body.
    #[error("Invalid JSON from {url}: {reason}")]
    Parse { url: String, reason: String },

    /// Could not connect to the endpoint.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Every registry failed and no producers were found.
    #[error("{0}")]
    Discovery(String),
}

impl From<reqwest::Error> for ClusterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClusterError::Timeout
        } else if err.is_connect() {
            ClusterError::Connection(err.to_string())
        } else {
            ClusterError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_names_url() {
        let err = ClusterError::Status {
            url: "http://lookupd:4161/nodes".to_string(),
            status: 500,
        };
        assert_eq!(err.to_string(), "http://lookupd:4161/nodes returned status 500");
    }

    #[test]
    fn test_discovery_message_is_verbatim() {
        let err = ClusterError::Discovery("a; b".to_string());
        assert_eq!(err.to_string(), "a; b");
    }
}
