//! HTTP access to an NSQ cluster.
//!
//! - [`discovery`]: asks every `nsqlookupd` for its producers and merges them
//! - [`stats`]: fetches `/stats?format=json` from each `nsqd`
//! - [`wire`]: the JSON shapes of both endpoints
//!
//! Both layers absorb partial failure. Discovery only fails when every
//! registry failed and nothing was found; a node that cannot be fetched is
//! simply absent from the cycle.

pub mod client;
pub mod discovery;
pub mod error;
pub mod stats;
pub mod wire;

pub use client::{ClusterClient, ClusterClientBuilder};
pub use discovery::Node;
pub use error::ClusterError;
pub use stats::NodeStats;
pub use wire::{ChannelStats, StatsPayload, StatsShape, TopicStats};
