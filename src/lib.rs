//! # nsqtop
//!
//! A live terminal dashboard for an NSQ cluster.
//!
//! Each refresh cycle asks every `nsqlookupd` registry for the `nsqd` data
//! nodes it knows, fetches per-node statistics concurrently, merges them into
//! one entry per topic/channel, derives throughput from the previous cycle and
//! appends the cluster-wide in-flight total to a bounded trend.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  poller (tokio task)                                         │
//! │  cluster::discover ─▶ cluster::fetch_stats ─▶ data pipeline  │
//! │                                                    │         │
//! │                                  watch<Option<ClusterData>>  │
//! └────────────────────────────────────────────────────┼─────────┘
//!                                                      ▼
//!            source::ChannelSource ─▶ app ─▶ ui ─▶ Terminal
//! ```
//!
//! - **[`cluster`]**: registry discovery, per-node stats fetch and the wire format
//! - **[`data`]**: aggregation, rates, trend history and the [`ClusterData`] view
//! - **[`poller`]**: the cancellable refresh loop
//! - **[`source`]**: the [`DataSource`] hand-off between the poller and the UI
//! - **[`config`]**: settings from flags, `NSQTOP_*` variables and a file
//! - **[`app`]**, **[`events`]**, **[`ui`]**: terminal presentation
//!
//! ## Usage
//!
//! ```bash
//! nsqtop --lookupd-http-address lookupd-1:4161,lookupd-2:4161 --interval 2s
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::time::Duration;
//! use nsqtop::{ClusterClient, Pipeline};
//!
//! # async fn run() -> Result<(), nsqtop::ClusterError> {
//! let client = ClusterClient::builder()
//!     .registry("http://127.0.0.1:4161")
//!     .timeout(Duration::from_secs(2))
//!     .build()?;
//! let mut pipeline = Pipeline::new(client, Duration::from_secs(2));
//!
//! let data = pipeline.run_cycle().await;
//! for metric in &data.channels {
//!     println!("{} depth={}", metric.key(), metric.snapshot.depth);
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cluster;
pub mod config;
pub mod data;
pub mod events;
pub mod logging;
pub mod poller;
pub mod source;
pub mod ui;

pub use app::App;
pub use cluster::{ClusterClient, ClusterError, Node};
pub use config::{Overrides, Settings, SettingsError};
pub use data::{ChannelKey, ChannelMetric, ClusterData, HealthStatus, Rate, Thresholds};
pub use poller::{Pipeline, PollerHandle};
pub use source::{ChannelSource, DataSource};
