//! Aggregation, rate derivation and trend tracking.
//!
//! This module turns the normalized per-node payloads of one cycle into the
//! cluster view the dashboard renders.
//!
//! ## Submodules
//!
//! - [`aggregate`]: merges payloads into per-channel totals ([`ChannelSnapshot`])
//! - [`rate`]: per-second/per-minute throughput against the previous cycle
//! - [`history`]: fixed-length trend of total in-flight messages
//! - [`cluster`]: the published view model ([`ClusterData`], [`HealthStatus`])
//! - [`format`]: digit grouping and rate text
//! - [`duration`]: parsing and formatting of duration strings (e.g. "2s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Vec<NodeStats>
//!        │
//!        ▼
//! Aggregator::add() ... finish()  ──▶ Aggregate { channels, totals }
//!        │
//!        ▼
//! RateCalculator::advance()       ──▶ Vec<ChannelMetric>
//!        │
//!        ├──▶ TrendHistory::record(total_in_flight)
//!        │
//!        ▼
//! ClusterData (published)
//! ```

pub mod aggregate;
pub mod cluster;
pub mod duration;
pub mod format;
pub mod history;
pub mod rate;

pub use aggregate::{aggregate, Aggregate, Aggregator, ChannelKey, ChannelSnapshot, NodeTotals};
pub use cluster::{ClusterData, HealthStatus, NodeSummary, Thresholds};
pub use format::format_number;
pub use history::TrendHistory;
pub use rate::{ChannelMetric, PreviousCycleState, Rate, RateCalculator};
