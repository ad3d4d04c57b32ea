//! Data source abstraction for receiving cluster snapshots.
//!
//! The dashboard never talks to the cluster directly; it polls a
//! [`DataSource`] for the latest completed cycle.

mod channel;

pub use channel::ChannelSource;

use std::fmt::Debug;

use crate::data::ClusterData;

/// Trait for receiving cluster snapshots.
///
/// # Example
///
/// ```
/// use nsqtop::{ChannelSource, DataSource};
///
/// let (_tx, mut source) = ChannelSource::create("http://localhost:4161");
/// if let Some(data) = source.poll() {
///     println!("Got {} channels", data.channels.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(data)` if a new cycle completed since the last poll.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<ClusterData>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// Returns an error if the source can no longer deliver data.
    fn error(&self) -> Option<&str>;
}
