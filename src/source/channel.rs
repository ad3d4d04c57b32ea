//! Channel-based data source.
//!
//! Receives cluster snapshots from the poller through a tokio watch channel.
//! The poller replaces the value once per cycle, so a reader either sees the
//! previous cycle or the new one, never a partial update.

use tokio::sync::watch;

use super::DataSource;
use crate::data::ClusterData;

/// A data source fed by a [`crate::poller`] task.
///
/// # Example
///
/// ```
/// use nsqtop::{ChannelSource, DataSource};
///
/// let (tx, mut source) = ChannelSource::create("http://localhost:4161");
/// assert!(source.poll().is_none());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Option<ClusterData>>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where snapshots come from (e.g. the registries)
    pub fn new(receiver: watch::Receiver<Option<ClusterData>>, source_description: &str) -> Self {
        Self {
            receiver,
            description: source_description.to_string(),
            closed: false,
        }
    }

    /// Create a channel pair for sending snapshots to a ChannelSource.
    ///
    /// The channel starts empty; the first `poll` after the first publish
    /// returns data.
    pub fn create(source_description: &str) -> (watch::Sender<Option<ClusterData>>, Self) {
        let (tx, rx) = watch::channel(None);
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<ClusterData> {
        match self.receiver.has_changed() {
            Ok(true) => self.receiver.borrow_and_update().clone(),
            Ok(false) => None,
            Err(_) => {
                self.closed = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        if self.closed {
            Some("Poller stopped")
        } else {
            None
        }
    }
}
