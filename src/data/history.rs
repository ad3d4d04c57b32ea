//! Rolling trend of the cluster's total in-flight count.

use std::collections::VecDeque;

/// Maximum number of samples kept for the trend sparkline.
pub const MAX_HISTORY_SIZE: usize = 60;

/// Number of intensity levels used by the sparkline.
pub const SPARKLINE_LEVELS: usize = 8;

/// Fixed-length FIFO of scalar samples.
#[derive(Debug, Clone)]
pub struct TrendHistory {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl Default for TrendHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TrendHistory {
    /// Create an empty history holding [`MAX_HISTORY_SIZE`] samples.
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_SIZE)
    }

    /// Create an empty history holding at most `capacity` samples (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn record(&mut self, sample: u64) {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Samples from oldest to newest.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = u64> + '_ {
        self.samples.iter().copied()
    }

    /// Owned copy of the samples, oldest first.
    pub fn to_vec(&self) -> Vec<u64> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Map every sample to `0..levels`, proportional to the window maximum.
    pub fn levels(&self, levels: usize) -> Vec<u8> {
        let samples = self.to_vec();
        scale_levels(&samples, levels)
    }
}

/// Scale samples to `0..levels` relative to their maximum.
///
/// An all-zero input maps to the lowest level.
pub fn scale_levels(samples: &[u64], levels: usize) -> Vec<u8> {
    let top = levels.saturating_sub(1) as u128;
    let max = samples.iter().copied().max().unwrap_or(0).max(1) as u128;

    samples
        .iter()
        .map(|&sample| {
            let level = (sample as u128 * top / max).min(top);
            level.min(u8::MAX as u128) as u8
        })
        .collect()
}
