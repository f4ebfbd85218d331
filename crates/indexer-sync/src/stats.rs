//! Run statistics

use std::time::Duration;

use crate::builder::SkipReason;
use crate::formatting::{format_duration, format_number};

/// Counters of one indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub blobs_indexed: usize,
    pub blobs_removed: usize,
    pub skipped_too_large: usize,
    pub skipped_binary: usize,
    pub commits_indexed: usize,
    pub elapsed_time: Duration,
}

impl IndexStats {
    pub fn blobs_skipped(&self) -> usize {
        self.skipped_too_large + self.skipped_binary
    }

    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::TooLarge => self.skipped_too_large += 1,
            SkipReason::Binary => self.skipped_binary += 1,
        }
    }
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Blobs: {} indexed, {} removed, {} skipped ({} too large, {} binary) | Commits: {} indexed | Time: {}",
            format_number(self.blobs_indexed),
            format_number(self.blobs_removed),
            format_number(self.blobs_skipped()),
            format_number(self.skipped_too_large),
            format_number(self.skipped_binary),
            format_number(self.commits_indexed),
            format_duration(self.elapsed_time)
        )
    }
}
