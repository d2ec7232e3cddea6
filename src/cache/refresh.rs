//! Refresh policy and reporting.

use serde::Serialize;

use sui_mirror_types::{ObjectDataOptions, RetryConfig};

/// Largest number of ids sent in one `multi_get_objects` call.
pub const MAX_BATCH_SIZE: usize = 50;

/// How `ObjectCache::refresh_all` talks to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Ids per batch, `1..=MAX_BATCH_SIZE`.
    pub batch_size: usize,
    /// Applied per batch. Defaults to a single attempt.
    pub retry: RetryConfig,
    pub options: ObjectDataOptions,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            retry: RetryConfig::none(),
            options: ObjectDataOptions::full(),
        }
    }
}

impl RefreshPolicy {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_options(mut self, options: ObjectDataOptions) -> Self {
        self.options = options;
        self
    }
}

/// Outcome of one `refresh_all` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Live (non-deleted) ids gathered at the start.
    pub requested: usize,
    /// `multi_get_objects` batches issued.
    pub batches: usize,
    /// Batches that failed after retries and were skipped.
    pub failed_batches: usize,
    /// Objects that absorbed fresh data.
    pub updated: usize,
    /// Objects newly or repeatedly reported deleted.
    pub deleted: usize,
    /// Objects the node returned neither data nor a deletion for.
    pub missing: usize,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed_batches == 0
    }
}
