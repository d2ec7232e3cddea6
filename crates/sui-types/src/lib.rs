//! Shared types for the sui-mirror workspace.
//!
//! This crate holds everything both the transport and the cache need to agree on:
//!
//! - [`address`]: identity normalization, the key of every cache lookup
//! - [`payload`]: object payloads (`ObjectData`, `ObjectChange`, `ObjectPayload`)
//! - [`owner`]: mapping of the node's owner descriptor onto [`Owner`]
//! - [`transaction`]: transaction responses and events
//! - [`page`]: paged query types
//! - [`env_utils`]: environment variable helpers for configuration

pub mod address;
pub mod env_utils;
pub mod owner;
pub mod page;
pub mod payload;
pub mod transaction;

pub use address::{
    ids_equal, normalize_id, normalize_id_checked, normalize_id_short, short_type_name,
    InvalidIdentity,
};
pub use owner::Owner;
pub use page::{
    EventFilter, Page, QueryMethod, QueryParams, SortOrder, TransactionFilter, MAX_PAGE_SIZE,
};
pub use payload::{
    DynamicFieldInfo, ObjectChange, ObjectData, ObjectDataOptions, ObjectPayload,
    ObjectResponse, ObjectResponseError, PastObjectResponse,
};
pub use transaction::{EventEnvelope, EventId, TransactionBlockResponse, TransactionEffects};

use std::time::Duration;

/// Configuration for retry behavior on network operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Number of retry attempts after the first try.
    pub retries: usize,
    /// Initial backoff duration between retries.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl RetryConfig {
    /// Create a new RetryConfig with the specified parameters.
    pub fn new(retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Same backoff schedule with a different number of retries.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_millis(5000),
        }
    }
}
