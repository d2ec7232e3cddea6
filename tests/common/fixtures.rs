//! Populated in-memory sources.

use std::sync::Arc;

use serde_json::Value;
use sui_mirror::transport::InMemoryDataSource;

use super::mocks::{coin_object, event_row};

/// Empty source with a distinct endpoint.
#[allow(dead_code)]
pub fn memory_source(endpoint: &str) -> Arc<InMemoryDataSource> {
    Arc::new(InMemoryDataSource::new(endpoint))
}

/// Source holding coins `0x1..=0x{count}` at version 1. Returns the short ids.
#[allow(dead_code)]
pub fn source_with_objects(count: u64) -> (Arc<InMemoryDataSource>, Vec<String>) {
    let source = Arc::new(InMemoryDataSource::default());
    let ids: Vec<String> = (1..=count).map(|i| format!("0x{:x}", i)).collect();
    for (i, id) in ids.iter().enumerate() {
        source.insert_object(coin_object(id, 1, i as u64 * 10));
    }
    (source, ids)
}

/// `count` events of `0x2::coin::CoinEvent`, sequence numbers in ascending order.
#[allow(dead_code)]
pub fn event_rows(count: u64) -> Vec<Value> {
    (0..count)
        .map(|seq| event_row("0x2", "coin", "CoinEvent", seq))
        .collect()
}
