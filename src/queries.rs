//! Ready-made cursors for the common paged queries.

use std::sync::Arc;

use serde_json::{json, Value};

use sui_mirror_transport::RemoteDataSource;
use sui_mirror_types::{normalize_id, EventFilter, QueryMethod, QueryParams, TransactionFilter};

use crate::error::Result;
use crate::paged::PagedCursor;

fn filter_json<T: serde::Serialize>(filter: &T) -> Value {
    serde_json::to_value(filter).unwrap_or(Value::Null)
}

impl PagedCursor {
    /// Events matching `filter`, newest first.
    pub fn events(source: Arc<dyn RemoteDataSource>, filter: EventFilter) -> Self {
        let params = QueryParams::new().with_filter(filter_json(&filter));
        PagedCursor::new(source, QueryMethod::QueryEvents, params)
    }

    /// Events emitted by `package::module`, or only `package::module::event_type`.
    pub fn module_events(
        source: Arc<dyn RemoteDataSource>,
        package: &str,
        module: &str,
        event_type: Option<&str>,
    ) -> Self {
        let filter = match event_type {
            Some(event_type) => {
                EventFilter::MoveEventType(format!("{}::{}::{}", package, module, event_type))
            }
            None => EventFilter::MoveModule {
                package: package.to_string(),
                module: module.to_string(),
            },
        };
        Self::events(source, filter)
    }

    /// Transaction blocks matching `filter`, with effects, object changes and events.
    pub fn transactions(source: Arc<dyn RemoteDataSource>, filter: TransactionFilter) -> Self {
        let params = QueryParams::new()
            .with_filter(filter_json(&filter))
            .with_options(json!({
                "showEffects": true,
                "showObjectChanges": true,
                "showEvents": true,
            }));
        PagedCursor::new(source, QueryMethod::QueryTransactionBlocks, params)
    }

    /// Dynamic fields of `parent`.
    pub fn dynamic_fields(
        source: Arc<dyn RemoteDataSource>,
        parent: &str,
    ) -> Result<Self> {
        let params = QueryParams::for_subject(normalize_id(parent)?);
        Ok(PagedCursor::new(source, QueryMethod::GetDynamicFields, params))
    }

    /// Objects owned by `owner`, with type, owner, content and display.
    pub fn owned_objects(
        source: Arc<dyn RemoteDataSource>,
        owner: &str,
    ) -> Result<Self> {
        let params = QueryParams::for_subject(normalize_id(owner)?).with_options(json!({
            "showType": true,
            "showOwner": true,
            "showContent": true,
            "showDisplay": true,
        }));
        Ok(PagedCursor::new(source, QueryMethod::GetOwnedObjects, params))
    }
}
