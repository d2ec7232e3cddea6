//! JSON-RPC client for a Sui fullnode.
//!
//! ## Endpoints
//! - Mainnet: `https://fullnode.mainnet.sui.io:443`
//! - Testnet: `https://fullnode.testnet.sui.io:443`
//!
//! `ureq` is blocking, so every call runs on tokio's blocking pool. The client never
//! retries on its own; callers wrap calls in [`crate::retry::with_retries`] when they
//! want that.
//!
//! ```ignore
//! let client = JsonRpcClient::mainnet();
//! let clock = client.get_object("0x6", ObjectDataOptions::full()).await?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use tracing::{debug, trace};

use sui_mirror_types::env_utils::env_secs_or;
use sui_mirror_types::{
    ObjectDataOptions, ObjectResponse, Page, PastObjectResponse, QueryMethod, QueryParams,
    SortOrder,
};

use crate::network::{MAINNET_RPC, TESTNET_RPC};
use crate::source::RemoteDataSource;

/// JSON-RPC client backed by a `ureq` agent.
#[derive(Clone)]
pub struct JsonRpcClient {
    endpoint: String,
    agent: ureq::Agent,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl JsonRpcClient {
    /// Default request timeout in seconds (can be overridden by env).
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn default_timeouts() -> (Duration, Duration) {
        (
            env_secs_or("SUI_RPC_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS),
            env_secs_or(
                "SUI_RPC_CONNECT_TIMEOUT_SECS",
                Self::DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }

    pub fn testnet() -> Self {
        Self::new(TESTNET_RPC)
    }

    /// Client for a custom endpoint with timeouts from the environment.
    pub fn new(endpoint: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(endpoint, timeout, connect_timeout)
    }

    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Execute one JSON-RPC call and return its `result`.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(method, id, "json-rpc request");

        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let response: Value = tokio::task::spawn_blocking(move || -> Result<Value> {
            agent
                .post(&endpoint)
                .set("Content-Type", "application/json")
                .send_json(&body)
                .map_err(|e| anyhow!("JSON-RPC request failed: {}", e))?
                .into_json()
                .map_err(|e| anyhow!("Failed to parse JSON-RPC response: {}", e))
        })
        .await
        .context("JSON-RPC worker task failed")??;

        extract_result(method, response)
    }
}

fn extract_result(method: &str, mut response: Value) -> Result<Value> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let msg = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(anyhow!("JSON-RPC error {} from {}: {}", code, method, msg));
    }
    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(anyhow!("No result in JSON-RPC response to {}", method)),
    }
}

/// Positional parameters for a paged query, in the order each method expects.
pub fn page_params(
    method: &QueryMethod,
    params: &QueryParams,
    cursor: Option<Value>,
    order: SortOrder,
) -> Value {
    let cursor = cursor.unwrap_or(Value::Null);
    let limit = json!(params.page_size());
    let filter = params.filter.clone().unwrap_or(Value::Null);
    let subject = params.subject.clone().map(Value::String).unwrap_or(Value::Null);
    let query = |params: &QueryParams| {
        let mut query = serde_json::Map::new();
        if let Some(filter) = &params.filter {
            query.insert("filter".into(), filter.clone());
        }
        if let Some(options) = &params.options {
            query.insert("options".into(), options.clone());
        }
        Value::Object(query)
    };

    match method {
        QueryMethod::QueryEvents => json!([filter, cursor, limit, order.is_descending()]),
        QueryMethod::QueryTransactionBlocks => {
            json!([query(params), cursor, limit, order.is_descending()])
        }
        QueryMethod::GetDynamicFields => json!([subject, cursor, limit]),
        QueryMethod::GetOwnedObjects => json!([subject, query(params), cursor, limit]),
        QueryMethod::GetCoins => json!([subject, filter, cursor, limit]),
        QueryMethod::Custom(_) => {
            let mut positional = Vec::new();
            if params.subject.is_some() {
                positional.push(subject);
            }
            if params.filter.is_some() {
                positional.push(filter);
            }
            positional.extend([cursor, limit, json!(order.is_descending())]);
            Value::Array(positional)
        }
    }
}

#[async_trait::async_trait]
impl RemoteDataSource for JsonRpcClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_object(&self, id: &str, options: ObjectDataOptions) -> Result<ObjectResponse> {
        let result = self
            .call("sui_getObject", json!([id, options]))
            .await?;
        serde_json::from_value(result)
            .with_context(|| format!("Malformed sui_getObject response for {}", id))
    }

    async fn multi_get_objects(
        &self,
        ids: &[String],
        options: ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>> {
        debug!(count = ids.len(), "sui_multiGetObjects");
        let result = self
            .call("sui_multiGetObjects", json!([ids, options]))
            .await?;
        serde_json::from_value(result).context("Malformed sui_multiGetObjects response")
    }

    async fn try_get_past_object(
        &self,
        id: &str,
        version: u64,
        options: ObjectDataOptions,
    ) -> Result<PastObjectResponse> {
        let result = self
            .call("sui_tryGetPastObject", json!([id, version, options]))
            .await?;
        serde_json::from_value(result).with_context(|| {
            format!("Malformed sui_tryGetPastObject response for {} at {}", id, version)
        })
    }

    async fn query_page(
        &self,
        method: &QueryMethod,
        params: &QueryParams,
        cursor: Option<Value>,
        order: SortOrder,
    ) -> Result<Page<Value>> {
        let positional = page_params(method, params, cursor, order);
        let result = self.call(method.rpc_name(), positional).await?;
        serde_json::from_value(result)
            .with_context(|| format!("Malformed page from {}", method.rpc_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let mainnet = JsonRpcClient::mainnet();
        assert!(mainnet.endpoint().contains("mainnet"));

        let custom = JsonRpcClient::new("http://127.0.0.1:9000");
        assert_eq!(custom.endpoint(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_event_params_are_positional() {
        let params = QueryParams::new()
            .with_filter(json!({ "MoveModule": { "package": "0x2", "module": "coin" } }))
            .with_limit(20);
        let value = page_params(&QueryMethod::QueryEvents, &params, None, SortOrder::Descending);
        assert_eq!(
            value,
            json!([{ "MoveModule": { "package": "0x2", "module": "coin" } }, null, 20, true])
        );
    }

    #[test]
    fn test_transaction_and_owned_params_wrap_query() {
        let params = QueryParams::for_subject("0xabc")
            .with_filter(json!({ "StructType": "0x2::coin::Coin" }))
            .with_options(json!({ "showContent": true }));
        let owned = page_params(
            &QueryMethod::GetOwnedObjects,
            &params,
            Some(json!("0x5")),
            SortOrder::Ascending,
        );
        assert_eq!(owned[0], json!("0xabc"));
        assert_eq!(owned[1]["options"]["showContent"], json!(true));
        assert_eq!(owned[2], json!("0x5"));
        assert_eq!(owned[3], json!(50));

        let txs = page_params(
            &QueryMethod::QueryTransactionBlocks,
            &QueryParams::new().with_filter(json!({ "FromAddress": "0x1" })),
            None,
            SortOrder::Ascending,
        );
        assert_eq!(txs[0]["filter"]["FromAddress"], json!("0x1"));
        assert_eq!(txs[3], json!(false));
    }

    #[test]
    fn test_dynamic_field_params() {
        let params = QueryParams::for_subject("0x99");
        let value = page_params(&QueryMethod::GetDynamicFields, &params, None, SortOrder::Descending);
        assert_eq!(value, json!(["0x99", null, 50]));
    }

    #[test]
    fn test_extract_result_and_error() {
        let ok = extract_result("m", json!({ "jsonrpc": "2.0", "id": 1, "result": { "a": 1 } }));
        assert_eq!(ok.unwrap()["a"], json!(1));

        let err = extract_result(
            "suix_queryEvents",
            json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32602, "message": "bad cursor" } }),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bad cursor"));
        assert!(msg.contains("suix_queryEvents"));

        assert!(extract_result("m", json!({ "jsonrpc": "2.0", "id": 1 })).is_err());
    }

    /// Run with: cargo test -p sui-mirror-transport test_fetch_clock_object -- --ignored --nocapture
    #[tokio::test]
    #[ignore]
    async fn test_fetch_clock_object() {
        let client = JsonRpcClient::mainnet();
        let response = client
            .get_object("0x6", ObjectDataOptions::full())
            .await
            .expect("fetch clock");
        let data = response.data.expect("clock data");
        assert!(data.type_tag.unwrap_or_default().contains("Clock"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_past_clock_object() {
        let client = JsonRpcClient::mainnet();
        let response = client
            .try_get_past_object("0x6", 1, ObjectDataOptions::full())
            .await
            .expect("past clock");
        assert!(!response.status().is_empty());
    }
}
