//! Mock objects, rows and data sources.

use anyhow::{anyhow, Result};
use serde_json::{json, Map, Value};

use sui_mirror::transport::RemoteDataSource;
use sui_mirror::types::{
    normalize_id, ObjectData, ObjectDataOptions, ObjectResponse, Page, PastObjectResponse,
    QueryMethod, QueryParams, SortOrder,
};

/// A `0x2::coin::Coin<0x2::sui::SUI>` owned by `0xa11ce`.
#[allow(dead_code)]
pub fn coin_object(id: &str, version: u64, balance: u64) -> ObjectData {
    let mut fields = Map::new();
    fields.insert("id".into(), json!({ "id": id }));
    fields.insert("balance".into(), json!(balance.to_string()));
    ObjectData::new(id)
        .with_version(version)
        .with_type("0x2::coin::Coin<0x2::sui::SUI>")
        .with_owner(json!({ "AddressOwner": normalize_id("0xa11ce").unwrap() }))
        .with_fields(fields)
}

/// One `suix_queryEvents` row.
#[allow(dead_code)]
pub fn event_row(package: &str, module: &str, name: &str, seq: u64) -> Value {
    json!({
        "id": { "txDigest": format!("digest{}", seq), "eventSeq": seq.to_string() },
        "packageId": package,
        "transactionModule": module,
        "sender": "0xa11ce",
        "type": format!("{}::{}::{}", package, module, name),
        "parsedJson": { "seq": seq },
        "timestampMs": (1_700_000_000_000u64 + seq).to_string(),
    })
}

/// A data source whose every call fails with a non-transient error.
#[allow(dead_code)]
pub struct FailingSource;

#[async_trait::async_trait]
impl RemoteDataSource for FailingSource {
    fn endpoint(&self) -> &str {
        "failing://node"
    }

    async fn get_object(&self, id: &str, _options: ObjectDataOptions) -> Result<ObjectResponse> {
        Err(anyhow!("node refused sui_getObject for {}", id))
    }

    async fn multi_get_objects(
        &self,
        ids: &[String],
        _options: ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>> {
        Err(anyhow!("node refused sui_multiGetObjects for {} ids", ids.len()))
    }

    async fn try_get_past_object(
        &self,
        id: &str,
        version: u64,
        _options: ObjectDataOptions,
    ) -> Result<PastObjectResponse> {
        Err(anyhow!("node refused sui_tryGetPastObject for {} at {}", id, version))
    }

    async fn query_page(
        &self,
        method: &QueryMethod,
        _params: &QueryParams,
        _cursor: Option<Value>,
        _order: SortOrder,
    ) -> Result<Page<Value>> {
        Err(anyhow!("node refused {}", method.rpc_name()))
    }
}
