//! The remote data source abstraction.
//!
//! Everything the mirror needs from a node goes through [`RemoteDataSource`], so the
//! cache and cursor can run against the live JSON-RPC client or an in-process fixture
//! without knowing which.

use anyhow::Result;
use serde_json::Value;

use sui_mirror_types::{
    ObjectDataOptions, ObjectResponse, Page, PastObjectResponse, QueryMethod, QueryParams, SortOrder,
};

/// Object reads and paged queries against a Sui node.
#[async_trait::async_trait]
pub trait RemoteDataSource: Send + Sync {
    /// Endpoint this source talks to. Used as the cache registry key.
    fn endpoint(&self) -> &str;

    /// Read a single object.
    async fn get_object(&self, id: &str, options: ObjectDataOptions) -> Result<ObjectResponse>;

    /// Read many objects in one call. Entries may come back in any order.
    async fn multi_get_objects(
        &self,
        ids: &[String],
        options: ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>>;

    /// Read an object as it was at `version`.
    async fn try_get_past_object(
        &self,
        id: &str,
        version: u64,
        options: ObjectDataOptions,
    ) -> Result<PastObjectResponse>;

    /// Fetch one page of a paged query.
    async fn query_page(
        &self,
        method: &QueryMethod,
        params: &QueryParams,
        cursor: Option<Value>,
        order: SortOrder,
    ) -> Result<Page<Value>>;
}
