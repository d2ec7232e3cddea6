//! In-process data source.
//!
//! Behaves like a node for the calls the mirror makes: objects keyed by normalized
//! id, deletion tombstones, and paged rows per query method with index cursors.
//! Every call is counted and individual calls can be made to fail, which makes the
//! batching and pagination behavior observable in tests and offline tooling.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::trace;

use sui_mirror_types::{
    normalize_id_checked, ObjectData, ObjectDataOptions, ObjectResponse, ObjectResponseError,
    Page, PastObjectResponse, QueryMethod, QueryParams, SortOrder,
};

use crate::source::RemoteDataSource;

type RowKey = (QueryMethod, Option<String>);

#[derive(Default)]
struct MemoryState {
    objects: HashMap<String, ObjectData>,
    /// Every versioned state ever inserted, per id.
    history: HashMap<String, BTreeMap<u64, ObjectData>>,
    deleted: HashSet<String>,
    rows: HashMap<RowKey, Vec<Value>>,
    failing_multi_get_calls: HashSet<usize>,
    failing_query_calls: HashSet<usize>,
    multi_get_batches: Vec<usize>,
    stall_cursor: bool,
}

#[derive(Default)]
struct CallCounters {
    get_object: AtomicUsize,
    multi_get_objects: AtomicUsize,
    query_page: AtomicUsize,
    past_object: AtomicUsize,
}

/// A deterministic stand-in for a Sui node.
pub struct InMemoryDataSource {
    endpoint: String,
    state: Mutex<MemoryState>,
    calls: CallCounters,
}

impl std::fmt::Debug for InMemoryDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDataSource")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Default for InMemoryDataSource {
    fn default() -> Self {
        Self::new("memory://default")
    }
}

impl InMemoryDataSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: Mutex::new(MemoryState::default()),
            calls: CallCounters::default(),
        }
    }

    // ---------------------------------------------------------------------
    // Objects
    // ---------------------------------------------------------------------

    /// Insert or replace an object. Reviving a deleted id clears its tombstone.
    pub fn insert_object(&self, data: ObjectData) {
        let key = Self::key(&data.object_id);
        let mut state = self.state.lock();
        state.deleted.remove(&key);
        if let Some(version) = data.version {
            state
                .history
                .entry(key.clone())
                .or_default()
                .insert(version, data.clone());
        }
        state.objects.insert(key, data);
    }

    /// Delete an object; reads report `code: "deleted"` from now on.
    pub fn delete_object(&self, id: &str) {
        let key = Self::key(id);
        let mut state = self.state.lock();
        state.objects.remove(&key);
        state.deleted.insert(key);
    }

    /// Forget an object entirely, history included; reads report `code: "notExists"`.
    pub fn remove_object(&self, id: &str) {
        let key = Self::key(id);
        let mut state = self.state.lock();
        state.objects.remove(&key);
        state.history.remove(&key);
        state.deleted.remove(&key);
    }

    pub fn object(&self, id: &str) -> Option<ObjectData> {
        self.state.lock().objects.get(&Self::key(id)).cloned()
    }

    // ---------------------------------------------------------------------
    // Paged rows
    // ---------------------------------------------------------------------

    /// Rows served for `method` regardless of the query subject.
    pub fn set_rows(&self, method: QueryMethod, rows: Vec<Value>) {
        self.state.lock().rows.insert((method, None), rows);
    }

    /// Rows served for `method` when scoped to `subject` (parent or owner id).
    pub fn set_subject_rows(&self, method: QueryMethod, subject: &str, rows: Vec<Value>) {
        self.state
            .lock()
            .rows
            .insert((method, Some(Self::key(subject))), rows);
    }

    /// Keep reporting more pages while handing back the incoming cursor unchanged.
    pub fn stall_cursor(&self, stall: bool) {
        self.state.lock().stall_cursor = stall;
    }

    // ---------------------------------------------------------------------
    // Failure injection and call accounting
    // ---------------------------------------------------------------------

    /// Make the `call`-th `multi_get_objects` call (1-based) fail with a transport error.
    pub fn fail_multi_get_call(&self, call: usize) {
        self.state.lock().failing_multi_get_calls.insert(call);
    }

    /// Make the `call`-th `query_page` call (1-based) fail with a transport error.
    pub fn fail_query_call(&self, call: usize) {
        self.state.lock().failing_query_calls.insert(call);
    }

    pub fn get_object_calls(&self) -> usize {
        self.calls.get_object.load(Ordering::SeqCst)
    }

    pub fn multi_get_calls(&self) -> usize {
        self.calls.multi_get_objects.load(Ordering::SeqCst)
    }

    pub fn query_page_calls(&self) -> usize {
        self.calls.query_page.load(Ordering::SeqCst)
    }

    pub fn past_object_calls(&self) -> usize {
        self.calls.past_object.load(Ordering::SeqCst)
    }

    /// Size of every `multi_get_objects` request received so far, in order.
    pub fn multi_get_batches(&self) -> Vec<usize> {
        self.state.lock().multi_get_batches.clone()
    }

    fn key(id: &str) -> String {
        normalize_id_checked(id).unwrap_or_else(|| id.to_string())
    }

    fn lookup(state: &MemoryState, id: &str, options: ObjectDataOptions) -> ObjectResponse {
        let key = Self::key(id);
        if let Some(data) = state.objects.get(&key) {
            return ObjectResponse::found(project(data, options));
        }
        if state.deleted.contains(&key) {
            ObjectResponse::failed(ObjectResponseError::deleted(id))
        } else {
            ObjectResponse::failed(ObjectResponseError::not_exists(id))
        }
    }
}

/// Drop the parts of an object the caller did not ask for.
fn project(data: &ObjectData, options: ObjectDataOptions) -> ObjectData {
    let mut data = data.clone();
    if !options.show_type {
        data.type_tag = None;
    }
    if !options.show_owner {
        data.owner = None;
    }
    if !options.show_content {
        data.content = None;
    }
    if !options.show_display {
        data.display = None;
    }
    data
}

#[async_trait::async_trait]
impl RemoteDataSource for InMemoryDataSource {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_object(&self, id: &str, options: ObjectDataOptions) -> Result<ObjectResponse> {
        self.calls.get_object.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        Ok(Self::lookup(&state, id, options))
    }

    /// Responses come back in reverse request order.
    async fn multi_get_objects(
        &self,
        ids: &[String],
        options: ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>> {
        let call = self.calls.multi_get_objects.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock();
        state.multi_get_batches.push(ids.len());
        if state.failing_multi_get_calls.contains(&call) {
            return Err(anyhow!("injected failure on multi_get call {}: connection reset", call));
        }
        trace!(call, count = ids.len(), "in-memory multi_get_objects");
        Ok(ids
            .iter()
            .rev()
            .map(|id| Self::lookup(&state, id, options))
            .collect())
    }

    async fn try_get_past_object(
        &self,
        id: &str,
        version: u64,
        options: ObjectDataOptions,
    ) -> Result<PastObjectResponse> {
        self.calls.past_object.fetch_add(1, Ordering::SeqCst);
        let key = Self::key(id);
        let state = self.state.lock();

        let Some(versions) = state.history.get(&key) else {
            return Ok(if state.deleted.contains(&key) {
                PastObjectResponse::ObjectDeleted(json!({ "objectId": id }))
            } else {
                PastObjectResponse::ObjectNotExists(json!(id))
            });
        };
        if let Some(data) = versions.get(&version) {
            return Ok(PastObjectResponse::VersionFound(project(data, options)));
        }
        let latest = versions.keys().next_back().copied().unwrap_or_default();
        if version > latest {
            Ok(PastObjectResponse::VersionTooHigh(json!({
                "object_id": id,
                "asked_version": version,
                "latest_version": latest,
            })))
        } else {
            Ok(PastObjectResponse::VersionNotFound(json!([id, version])))
        }
    }

    async fn query_page(
        &self,
        method: &QueryMethod,
        params: &QueryParams,
        cursor: Option<Value>,
        order: SortOrder,
    ) -> Result<Page<Value>> {
        let call = self.calls.query_page.fetch_add(1, Ordering::SeqCst) + 1;
        let state = self.state.lock();
        if state.failing_query_calls.contains(&call) {
            return Err(anyhow!("injected failure on query call {}: connection reset", call));
        }

        let subject = params.subject.as_deref().map(Self::key);
        let rows = state
            .rows
            .get(&(method.clone(), subject))
            .or_else(|| state.rows.get(&(method.clone(), None)));
        let Some(rows) = rows else {
            return Ok(Page::empty());
        };

        let start = match &cursor {
            None | Some(Value::Null) => 0,
            Some(value) => value
                .as_str()
                .and_then(|s| s.parse::<usize>().ok())
                .ok_or_else(|| anyhow!("invalid cursor for {}: {}", method, value))?,
        };

        let ordered: Vec<&Value> = if order.is_descending() && method.supports_order() {
            rows.iter().rev().collect()
        } else {
            rows.iter().collect()
        };
        let end = (start + params.page_size()).min(ordered.len());
        let data: Vec<Value> = ordered
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|v| (*v).clone())
            .collect();

        if state.stall_cursor {
            return Ok(Page {
                data,
                has_next_page: true,
                next_cursor: Some(cursor.unwrap_or_else(|| json!(start.to_string()))),
            });
        }

        let has_next_page = end < ordered.len();
        Ok(Page {
            data,
            has_next_page,
            next_cursor: has_next_page.then(|| json!(end.to_string())),
        })
    }
}
