//! Object cache for one Sui endpoint.
//!
//! The cache keeps at most one [`ObjectHandle`] per normalized object id and keeps
//! those handles consistent with the node:
//!
//! - [`ObjectCache::push`] registers ids or objects (idempotent)
//! - [`ObjectCache::refresh_all`] re-reads every live object in sequential batches
//! - [`ObjectCache::fetch`] re-reads a single object
//! - [`ObjectCache::apply_transaction`] folds a transaction's object changes in
//!
//! Deleted objects stay in the cache as tombstones and are skipped by later
//! refreshes. Locks are never held across a remote call.
//!
//! # Usage
//!
//! ```ignore
//! use sui_mirror::{CacheRegistry, ObjectCache};
//!
//! let registry = CacheRegistry::new();
//! let cache = registry.instance_for_source(client);
//!
//! let clock = cache.push("0x6").expect("valid id");
//! let report = cache.refresh_all().await;
//! println!("{} updated in {} batches", report.updated, report.batches);
//! println!("clock version {:?}", clock.version());
//! ```

mod notify;
mod refresh;

pub use notify::{CacheEvent, EVENT_CHANNEL_CAPACITY};
pub use refresh::{RefreshPolicy, RefreshReport, MAX_BATCH_SIZE};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use sui_mirror_transport::{with_retries, RemoteDataSource};
use sui_mirror_types::{
    normalize_id, normalize_id_checked, ObjectChange, ObjectData, ObjectPayload, ObjectResponse,
    TransactionBlockResponse,
};

use crate::error::{MirrorError, Result};
use crate::tracked::{ObjectHandle, TrackedObject};

/// Anything [`ObjectCache::push`] accepts.
#[derive(Debug, Clone)]
pub enum PushTarget {
    Id(String),
    Object(TrackedObject),
    Handle(ObjectHandle),
}

impl From<&str> for PushTarget {
    fn from(id: &str) -> Self {
        PushTarget::Id(id.to_string())
    }
}

impl From<String> for PushTarget {
    fn from(id: String) -> Self {
        PushTarget::Id(id)
    }
}

impl From<&String> for PushTarget {
    fn from(id: &String) -> Self {
        PushTarget::Id(id.clone())
    }
}

impl From<TrackedObject> for PushTarget {
    fn from(object: TrackedObject) -> Self {
        PushTarget::Object(object)
    }
}

impl From<ObjectHandle> for PushTarget {
    fn from(handle: ObjectHandle) -> Self {
        PushTarget::Handle(handle)
    }
}

impl From<&ObjectHandle> for PushTarget {
    fn from(handle: &ObjectHandle) -> Self {
        PushTarget::Handle(handle.clone())
    }
}

/// Objects touched by [`ObjectCache::apply_transaction`], in change order.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub created: Vec<ObjectHandle>,
    pub mutated: Vec<ObjectHandle>,
    pub wrapped: Vec<ObjectHandle>,
    pub deleted: Vec<ObjectHandle>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.mutated.is_empty()
            && self.wrapped.is_empty()
            && self.deleted.is_empty()
    }
}

#[derive(Default)]
struct Entries {
    by_id: HashMap<String, ObjectHandle>,
    /// Normalized ids in insertion order.
    order: Vec<String>,
}

/// Keyed store of tracked objects backed by a [`RemoteDataSource`].
pub struct ObjectCache {
    source: Arc<dyn RemoteDataSource>,
    policy: RefreshPolicy,
    entries: RwLock<Entries>,
    events: broadcast::Sender<CacheEvent>,
}

impl std::fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("endpoint", &self.source.endpoint())
            .field("entries", &self.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ObjectCache {
    pub fn new(source: Arc<dyn RemoteDataSource>) -> Self {
        Self::with_policy(source, RefreshPolicy::default())
    }

    pub fn with_policy(source: Arc<dyn RemoteDataSource>, policy: RefreshPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            source,
            policy,
            entries: RwLock::new(Entries::default()),
            events,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.source.endpoint()
    }

    pub fn source(&self) -> &Arc<dyn RemoteDataSource> {
        &self.source
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Receive [`CacheEvent`]s from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: CacheEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register an id, object or handle, returning the cached handle.
    ///
    /// Returns the already-registered handle when the normalized id is present, and
    /// `None` for invalid ids or objects without an id.
    pub fn push(&self, target: impl Into<PushTarget>) -> Option<ObjectHandle> {
        match self.try_push(target) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(error = %err, "push rejected");
                None
            }
        }
    }

    /// Like [`ObjectCache::push`], surfacing why a target was rejected.
    pub fn try_push(&self, target: impl Into<PushTarget>) -> Result<ObjectHandle> {
        let (key, handle) = match target.into() {
            PushTarget::Id(id) => {
                let key = normalize_id(&id)?;
                if let Some(existing) = self.by_key(&key) {
                    return Ok(existing);
                }
                let object = TrackedObject::new(Some(&id))?;
                (key, ObjectHandle::new(object))
            }
            PushTarget::Object(object) => {
                let key = object
                    .normalized_id()
                    .map(str::to_string)
                    .ok_or(MirrorError::MissingIdentity)?;
                (key, ObjectHandle::new(object))
            }
            PushTarget::Handle(handle) => {
                let key = handle.normalized_id().ok_or(MirrorError::MissingIdentity)?;
                (key, handle)
            }
        };
        Ok(self.register(key, handle))
    }

    /// Insert unless present; returns whichever handle ends up registered.
    fn register(&self, key: String, handle: ObjectHandle) -> ObjectHandle {
        {
            let mut entries = self.entries.write();
            if let Some(existing) = entries.by_id.get(&key) {
                return existing.clone();
            }
            entries.by_id.insert(key.clone(), handle.clone());
            entries.order.push(key);
        }
        self.notify(CacheEvent::Added(handle.clone()));
        if handle.is_deleted() {
            self.notify(CacheEvent::Deleted(handle.clone()));
        }
        handle
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn by_key(&self, key: &str) -> Option<ObjectHandle> {
        self.entries.read().by_id.get(key).cloned()
    }

    /// Lookup by any spelling of the id.
    pub fn by_id(&self, id: &str) -> Option<ObjectHandle> {
        normalize_id_checked(id).and_then(|key| self.by_key(&key))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id(id).is_some()
    }

    /// All handles in insertion order.
    pub fn snapshot(&self) -> Vec<ObjectHandle> {
        let entries = self.entries.read();
        entries
            .order
            .iter()
            .filter_map(|key| entries.by_id.get(key).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First match in insertion order.
    pub fn find<P>(&self, predicate: P) -> Option<ObjectHandle>
    where
        P: Fn(&TrackedObject) -> bool,
    {
        self.snapshot()
            .into_iter()
            .find(|handle| predicate(&handle.read()))
    }

    /// Match with the latest `constructed_at`; on a tie the later-inserted one wins.
    pub fn find_most_recent<P>(&self, predicate: P) -> Option<ObjectHandle>
    where
        P: Fn(&TrackedObject) -> bool,
    {
        let mut best: Option<(chrono::DateTime<chrono::Utc>, ObjectHandle)> = None;
        for handle in self.snapshot() {
            let constructed_at = {
                let object = handle.read();
                if !predicate(&object) {
                    continue;
                }
                object.constructed_at()
            };
            match &best {
                Some((best_at, _)) if constructed_at < *best_at => {}
                _ => best = Some((constructed_at, handle)),
            }
        }
        best.map(|(_, handle)| handle)
    }

    /// Most recent object whose short type name (or full type tag) is `type_name`.
    pub fn find_most_recent_by_type_name(&self, type_name: &str) -> Option<ObjectHandle> {
        self.find_most_recent(|object| {
            object.type_name() == Some(type_name) || object.type_tag() == Some(type_name)
        })
    }

    // =========================================================================
    // Remote reads
    // =========================================================================

    /// Re-read every live object from the node.
    ///
    /// Ids are sent in sequential batches of `policy.batch_size`. A batch that still
    /// fails after `policy.retry` is logged and skipped; its objects keep their
    /// last-known state. This never fails as a whole.
    pub async fn refresh_all(&self) -> RefreshReport {
        let ids: Vec<String> = {
            let entries = self.entries.read();
            let mut seen = HashSet::new();
            entries
                .order
                .iter()
                .filter(|key| {
                    entries
                        .by_id
                        .get(*key)
                        .is_some_and(|handle| !handle.is_deleted())
                })
                .filter(|key| seen.insert((*key).clone()))
                .cloned()
                .collect()
        };

        let mut report = RefreshReport {
            requested: ids.len(),
            ..RefreshReport::default()
        };
        if ids.is_empty() {
            return report;
        }

        let options = self.policy.options;
        let batch_size = self.policy.batch_size.clamp(1, MAX_BATCH_SIZE);
        for (index, batch) in ids.chunks(batch_size).enumerate() {
            report.batches += 1;
            debug!(batch = index, size = batch.len(), "refreshing batch");

            let result = with_retries(self.policy.retry, || {
                self.source.multi_get_objects(batch, options)
            })
            .await;

            match result {
                Ok(responses) => self.apply_batch(batch, responses, &mut report),
                Err(err) => {
                    report.failed_batches += 1;
                    warn!(
                        endpoint = self.endpoint(),
                        batch = index,
                        size = batch.len(),
                        error = %format!("{:#}", err),
                        "object batch failed, keeping last-known state"
                    );
                }
            }
        }

        debug!(
            requested = report.requested,
            batches = report.batches,
            failed = report.failed_batches,
            updated = report.updated,
            deleted = report.deleted,
            missing = report.missing,
            "refresh complete"
        );
        report
    }

    fn apply_batch(&self, batch: &[String], responses: Vec<ObjectResponse>, report: &mut RefreshReport) {
        let mut found: HashMap<String, ObjectData> = HashMap::new();
        let mut deleted: HashSet<String> = HashSet::new();
        for response in responses {
            if let Some(data) = response.data {
                if let Some(key) = normalize_id_checked(&data.object_id) {
                    found.insert(key, data);
                }
            } else if let Some(error) = response.error.filter(|e| e.is_deleted()) {
                if let Some(key) = error.object_id.as_deref().and_then(normalize_id_checked) {
                    deleted.insert(key);
                }
            }
        }

        for key in batch {
            let Some(handle) = self.by_key(key) else {
                continue;
            };
            if let Some(data) = found.remove(key) {
                match self.absorb_into(&handle, &ObjectPayload::Data(data)) {
                    Ok(_) => report.updated += 1,
                    Err(err) => warn!(id = %key, error = %err, "could not absorb object data"),
                }
            } else if deleted.contains(key) {
                report.deleted += 1;
                if handle.mark_deleted() {
                    debug!(id = %key, "object deleted on chain");
                    self.notify(CacheEvent::Deleted(handle));
                }
            } else {
                report.missing += 1;
                debug!(id = %key, "object not found");
            }
        }
    }

    /// Absorb a payload and notify on change. Returns whether the state changed.
    fn absorb_into(&self, handle: &ObjectHandle, payload: &ObjectPayload) -> Result<bool> {
        let (changed, became_deleted) = {
            let mut object = handle.write();
            let before = object.clone();
            object.absorb(payload)?;
            (*object != before, object.is_deleted() && !before.is_deleted())
        };
        if became_deleted {
            self.notify(CacheEvent::Deleted(handle.clone()));
        } else if changed {
            self.notify(CacheEvent::Updated(handle.clone()));
        }
        Ok(changed)
    }

    /// Absorb a payload into the cached object it names, registering it when new.
    pub fn ingest(&self, payload: &ObjectPayload) -> Result<ObjectHandle> {
        let id = payload.object_id().ok_or(MirrorError::MissingIdentity)?;
        let key = normalize_id(id)?;
        match self.by_key(&key) {
            Some(handle) => {
                self.absorb_into(&handle, payload)?;
                Ok(handle)
            }
            None => {
                let object = TrackedObject::from_payload(payload)?;
                Ok(self.register(key, ObjectHandle::new(object)))
            }
        }
    }

    /// Read one object from the node, registering it if needed.
    pub async fn fetch(&self, id: &str) -> Result<ObjectHandle> {
        let handle = self.try_push(id)?;
        let key = handle.normalized_id().ok_or(MirrorError::MissingIdentity)?;

        let response = self
            .source
            .get_object(&key, self.policy.options)
            .await
            .map_err(|err| MirrorError::remote("sui_getObject", err))?;

        if let Some(data) = response.data {
            self.absorb_into(&handle, &ObjectPayload::Data(data))?;
        } else if response.is_deleted() {
            if handle.mark_deleted() {
                self.notify(CacheEvent::Deleted(handle.clone()));
            }
        } else {
            debug!(id = %key, "object not found");
        }
        Ok(handle)
    }

    /// The object as it was at `version`, as a standalone [`TrackedObject`].
    ///
    /// Without a version, the one before the tracked object's current version is
    /// read. `None` when no earlier version is known or the node has no data for
    /// the requested one. The result is never registered in the cache.
    pub async fn past_object(&self, id: &str, version: Option<u64>) -> Result<Option<TrackedObject>> {
        let key = normalize_id(id)?;
        let version = match version {
            Some(version) => version,
            None => {
                let previous = self
                    .by_key(&key)
                    .and_then(|handle| handle.version())
                    .and_then(|current| current.checked_sub(1))
                    .filter(|previous| *previous > 0);
                match previous {
                    Some(previous) => previous,
                    None => {
                        debug!(id = %key, "no earlier version known");
                        return Ok(None);
                    }
                }
            }
        };

        let response = self
            .source
            .try_get_past_object(&key, version, self.policy.options)
            .await
            .map_err(|err| MirrorError::remote("sui_tryGetPastObject", err))?;

        let status = response.status();
        match response.into_data() {
            Some(data) => Ok(Some(TrackedObject::from_payload(&ObjectPayload::Data(data))?)),
            None => {
                debug!(id = %key, version, status, "past version unavailable");
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Fold a transaction's `objectChanges` and deleted effects into the cache.
    ///
    /// New identities are registered; known ones absorb the change. Package
    /// publications are not objects and are skipped. Every change id is validated
    /// first, so a malformed response leaves the cache untouched.
    pub fn apply_transaction(
        &self,
        response: &TransactionBlockResponse,
    ) -> Result<ChangeSet> {
        let mut changes = ChangeSet::default();
        let mut seen_deleted = HashSet::new();

        let mut keyed = Vec::new();
        for change in response.object_changes.iter().flatten() {
            if matches!(change, ObjectChange::Published { .. }) {
                continue;
            }
            if let Some(id) = change.object_id() {
                keyed.push((normalize_id(id)?, change));
            }
        }

        for (key, change) in keyed {
            let handle = self.ingest(&ObjectPayload::Change(change.clone()))?;

            match change {
                ObjectChange::Created { .. } => changes.created.push(handle),
                ObjectChange::Mutated { .. } | ObjectChange::Transferred { .. } => {
                    changes.mutated.push(handle)
                }
                ObjectChange::Wrapped { .. } => changes.wrapped.push(handle),
                ObjectChange::Deleted { .. } => {
                    seen_deleted.insert(key);
                    changes.deleted.push(handle);
                }
                ObjectChange::Published { .. } | ObjectChange::Unknown => {}
            }
        }

        let effects_deleted = response
            .effects
            .iter()
            .flat_map(|effects| effects.deleted.iter());
        for reference in effects_deleted {
            let Some(key) = normalize_id_checked(&reference.object_id) else {
                continue;
            };
            if seen_deleted.contains(&key) {
                continue;
            }
            if let Some(handle) = self.by_key(&key) {
                if handle.mark_deleted() {
                    self.notify(CacheEvent::Deleted(handle.clone()));
                }
                seen_deleted.insert(key);
                changes.deleted.push(handle);
            }
        }

        debug!(
            digest = %response.digest,
            created = changes.created.len(),
            mutated = changes.mutated.len(),
            deleted = changes.deleted.len(),
            "applied transaction"
        );
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sui_mirror_transport::InMemoryDataSource;

    fn cache() -> (Arc<InMemoryDataSource>, ObjectCache) {
        let source = Arc::new(InMemoryDataSource::default());
        let cache = ObjectCache::new(source.clone());
        (source, cache)
    }

    #[test]
    fn test_push_is_idempotent_across_spellings() {
        let (_, cache) = cache();
        let a = cache.push("0X02").unwrap();
        let b = cache.push("2").unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            a.normalized_id().unwrap(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn test_push_rejects_invalid_targets() {
        let (_, cache) = cache();
        assert!(cache.push("not-an-id").is_none());
        assert!(cache.push(TrackedObject::new(None).unwrap()).is_none());
        assert!(matches!(
            cache.try_push("0xzz"),
            Err(MirrorError::InvalidIdentity(_))
        ));
        assert!(matches!(
            cache.try_push(TrackedObject::new(None).unwrap()),
            Err(MirrorError::MissingIdentity)
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_push_object_keeps_existing() {
        let (_, cache) = cache();
        let first = cache.push("0x7").unwrap();
        let again = cache.push(TrackedObject::new(Some("0x07")).unwrap()).unwrap();
        assert!(first.ptr_eq(&again));

        let handle = ObjectHandle::new(TrackedObject::new(Some("0x8")).unwrap());
        let registered = cache.push(&handle).unwrap();
        assert!(registered.ptr_eq(&handle));
    }

    #[test]
    fn test_find_and_most_recent() {
        let (_, cache) = cache();
        let first = cache.push("0x1").unwrap();
        let second = cache.push("0x2").unwrap();

        let found = cache.find(|_| true).unwrap();
        assert!(found.ptr_eq(&first));

        // Equal or later construction time: the later-inserted entry wins.
        let recent = cache.find_most_recent(|_| true).unwrap();
        assert!(recent.ptr_eq(&second));

        assert!(cache.find(|o| o.id_equals("0x3")).is_none());
    }

    #[tokio::test]
    async fn test_fetch_absorbs_and_marks_deleted() {
        let (source, cache) = cache();
        source.insert_object(
            ObjectData::new("0x6")
                .with_version(11)
                .with_type("0x2::clock::Clock")
                .with_owner(json!({ "Shared": { "initial_shared_version": 1 } })),
        );
        let clock = cache.fetch("0x6").await.unwrap();
        assert_eq!(clock.version(), Some(11));
        assert!(clock.read().is_shared());
        assert!(cache.find_most_recent_by_type_name("Clock").is_some());

        source.delete_object("0x6");
        let again = cache.fetch("6").await.unwrap();
        assert!(again.ptr_eq(&clock));
        assert!(clock.is_deleted());
    }

    #[tokio::test]
    async fn test_subscribe_sees_added_and_deleted() {
        let (source, cache) = cache();
        let mut rx = cache.subscribe();
        cache.push("0x9").unwrap();
        source.delete_object("0x9");
        cache.refresh_all().await;

        assert_eq!(rx.recv().await.unwrap().kind(), "added");
        assert_eq!(rx.recv().await.unwrap().kind(), "deleted");
    }

    #[tokio::test]
    async fn test_zero_batch_size_still_refreshes() {
        let (source, _) = cache();
        let cache = ObjectCache::with_policy(
            source.clone(),
            RefreshPolicy {
                batch_size: 0,
                ..RefreshPolicy::default()
            },
        );
        for id in ["0x1", "0x2", "0x3"] {
            source.insert_object(ObjectData::new(id).with_version(1));
            cache.push(id).unwrap();
        }

        let report = cache.refresh_all().await;
        assert_eq!(report.updated, 3);
        assert_eq!(source.multi_get_batches(), vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_oversized_batch_size_is_capped() {
        let (source, _) = cache();
        let cache = ObjectCache::with_policy(
            source.clone(),
            RefreshPolicy {
                batch_size: 500,
                ..RefreshPolicy::default()
            },
        );
        for i in 1..=60u64 {
            cache.push(format!("0x{:x}", i)).unwrap();
        }

        cache.refresh_all().await;
        assert_eq!(source.multi_get_batches(), vec![50, 10]);
    }

    #[tokio::test]
    async fn test_new_tombstone_emits_added_then_deleted() {
        let (_, cache) = cache();
        let mut rx = cache.subscribe();
        let change = ObjectChange::Deleted {
            object_id: "0x4".into(),
            object_type: None,
            version: Some(3),
            sender: None,
        };

        let handle = cache.ingest(&ObjectPayload::Change(change)).unwrap();
        assert!(handle.is_deleted());
        assert_eq!(rx.recv().await.unwrap().kind(), "added");
        assert_eq!(rx.recv().await.unwrap().kind(), "deleted");
    }

    #[test]
    fn test_apply_transaction_with_bad_id_changes_nothing() {
        let (_, cache) = cache();
        let mut rx = cache.subscribe();
        let response: TransactionBlockResponse = serde_json::from_value(json!({
            "digest": "bad",
            "objectChanges": [
                { "type": "created", "objectId": "0x10", "version": "2" },
                { "type": "mutated", "objectId": "0xnothex", "version": "2" }
            ]
        }))
        .unwrap();

        let err = cache.apply_transaction(&response).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidIdentity(_)));
        assert!(cache.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_past_object_defaults_to_previous_version() {
        let (source, cache) = cache();
        source.insert_object(ObjectData::new("0x5").with_version(2).with_type("0x2::a::A"));
        source.insert_object(ObjectData::new("0x5").with_version(3).with_type("0x2::a::A"));
        let current = cache.fetch("0x5").await.unwrap();
        assert_eq!(current.version(), Some(3));

        let previous = cache.past_object("0x5", None).await.unwrap().unwrap();
        assert_eq!(previous.version(), Some(2));
        assert!(previous.id_equals("0x5"));
        // standalone: the tracked object is untouched
        assert_eq!(current.version(), Some(3));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_past_object_explicit_and_unavailable_versions() {
        let (source, cache) = cache();
        source.insert_object(ObjectData::new("0x5").with_version(2));
        source.insert_object(ObjectData::new("0x5").with_version(7));

        let explicit = cache.past_object("0x05", Some(2)).await.unwrap().unwrap();
        assert_eq!(explicit.version(), Some(2));
        assert!(cache.past_object("0x5", Some(4)).await.unwrap().is_none());
        assert!(cache.past_object("0x5", Some(99)).await.unwrap().is_none());
        // nothing registered, and without a known version there is nothing to ask for
        assert!(cache.is_empty());
        assert!(cache.past_object("0x5", None).await.unwrap().is_none());
        assert_eq!(source.past_object_calls(), 3);
    }
}
